//! Opaque value carriers
//!
//! Externally-supplied values the catalog core stores and returns unchanged.
//! Loaders are responsible for producing well-formed values; resolvers are
//! responsible for interpreting locators. The core never parses any of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Unresolved address of an external resource
///
/// Used for a catalog's document base, a service's base address, and a
/// catalog reference's target. Stored verbatim; resolution happens outside
/// the core.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Wrap a raw locator string
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw locator string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the locator carries no address at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version tag of a catalog document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    /// Wrap a raw version string
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw version string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VersionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp carrier (expiry, last-modified)
///
/// Parsing and formatting of external date representations is the loader's
/// concern; the core only stores and compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateStamp(DateTime<Utc>);

impl DateStamp {
    /// Wrap an already-parsed instant
    #[inline]
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// The wrapped instant
    #[inline]
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

impl Display for DateStamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Access mechanism a service offers for the data it fronts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// OPeNDAP subsetting access
    OpenDap,
    /// Plain HTTP file download
    HttpServer,
    /// OGC Web Map Service
    Wms,
    /// OGC Web Coverage Service
    Wcs,
    /// Direct file access
    File,
    /// FTP download
    Ftp,
    /// Catalog resolver indirection
    Resolver,
    /// Container for several member services
    Compound,
}

impl ServiceKind {
    /// Stable identifier used in external representations
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenDap => "opendap",
            Self::HttpServer => "http-server",
            Self::Wms => "wms",
            Self::Wcs => "wcs",
            Self::File => "file",
            Self::Ftp => "ftp",
            Self::Resolver => "resolver",
            Self::Compound => "compound",
        }
    }

    /// True for the container kind whose children are the actual services
    #[inline]
    #[must_use]
    pub fn is_compound(self) -> bool {
        matches!(self, Self::Compound)
    }
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of a metadata block
///
/// Either inline content carried verbatim, or a reference to an external
/// document holding the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataContent {
    /// Content stored directly in the catalog
    Inline(String),
    /// Content held by an external document
    External(Locator),
}

impl MetadataContent {
    /// True when no content is carried (empty inline text or empty locator)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Inline(text) => text.trim().is_empty(),
            Self::External(locator) => locator.is_empty(),
        }
    }
}
