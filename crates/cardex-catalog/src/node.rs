//! Node kinds and the field table
//!
//! A catalog tree is made of six node kinds. Each node carries a small table
//! of named fields; the field namespace is a closed enum rather than free
//! strings so a typo cannot silently create an unknown field.

use cardex_model::{DateStamp, Locator, MetadataContent, ServiceKind, VersionTag};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// The kinds of node a catalog tree is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Root container: declares services and offers datasets
    Catalog,
    /// Access mechanism description; nests under a compound service
    Service,
    /// Data offered via one or more services; datasets nest
    Dataset,
    /// Lazy pointer to another catalog document
    CatalogRef,
    /// Descriptive payload block attachable to any node
    Metadata,
    /// Structured descriptive fields (documentation, keywords, authority)
    Description,
}

impl NodeKind {
    /// Stable identifier used in paths and reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Service => "service",
            Self::Dataset => "dataset",
            Self::CatalogRef => "catalog-ref",
            Self::Metadata => "metadata",
            Self::Description => "description",
        }
    }

    /// Fields that must be present and non-empty when a node of this kind is
    /// finished
    ///
    /// The catalog reference locator is deliberately absent here: its absence
    /// is reported as [`RuleKind::EmptyReferenceLocator`], not as a missing
    /// field.
    ///
    /// [`RuleKind::EmptyReferenceLocator`]: crate::error::RuleKind::EmptyReferenceLocator
    #[must_use]
    pub fn required_fields(self) -> &'static [FieldName] {
        match self {
            Self::Catalog => &[FieldName::Name, FieldName::DocBase],
            Self::Service => &[FieldName::Name, FieldName::ServiceKind, FieldName::BaseLocator],
            Self::Dataset => &[FieldName::Name],
            Self::CatalogRef => &[FieldName::Name],
            Self::Metadata => &[FieldName::Name],
            Self::Description => &[FieldName::Name],
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed namespace of node fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Identifying name, required on every kind
    Name,
    /// Catalog document base locator
    DocBase,
    /// Catalog version tag
    Version,
    /// Catalog expiry stamp
    Expires,
    /// Catalog last-modified stamp
    LastModified,
    /// Service access mechanism
    ServiceKind,
    /// Service base locator
    BaseLocator,
    /// Service locator suffix
    Suffix,
    /// Dataset identifier used by the derived dataset index
    DatasetId,
    /// Name of the service a dataset or catalog reference is offered through
    ServiceRef,
    /// Catalog reference target locator
    Reference,
    /// Metadata payload
    Content,
    /// Description documentation text
    Documentation,
    /// Description keywords
    Keywords,
    /// Description naming authority
    Authority,
}

impl FieldName {
    /// Stable identifier used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DocBase => "doc_base",
            Self::Version => "version",
            Self::Expires => "expires",
            Self::LastModified => "last_modified",
            Self::ServiceKind => "service_kind",
            Self::BaseLocator => "base_locator",
            Self::Suffix => "suffix",
            Self::DatasetId => "dataset_id",
            Self::ServiceRef => "service_ref",
            Self::Reference => "reference",
            Self::Content => "content",
            Self::Documentation => "documentation",
            Self::Keywords => "keywords",
            Self::Authority => "authority",
        }
    }
}

impl Display for FieldName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A field's value: one of the opaque carriers from `cardex-model`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Free text (names, identifiers, references-by-name)
    Text(String),
    /// External address
    Locator(Locator),
    /// Timestamp
    Date(DateStamp),
    /// Access mechanism
    Service(ServiceKind),
    /// Version tag
    Version(VersionTag),
    /// Metadata payload
    Content(MetadataContent),
    /// List of free-text entries (keywords, documentation paragraphs)
    List(Vec<String>),
}

impl FieldValue {
    /// Text payload, if this is a text field
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Locator payload, if this is a locator field
    #[inline]
    #[must_use]
    pub fn as_locator(&self) -> Option<&Locator> {
        match self {
            Self::Locator(locator) => Some(locator),
            _ => None,
        }
    }

    /// Date payload, if this is a date field
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<DateStamp> {
        match self {
            Self::Date(stamp) => Some(*stamp),
            _ => None,
        }
    }

    /// Service kind payload, if present
    #[inline]
    #[must_use]
    pub fn as_service_kind(&self) -> Option<ServiceKind> {
        match self {
            Self::Service(kind) => Some(*kind),
            _ => None,
        }
    }

    /// True when the value carries no usable content
    ///
    /// Used by the finish engine: a required field that is present but blank
    /// is still missing.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Locator(locator) => locator.is_empty(),
            Self::Content(content) => content.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Date(_) | Self::Service(_) => false,
            Self::Version(tag) => tag.as_str().trim().is_empty(),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Locator(locator) => write!(f, "{locator}"),
            Self::Date(stamp) => write!(f, "{stamp}"),
            Self::Service(kind) => write!(f, "{kind}"),
            Self::Version(tag) => write!(f, "{tag}"),
            Self::Content(MetadataContent::Inline(_)) => write!(f, "<inline content>"),
            Self::Content(MetadataContent::External(locator)) => write!(f, "{locator}"),
            Self::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}
