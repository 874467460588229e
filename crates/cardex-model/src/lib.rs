//! Cardex Model
//!
//! Opaque value carriers and node addressing for catalog document trees.
//!
//! # Core Concepts
//!
//! - [`NodePath`]: Hierarchical address of a node within a catalog tree
//! - [`Locator`]: Unresolved address of an external resource
//! - [`ServiceKind`]: Enumerated access mechanisms
//! - [`DateStamp`], [`VersionTag`], [`MetadataContent`]: value carriers the
//!   catalog core passes through unchanged
//!
//! Nothing in this crate interprets these values; parsing and resolution are
//! the concern of loaders and resolvers layered on top.

#![warn(unreachable_pub)]

mod path;
mod values;

pub use path::NodePath;
pub use values::{DateStamp, Locator, MetadataContent, ServiceKind, VersionTag};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
