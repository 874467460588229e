//! Cardex Catalog
//!
//! Staged construction for hierarchical catalog documents, with a two-phase
//! design:
//! 1. **Construction Phase**: assemble and mutate a builder tree
//! 2. **Finished Documents**: an immutable, indexed tree produced by the
//!    validate-and-freeze step
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cardex_catalog::prelude::*;
//!
//! // Construction phase
//! let factory = NodeFactory::new();
//! let mut catalog = factory.catalog("top", Locator::new("https://example.org/cat.xml"), None, None, None)?;
//! let service = factory.service("odap", ServiceKind::OpenDap, Locator::new("/dap/"))?;
//! catalog.add_child(service)?;
//!
//! // Validate and freeze
//! let document = catalog.finish()?;
//! assert!(document.find_service("odap").is_some());
//!
//! // Re-open for editing (deep copy; `document` stays frozen)
//! let mut editable = factory.reopen(&document)?;
//! ```
//!
//! Invariants (required fields, sibling-name uniqueness, service reference
//! resolution, non-empty catalog references) are enforced only at finish
//! time; builders may transiently violate them. A failed finish reports every
//! violation found in the subtree in one deterministic [`ValidationReport`].

#![warn(unreachable_pub)]

pub mod construction;
pub mod document;
pub mod error;
pub mod node;

pub use construction::{CatalogLimits, FinishOptions, NodeBuilder, NodeFactory, ValidationContext};
pub use document::DocumentNode;
pub use error::{BuilderError, FinishError, RuleKind, ValidationFailure, ValidationReport};
pub use node::{FieldName, FieldValue, NodeKind};

/// Convenience re-exports for callers assembling catalogs
pub mod prelude {
    pub use crate::construction::{
        CatalogLimits, FinishOptions, NodeBuilder, NodeFactory, ValidationContext,
    };
    pub use crate::document::DocumentNode;
    pub use crate::error::{
        BuilderError, FinishError, RuleKind, ValidationFailure, ValidationReport,
    };
    pub use crate::node::{FieldName, FieldValue, NodeKind};
    pub use cardex_model::{
        DateStamp, Locator, MetadataContent, NodePath, ServiceKind, VersionTag,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
