//! Builder factory
//!
//! One creation operation per node kind, each taking the kind's minimal
//! required fields, plus [`NodeFactory::reopen`] for converting a frozen
//! document back into a mutable working copy.
//!
//! The factory validates only per-node presence of the fields it is directly
//! given; cross-node invariants belong to the finish engine. An empty
//! reference locator on a catalog reference is accepted here: it is a
//! transient violation the finish engine reports as
//! `EmptyReferenceLocator`.

use crate::construction::builder::NodeBuilder;
use crate::document::DocumentNode;
use crate::error::BuilderError;
use crate::node::{FieldName, FieldValue, NodeKind};
use cardex_model::{DateStamp, Locator, ServiceKind, VersionTag};

/// Creates fresh unfinished builders
///
/// Stateless; side effects are limited to allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeFactory;

impl NodeFactory {
    /// Create a new factory
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// New catalog builder
    ///
    /// # Errors
    /// `MissingRequiredField` when `name` is empty.
    pub fn catalog(
        &self,
        name: &str,
        doc_base: Locator,
        version: Option<VersionTag>,
        expires: Option<DateStamp>,
        last_modified: Option<DateStamp>,
    ) -> Result<NodeBuilder, BuilderError> {
        let mut builder = Self::named(NodeKind::Catalog, name)?;
        builder.insert_field(FieldName::DocBase, FieldValue::Locator(doc_base));
        if let Some(version) = version {
            builder.insert_field(FieldName::Version, FieldValue::Version(version));
        }
        if let Some(expires) = expires {
            builder.insert_field(FieldName::Expires, FieldValue::Date(expires));
        }
        if let Some(last_modified) = last_modified {
            builder.insert_field(FieldName::LastModified, FieldValue::Date(last_modified));
        }
        Ok(builder)
    }

    /// New service builder
    ///
    /// # Errors
    /// `MissingRequiredField` when `name` is empty.
    pub fn service(
        &self,
        name: &str,
        kind: ServiceKind,
        base: Locator,
    ) -> Result<NodeBuilder, BuilderError> {
        let mut builder = Self::named(NodeKind::Service, name)?;
        builder.insert_field(FieldName::ServiceKind, FieldValue::Service(kind));
        builder.insert_field(FieldName::BaseLocator, FieldValue::Locator(base));
        Ok(builder)
    }

    /// New dataset builder
    ///
    /// # Errors
    /// `MissingRequiredField` when `name` is empty.
    pub fn dataset(&self, name: &str) -> Result<NodeBuilder, BuilderError> {
        Self::named(NodeKind::Dataset, name)
    }

    /// New catalog reference builder
    ///
    /// # Errors
    /// `MissingRequiredField` when `name` is empty.
    pub fn catalog_ref(&self, name: &str, reference: Locator) -> Result<NodeBuilder, BuilderError> {
        let mut builder = Self::named(NodeKind::CatalogRef, name)?;
        builder.insert_field(FieldName::Reference, FieldValue::Locator(reference));
        Ok(builder)
    }

    /// New metadata builder
    ///
    /// Takes no fields; the name and content are set before finish.
    #[must_use]
    pub fn metadata(&self) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Metadata)
    }

    /// New description builder
    ///
    /// Takes no fields; the name and descriptive fields are set before
    /// finish.
    #[must_use]
    pub fn description(&self) -> NodeBuilder {
        NodeBuilder::new(NodeKind::Description)
    }

    /// Re-open a frozen document into a mutable working copy
    ///
    /// Deep-copies the subtree: fields and children are cloned into fresh
    /// unfinished builders, so mutating the result never affects the
    /// document. Derived indices are dropped; the next finish rebuilds them.
    ///
    /// # Errors
    /// `EditNotSupported` is reserved for node kinds that cannot be
    /// re-opened; every current kind can be.
    pub fn reopen(&self, document: &DocumentNode) -> Result<NodeBuilder, BuilderError> {
        let children = document
            .children()
            .iter()
            .map(|child| self.reopen(child))
            .collect::<Result<Vec<_>, _>>()?;
        let fields = document
            .fields()
            .map(|(name, value)| (name, value.clone()))
            .collect();
        Ok(NodeBuilder::with_parts(document.kind(), fields, children))
    }

    fn named(kind: NodeKind, name: &str) -> Result<NodeBuilder, BuilderError> {
        if name.trim().is_empty() {
            return Err(BuilderError::MissingRequiredField(FieldName::Name));
        }
        let mut builder = NodeBuilder::new(kind);
        builder.insert_field(FieldName::Name, FieldValue::Text(name.to_string()));
        Ok(builder)
    }
}
