//! Immutable catalog documents
//!
//! [`DocumentNode`] is the validated, frozen counterpart of a builder node.
//! It can ONLY be constructed through the finish path. The constructor is
//! sealed inside the crate, ensuring that:
//! 1. Every document reaching a consumer has passed validation
//! 2. Validation cannot be bypassed
//! 3. The derived lookup indices always describe the tree they sit on
//!
//! No mutation operations exist on the type; editing goes through
//! [`NodeFactory::reopen`], which deep-copies the subtree into fresh
//! builders.
//!
//! [`NodeFactory::reopen`]: crate::construction::NodeFactory::reopen

use crate::node::{FieldName, FieldValue, NodeKind};
use cardex_model::{Locator, NodePath, ServiceKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Immutable, validated catalog-tree node
///
/// # Invariants
/// - Fields and children satisfy every finish-time invariant
/// - Children are themselves validated documents
/// - Catalog nodes carry lookup indices built once at finish time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNode {
    kind: NodeKind,
    fields: BTreeMap<FieldName, FieldValue>,
    children: Vec<DocumentNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indices: Option<CatalogIndices>,
}

/// Sealed constructor for [`DocumentNode`]
///
/// Only accessible within the crate, ensuring documents can only be created
/// by the finish engine after the candidate has been assembled.
pub(crate) struct DocumentConstructor;

impl DocumentConstructor {
    pub(crate) fn construct(
        kind: NodeKind,
        fields: BTreeMap<FieldName, FieldValue>,
        children: Vec<DocumentNode>,
        indices: Option<CatalogIndices>,
    ) -> DocumentNode {
        DocumentNode {
            kind,
            fields,
            children,
            indices,
        }
    }
}

impl DocumentNode {
    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Identifying name
    ///
    /// Validation guarantees presence on finished documents, so this is
    /// total; an absent name (possible only on candidates still inside the
    /// finish engine) reads as empty.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.field(FieldName::Name)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    /// Look up one field
    #[inline]
    #[must_use]
    pub fn field(&self, name: FieldName) -> Option<&FieldValue> {
        self.fields.get(&name)
    }

    /// All fields in stable order
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (FieldName, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Children in document order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[DocumentNode] {
        &self.children
    }

    /// Children of one kind, in document order
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &DocumentNode> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Catalog reference target, stored unresolved
    #[inline]
    #[must_use]
    pub fn reference(&self) -> Option<&Locator> {
        self.field(FieldName::Reference)
            .and_then(FieldValue::as_locator)
    }

    /// Service access mechanism
    #[inline]
    #[must_use]
    pub fn service_kind(&self) -> Option<ServiceKind> {
        self.field(FieldName::ServiceKind)
            .and_then(FieldValue::as_service_kind)
    }

    /// Name of the service this node is offered through
    #[inline]
    #[must_use]
    pub fn service_ref(&self) -> Option<&str> {
        self.field(FieldName::ServiceRef)
            .and_then(FieldValue::as_text)
    }

    /// Dataset identifier
    #[inline]
    #[must_use]
    pub fn dataset_id(&self) -> Option<&str> {
        self.field(FieldName::DatasetId)
            .and_then(FieldValue::as_text)
    }

    /// The lookup indices, present on catalog nodes
    #[inline]
    #[must_use]
    pub fn indices(&self) -> Option<&CatalogIndices> {
        self.indices.as_ref()
    }

    /// Resolve a path produced by this tree's traversal (indices, failure
    /// reports) back to a node
    #[must_use]
    pub fn at_path(&self, path: &NodePath) -> Option<&DocumentNode> {
        let mut node = self;
        for wanted in path.iter() {
            node = node
                .children
                .iter()
                .enumerate()
                .find(|(position, child)| child.segment(*position) == wanted)
                .map(|(_, child)| child)?;
        }
        Some(node)
    }

    /// Look up a service by name through this catalog's index
    ///
    /// Returns `None` on non-catalog nodes and for unknown names.
    #[must_use]
    pub fn find_service(&self, name: &str) -> Option<&DocumentNode> {
        let path = self.indices.as_ref()?.services_by_name.get(name)?;
        self.at_path(path)
    }

    /// Look up a dataset by identifier through this catalog's index
    #[must_use]
    pub fn find_dataset(&self, id: &str) -> Option<&DocumentNode> {
        let path = self.indices.as_ref()?.datasets_by_id.get(id)?;
        self.at_path(path)
    }

    /// Path segment for this node at the given child position
    ///
    /// `kind:name`, or `kind:#position` while the name is absent so even
    /// invalid candidates have addressable failure locations.
    pub(crate) fn segment(&self, position: usize) -> String {
        let name = self.name();
        if name.trim().is_empty() {
            format!("{}:#{position}", self.kind)
        } else {
            format!("{}:{name}", self.kind)
        }
    }
}

/// Lookup tables derived once at finish time for a catalog node
///
/// Paths are relative to the catalog node the indices sit on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogIndices {
    services_by_name: BTreeMap<String, NodePath>,
    datasets_by_id: BTreeMap<String, NodePath>,
}

impl CatalogIndices {
    pub(crate) fn new(
        services_by_name: BTreeMap<String, NodePath>,
        datasets_by_id: BTreeMap<String, NodePath>,
    ) -> Self {
        Self {
            services_by_name,
            datasets_by_id,
        }
    }

    /// Service names visible from this catalog, in stable order
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services_by_name.keys().map(String::as_str)
    }

    /// Indexed dataset identifiers, in stable order
    pub fn dataset_ids(&self) -> impl Iterator<Item = &str> {
        self.datasets_by_id.keys().map(String::as_str)
    }

    /// True when a service with the given name is visible
    #[inline]
    #[must_use]
    pub fn has_service(&self, name: &str) -> bool {
        self.services_by_name.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeKind, name: &str) -> DocumentNode {
        let mut fields = BTreeMap::new();
        if !name.is_empty() {
            fields.insert(FieldName::Name, FieldValue::Text(name.to_string()));
        }
        DocumentConstructor::construct(kind, fields, Vec::new(), None)
    }

    #[test]
    fn segment_uses_name_when_present() {
        let node = leaf(NodeKind::Service, "odap");
        assert_eq!(node.segment(0), "service:odap");
    }

    #[test]
    fn segment_falls_back_to_position() {
        let node = leaf(NodeKind::Metadata, "");
        assert_eq!(node.segment(3), "metadata:#3");
    }

    #[test]
    fn at_path_walks_children() {
        let dataset = leaf(NodeKind::Dataset, "temps");
        let catalog = DocumentConstructor::construct(
            NodeKind::Catalog,
            BTreeMap::from([(FieldName::Name, FieldValue::Text("top".into()))]),
            vec![dataset],
            None,
        );

        let path = NodePath::single("dataset:temps");
        assert_eq!(catalog.at_path(&path).map(DocumentNode::name), Some("temps"));
        assert!(catalog.at_path(&NodePath::single("dataset:other")).is_none());
        assert_eq!(catalog.at_path(&NodePath::root()).map(DocumentNode::name), Some("top"));
    }

    #[test]
    fn children_of_kind_filters() {
        let catalog = DocumentConstructor::construct(
            NodeKind::Catalog,
            BTreeMap::new(),
            vec![
                leaf(NodeKind::Service, "a"),
                leaf(NodeKind::Dataset, "b"),
                leaf(NodeKind::Service, "c"),
            ],
            None,
        );
        let services: Vec<_> = catalog
            .children_of_kind(NodeKind::Service)
            .map(DocumentNode::name)
            .collect();
        assert_eq!(services, vec!["a", "c"]);
    }
}
