//! Finish engine
//!
//! Freezes a builder tree into a candidate document and validates the whole
//! candidate against the finish-time invariants. Validation never
//! short-circuits within one pass: every failure in the subtree is collected
//! so the caller can correct them all before retrying.
//!
//! Validation is pure and deterministic: the same candidate and context
//! always yield the same failures in the same order. Traversal order is:
//! a node's own checks, then its children's duplicate-name groups in
//! first-occurrence order, then each child subtree in insertion order. The
//! optional `parallel` feature validates sibling subtrees on rayon workers
//! and concatenates their failure vectors in insertion order, so the result
//! is identical to the sequential walk.

use crate::construction::builder::NodeBuilder;
use crate::document::{CatalogIndices, DocumentConstructor, DocumentNode};
use crate::error::{RuleKind, ValidationFailure};
use crate::node::{FieldName, NodeKind};
use cardex_model::{Locator, NodePath};
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Minimum sibling count before validation fans out to rayon workers.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 8;

/// Structural bounds a candidate tree must stay within
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLimits {
    /// Maximum node depth, root at zero
    pub max_depth: usize,
    /// Maximum node count for the whole candidate
    pub max_nodes: usize,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 100_000,
        }
    }
}

/// Per-finish configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinishOptions {
    /// Structural bounds for this finish call
    pub limits: CatalogLimits,
}

/// Read-only context inherited down the candidate tree
///
/// Carries the service names visible from the enclosing catalog chain and
/// the configured limits. Service lookup climbs to every ancestor catalog,
/// mirroring nested-catalog inheritance.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    services: BTreeSet<String>,
    limits: CatalogLimits,
    depth: usize,
}

impl ValidationContext {
    /// Fresh context with no visible services
    #[must_use]
    pub fn new(limits: CatalogLimits) -> Self {
        Self {
            services: BTreeSet::new(),
            limits,
            depth: 0,
        }
    }

    /// Context with the given service names already visible, as if the
    /// candidate sat inside catalogs declaring them
    #[must_use]
    pub fn with_services(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.services.extend(names);
        self
    }

    /// True when a service with the given name is visible
    #[must_use]
    pub fn resolves_service(&self, name: &str) -> bool {
        self.services.contains(name)
    }

    /// Context for the children of a non-catalog node
    fn descend(&self) -> Self {
        let mut child = self.clone();
        child.depth += 1;
        child
    }

    /// Context for the children of a catalog node: the catalog's own service
    /// names join the visible set
    fn enter_catalog(&self, catalog: &DocumentNode) -> Self {
        let mut child = self.descend();
        if let Some(indices) = catalog.indices() {
            child
                .services
                .extend(indices.service_names().map(str::to_string));
        }
        child
    }
}

/// Freeze a builder tree into a candidate document, bottom-up
///
/// Children are frozen in insertion order; catalog nodes get their lookup
/// indices built here, before validation, because the service-reference
/// check reads them.
pub(crate) fn freeze(builder: &NodeBuilder) -> DocumentNode {
    let children: Vec<DocumentNode> = builder.children().iter().map(freeze).collect();
    let indices =
        (builder.kind() == NodeKind::Catalog).then(|| build_indices(&children));
    DocumentConstructor::construct(builder.kind(), builder.cloned_fields(), children, indices)
}

/// Validate a frozen candidate against the inherited context
///
/// Pure function: collects every invariant violation in the candidate,
/// ordered by tree traversal order. An empty result means the candidate is a
/// valid document.
#[must_use]
pub fn validate(candidate: &DocumentNode, context: &ValidationContext) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    let total = count_nodes(candidate);
    if total > context.limits.max_nodes {
        failures.push(ValidationFailure::new(
            NodePath::root(),
            RuleKind::LimitExceeded,
            format!("{total} nodes exceeds maximum of {}", context.limits.max_nodes),
        ));
    }

    validate_node(candidate, &NodePath::root(), context, &mut failures);
    tracing::debug!(nodes = total, failures = failures.len(), "validated candidate");
    failures
}

fn validate_node(
    node: &DocumentNode,
    path: &NodePath,
    context: &ValidationContext,
    out: &mut Vec<ValidationFailure>,
) {
    check_required_fields(node, path, out);
    check_reference_locator(node, path, out);
    check_service_reference(node, path, context, out);
    check_duplicate_siblings(node, path, out);

    if node.children().is_empty() {
        return;
    }

    let child_context = if node.kind() == NodeKind::Catalog {
        context.enter_catalog(node)
    } else {
        context.descend()
    };

    if child_context.depth > context.limits.max_depth {
        out.push(ValidationFailure::new(
            path.clone(),
            RuleKind::LimitExceeded,
            format!("children exceed maximum depth of {}", context.limits.max_depth),
        ));
        return;
    }

    validate_children(node, path, &child_context, out);
}

#[cfg(feature = "parallel")]
fn validate_children(
    node: &DocumentNode,
    path: &NodePath,
    child_context: &ValidationContext,
    out: &mut Vec<ValidationFailure>,
) {
    if node.children().len() >= PARALLEL_THRESHOLD {
        // Sibling subtrees have no data dependency: each worker reads only
        // its own frozen subtree and the shared read-only context. Collecting
        // per-sibling vectors and flattening in insertion order keeps the
        // report identical to the sequential walk.
        let per_child: Vec<Vec<ValidationFailure>> = node
            .children()
            .par_iter()
            .enumerate()
            .map(|(position, child)| {
                let mut failures = Vec::new();
                let child_path = path.child(child.segment(position));
                validate_node(child, &child_path, child_context, &mut failures);
                failures
            })
            .collect();
        for failures in per_child {
            out.extend(failures);
        }
        return;
    }

    for (position, child) in node.children().iter().enumerate() {
        let child_path = path.child(child.segment(position));
        validate_node(child, &child_path, child_context, out);
    }
}

#[cfg(not(feature = "parallel"))]
fn validate_children(
    node: &DocumentNode,
    path: &NodePath,
    child_context: &ValidationContext,
    out: &mut Vec<ValidationFailure>,
) {
    for (position, child) in node.children().iter().enumerate() {
        let child_path = path.child(child.segment(position));
        validate_node(child, &child_path, child_context, out);
    }
}

fn check_required_fields(node: &DocumentNode, path: &NodePath, out: &mut Vec<ValidationFailure>) {
    for &field in node.kind().required_fields() {
        let missing = match node.field(field) {
            None => true,
            Some(value) => value.is_blank(),
        };
        if missing {
            out.push(ValidationFailure::new(
                path.clone(),
                RuleKind::FieldMissing,
                field.as_str(),
            ));
        }
    }
}

fn check_reference_locator(node: &DocumentNode, path: &NodePath, out: &mut Vec<ValidationFailure>) {
    if node.kind() != NodeKind::CatalogRef {
        return;
    }
    if node.reference().map_or(true, Locator::is_empty) {
        out.push(ValidationFailure::new(
            path.clone(),
            RuleKind::EmptyReferenceLocator,
            FieldName::Reference.as_str(),
        ));
    }
}

fn check_service_reference(
    node: &DocumentNode,
    path: &NodePath,
    context: &ValidationContext,
    out: &mut Vec<ValidationFailure>,
) {
    if !matches!(node.kind(), NodeKind::Dataset | NodeKind::CatalogRef) {
        return;
    }
    let Some(wanted) = node.service_ref() else {
        return;
    };
    if wanted.trim().is_empty() {
        return;
    }
    if !context.resolves_service(wanted) {
        out.push(ValidationFailure::new(
            path.clone(),
            RuleKind::UnresolvedServiceReference,
            wanted,
        ));
    }
}

/// One failure per duplicated (kind, name) group among this node's children,
/// reported at the parent and referencing the shared name
fn check_duplicate_siblings(node: &DocumentNode, path: &NodePath, out: &mut Vec<ValidationFailure>) {
    let mut counts: BTreeMap<(NodeKind, &str), usize> = BTreeMap::new();
    for child in node.children() {
        let name = child.name();
        if name.trim().is_empty() {
            // Missing names are already FieldMissing failures on the child.
            continue;
        }
        *counts.entry((child.kind(), name)).or_insert(0) += 1;
    }

    let mut reported: BTreeSet<(NodeKind, &str)> = BTreeSet::new();
    for child in node.children() {
        let name = child.name();
        if name.trim().is_empty() {
            continue;
        }
        let key = (child.kind(), name);
        if counts[&key] > 1 && reported.insert(key) {
            out.push(ValidationFailure::new(
                path.clone(),
                RuleKind::DuplicateSiblingName,
                name,
            ));
        }
    }
}

fn build_indices(children: &[DocumentNode]) -> CatalogIndices {
    let mut services = BTreeMap::new();
    let mut datasets = BTreeMap::new();
    for (position, child) in children.iter().enumerate() {
        match child.kind() {
            NodeKind::Service => {
                index_service(child, position, &NodePath::root(), &mut services);
            }
            NodeKind::Dataset => {
                index_dataset(child, position, &NodePath::root(), &mut datasets);
            }
            _ => {}
        }
    }
    CatalogIndices::new(services, datasets)
}

/// Record a service and, for compound services, its nested members; the
/// catalog's service namespace is flat, so members are referenceable by name
fn index_service(
    node: &DocumentNode,
    position: usize,
    parent: &NodePath,
    out: &mut BTreeMap<String, NodePath>,
) {
    let path = parent.child(node.segment(position));
    let name = node.name();
    if !name.trim().is_empty() {
        out.entry(name.to_string()).or_insert_with(|| path.clone());
    }
    for (child_position, child) in node.children().iter().enumerate() {
        if child.kind() == NodeKind::Service {
            index_service(child, child_position, &path, out);
        }
    }
}

/// Record datasets carrying an identifier; nested catalogs keep their own
/// index, so the walk stays within this catalog's dataset subtrees
fn index_dataset(
    node: &DocumentNode,
    position: usize,
    parent: &NodePath,
    out: &mut BTreeMap<String, NodePath>,
) {
    let path = parent.child(node.segment(position));
    if let Some(id) = node.dataset_id() {
        if !id.trim().is_empty() {
            out.entry(id.to_string()).or_insert_with(|| path.clone());
        }
    }
    for (child_position, child) in node.children().iter().enumerate() {
        if child.kind() == NodeKind::Dataset {
            index_dataset(child, child_position, &path, out);
        }
    }
}

fn count_nodes(node: &DocumentNode) -> usize {
    1 + node.children().iter().map(count_nodes).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::NodeFactory;
    use crate::node::FieldValue;
    use cardex_model::{Locator, ServiceKind};

    fn factory() -> NodeFactory {
        NodeFactory::new()
    }

    fn frozen_catalog_with(children: Vec<NodeBuilder>) -> DocumentNode {
        let mut catalog = factory()
            .catalog("top", Locator::new("https://example.org/cat.xml"), None, None, None)
            .unwrap();
        for child in children {
            catalog.add_child(child).unwrap();
        }
        freeze(&catalog)
    }

    fn service(name: &str) -> NodeBuilder {
        factory()
            .service(name, ServiceKind::OpenDap, Locator::new("/dap/"))
            .unwrap()
    }

    #[test]
    fn valid_candidate_has_no_failures() {
        let candidate = frozen_catalog_with(vec![service("odap")]);
        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert!(failures.is_empty());
    }

    #[test]
    fn missing_required_field_is_reported() {
        let mut dataset = factory().dataset("temps").unwrap();
        dataset.remove_field(FieldName::Name).unwrap();
        let candidate = freeze(&dataset);

        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::FieldMissing);
        assert_eq!(failures[0].offending, "name");
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let mut dataset = factory().dataset("temps").unwrap();
        dataset
            .set_field(FieldName::Name, FieldValue::Text("   ".into()))
            .unwrap();
        let candidate = freeze(&dataset);

        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::FieldMissing);
    }

    #[test]
    fn duplicate_sibling_services_yield_one_failure() {
        let candidate = frozen_catalog_with(vec![service("OPeNDAP"), service("OPeNDAP")]);
        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));

        let duplicates: Vec<_> = failures
            .iter()
            .filter(|f| f.rule == RuleKind::DuplicateSiblingName)
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].offending, "OPeNDAP");
    }

    #[test]
    fn same_name_different_kind_is_no_duplicate() {
        let candidate =
            frozen_catalog_with(vec![service("shared"), factory().dataset("shared").unwrap()]);
        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert!(failures.is_empty());
    }

    #[test]
    fn unresolved_service_reference_is_reported() {
        let mut dataset = factory().dataset("temps").unwrap();
        dataset
            .set_field(FieldName::ServiceRef, FieldValue::Text("missing".into()))
            .unwrap();
        let candidate = frozen_catalog_with(vec![dataset]);

        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::UnresolvedServiceReference);
        assert_eq!(failures[0].offending, "missing");
    }

    #[test]
    fn service_reference_resolves_within_catalog() {
        let mut dataset = factory().dataset("temps").unwrap();
        dataset
            .set_field(FieldName::ServiceRef, FieldValue::Text("odap".into()))
            .unwrap();
        let candidate = frozen_catalog_with(vec![service("odap"), dataset]);

        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert!(failures.is_empty());
    }

    #[test]
    fn compound_member_services_are_referenceable() {
        let mut compound = factory()
            .service("all", ServiceKind::Compound, Locator::new("/"))
            .unwrap();
        compound.add_child(service("member")).unwrap();

        let mut dataset = factory().dataset("temps").unwrap();
        dataset
            .set_field(FieldName::ServiceRef, FieldValue::Text("member".into()))
            .unwrap();

        let candidate = frozen_catalog_with(vec![compound, dataset]);
        let failures = validate(&candidate, &ValidationContext::new(CatalogLimits::default()));
        assert!(failures.is_empty());
    }

    #[test]
    fn context_services_resolve_like_enclosing_catalogs() {
        let mut dataset = factory().dataset("temps").unwrap();
        dataset
            .set_field(FieldName::ServiceRef, FieldValue::Text("outer".into()))
            .unwrap();
        let candidate = freeze(&dataset);

        let context = ValidationContext::new(CatalogLimits::default())
            .with_services(["outer".to_string()]);
        assert!(validate(&candidate, &context).is_empty());

        let bare = ValidationContext::new(CatalogLimits::default());
        assert_eq!(validate(&candidate, &bare).len(), 1);
    }

    #[test]
    fn depth_limit_cuts_off_descent() {
        let mut leaf = factory().dataset("d2").unwrap();
        leaf.remove_field(FieldName::Name).unwrap(); // would be a failure if visited
        let mut middle = factory().dataset("d1").unwrap();
        middle.add_child(leaf).unwrap();
        let mut root = factory().dataset("d0").unwrap();
        root.add_child(middle).unwrap();
        let candidate = freeze(&root);

        let limits = CatalogLimits {
            max_depth: 1,
            ..CatalogLimits::default()
        };
        let failures = validate(&candidate, &ValidationContext::new(limits));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, RuleKind::LimitExceeded);
    }

    #[test]
    fn node_count_limit_is_reported_at_root() {
        let candidate = frozen_catalog_with(vec![service("a"), service("b")]);
        let limits = CatalogLimits {
            max_nodes: 2,
            ..CatalogLimits::default()
        };
        let failures = validate(&candidate, &ValidationContext::new(limits));
        assert!(failures
            .iter()
            .any(|f| f.rule == RuleKind::LimitExceeded && f.path.is_empty()));
    }

    #[test]
    fn validation_is_deterministic() {
        let build = || {
            let mut bad_ref = factory().catalog_ref("other", Locator::new("")).unwrap();
            bad_ref
                .set_field(FieldName::ServiceRef, FieldValue::Text("nowhere".into()))
                .unwrap();
            frozen_catalog_with(vec![service("dup"), service("dup"), bad_ref])
        };
        let context = ValidationContext::new(CatalogLimits::default());
        let first = validate(&build(), &context);
        let second = validate(&build(), &context);
        assert_eq!(first, second);
        assert!(first.len() >= 2);
    }

    #[test]
    fn indices_cover_services_and_dataset_ids() {
        let mut dataset = factory().dataset("temps").unwrap();
        dataset
            .set_field(FieldName::DatasetId, FieldValue::Text("temps-v1".into()))
            .unwrap();
        let candidate = frozen_catalog_with(vec![service("odap"), dataset]);

        let indices = candidate.indices().unwrap();
        assert!(indices.has_service("odap"));
        assert_eq!(indices.dataset_ids().collect::<Vec<_>>(), vec!["temps-v1"]);
        assert_eq!(
            candidate.find_dataset("temps-v1").map(DocumentNode::name),
            Some("temps")
        );
    }
}
