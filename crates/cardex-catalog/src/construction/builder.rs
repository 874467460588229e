//! Node builders
//!
//! The primary interface of the construction phase. A builder owns its child
//! builders exclusively, so a builder tree cannot contain cycles and no other
//! caller can observe intermediate states.
//!
//! Builders are not safe for concurrent mutation from multiple callers
//! without external synchronization.

use crate::construction::validator::{self, FinishOptions};
use crate::document::DocumentNode;
use crate::error::{BuilderError, FinishError, ValidationReport};
use crate::node::{FieldName, FieldValue, NodeKind};
use std::collections::BTreeMap;

/// Mutable, in-progress catalog-tree node
///
/// Usage:
/// ```rust,ignore
/// let factory = NodeFactory::new();
/// let mut catalog = factory.catalog("top", doc_base, None, None, None)?;
/// catalog.add_child(factory.service("odap", ServiceKind::OpenDap, base)?)?;
/// let document = catalog.finish()?;
/// ```
///
/// Invariants (required fields, sibling uniqueness, reference resolution)
/// may be transiently violated between mutations; they are checked only by
/// [`NodeBuilder::finish`]. After a successful finish every mutator and any
/// further finish fails with `AlreadyFinished`; a failed finish leaves the
/// builder untouched so fields can be corrected and the finish retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeBuilder {
    kind: NodeKind,
    fields: BTreeMap<FieldName, FieldValue>,
    children: Vec<NodeBuilder>,
    finished: bool,
}

impl NodeBuilder {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
            children: Vec::new(),
            finished: false,
        }
    }

    /// Assemble a builder from already-known parts (the re-open path)
    pub(crate) fn with_parts(
        kind: NodeKind,
        fields: BTreeMap<FieldName, FieldValue>,
        children: Vec<NodeBuilder>,
    ) -> Self {
        Self {
            kind,
            fields,
            children,
            finished: false,
        }
    }

    /// Set a field without the finished check; only for factory-internal use
    /// on builders no caller has seen yet
    pub(crate) fn insert_field(&mut self, name: FieldName, value: FieldValue) {
        self.fields.insert(name, value);
    }

    pub(crate) fn cloned_fields(&self) -> BTreeMap<FieldName, FieldValue> {
        self.fields.clone()
    }

    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
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

    /// Children in insertion order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeBuilder] {
        &self.children
    }

    /// True once a finish has succeeded
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Set or replace a field
    ///
    /// # Errors
    /// `AlreadyFinished` after a successful finish.
    pub fn set_field(&mut self, name: FieldName, value: FieldValue) -> Result<(), BuilderError> {
        self.check_mutable()?;
        self.fields.insert(name, value);
        Ok(())
    }

    /// Remove a field, returning its previous value
    ///
    /// # Errors
    /// `AlreadyFinished` after a successful finish.
    pub fn remove_field(&mut self, name: FieldName) -> Result<Option<FieldValue>, BuilderError> {
        self.check_mutable()?;
        Ok(self.fields.remove(&name))
    }

    /// Append a child builder, taking ownership
    ///
    /// # Errors
    /// `AlreadyFinished` if this builder has finished, or if the child has:
    /// a finished child's data already became a document elsewhere.
    pub fn add_child(&mut self, child: NodeBuilder) -> Result<(), BuilderError> {
        self.check_mutable()?;
        if child.finished {
            return Err(BuilderError::AlreadyFinished);
        }
        self.children.push(child);
        Ok(())
    }

    /// Remove and return the child at `index`
    ///
    /// # Errors
    /// `AlreadyFinished` after a successful finish; `ChildIndexOutOfRange`
    /// for a bad index.
    pub fn remove_child(&mut self, index: usize) -> Result<NodeBuilder, BuilderError> {
        self.check_mutable()?;
        if index >= self.children.len() {
            return Err(BuilderError::ChildIndexOutOfRange {
                index,
                len: self.children.len(),
            });
        }
        Ok(self.children.remove(index))
    }

    /// Mutable access to the child at `index`, for in-place correction of
    /// nested nodes
    ///
    /// # Errors
    /// `AlreadyFinished` after a successful finish; `ChildIndexOutOfRange`
    /// for a bad index.
    pub fn child_mut(&mut self, index: usize) -> Result<&mut NodeBuilder, BuilderError> {
        self.check_mutable()?;
        let len = self.children.len();
        self.children
            .get_mut(index)
            .ok_or(BuilderError::ChildIndexOutOfRange { index, len })
    }

    /// Validate and freeze this subtree into an immutable document
    ///
    /// Equivalent to [`NodeBuilder::finish_with`] with default options.
    ///
    /// # Errors
    /// See [`NodeBuilder::finish_with`].
    pub fn finish(&mut self) -> Result<DocumentNode, FinishError> {
        self.finish_with(&FinishOptions::default())
    }

    /// Validate and freeze this subtree into an immutable document
    ///
    /// Freezes a candidate bottom-up (children in insertion order, depth
    /// first), validates the entire candidate collecting every failure, and
    /// on success marks this builder finished and returns the document.
    ///
    /// # Errors
    /// - `FinishError::AlreadyFinished` on any finish after a successful one
    /// - `FinishError::Invalid` carrying the full [`ValidationReport`]; the
    ///   builder is untouched and remains mutable for retry
    pub fn finish_with(&mut self, options: &FinishOptions) -> Result<DocumentNode, FinishError> {
        if self.finished {
            return Err(FinishError::AlreadyFinished);
        }

        let candidate = validator::freeze(self);
        let context = validator::ValidationContext::new(options.limits);
        let failures = validator::validate(&candidate, &context);

        if failures.is_empty() {
            self.finished = true;
            tracing::debug!(kind = %self.kind, "builder finished");
            Ok(candidate)
        } else {
            tracing::debug!(kind = %self.kind, failures = failures.len(), "candidate rejected");
            Err(ValidationReport::new(failures).into())
        }
    }

    fn check_mutable(&self) -> Result<(), BuilderError> {
        if self.finished {
            Err(BuilderError::AlreadyFinished)
        } else {
            Ok(())
        }
    }
}
