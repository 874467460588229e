//! Error types
//!
//! Two layers, matching how failures surface:
//! - [`BuilderError`] / [`FinishError`]: immediate failures of the single
//!   call that caused them.
//! - [`ValidationFailure`] inside a [`ValidationReport`]: invariant
//!   violations accumulated across a whole subtree during one finish pass and
//!   surfaced together.

use crate::node::{FieldName, NodeKind};
use cardex_model::NodePath;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Immediate failure of a single builder or factory call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    /// Mutation attempted after a successful finish
    #[error("builder already finished")]
    AlreadyFinished,

    /// A creation operation was given an empty required field
    #[error("missing required field: {0}")]
    MissingRequiredField(FieldName),

    /// Child removal index past the end of the child list
    #[error("child index {index} out of range (len {len})")]
    ChildIndexOutOfRange { index: usize, len: usize },

    /// Reserved for node kinds that cannot be re-opened; no current kind
    /// triggers this
    #[error("node kind {0} cannot be re-opened")]
    EditNotSupported(NodeKind),
}

/// Failure of a `finish` call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FinishError {
    /// A second finish after a successful one; the document's ownership has
    /// already transferred to the caller
    #[error("builder already finished")]
    AlreadyFinished,

    /// The candidate tree violated invariants; the builder is untouched and
    /// remains mutable
    #[error(transparent)]
    Invalid(#[from] ValidationReport),
}

impl FinishError {
    /// The validation report, when the finish failed validation
    #[must_use]
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Invalid(report) => Some(report),
            Self::AlreadyFinished => None,
        }
    }
}

/// Invariants checked by the finish engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// A required field was absent or blank at finish time
    FieldMissing,
    /// Two same-kind siblings share a name
    DuplicateSiblingName,
    /// A named service reference has no match in the enclosing catalog chain
    UnresolvedServiceReference,
    /// A catalog reference carries no target locator
    EmptyReferenceLocator,
    /// The tree exceeds the configured catalog limits
    LimitExceeded,
}

impl RuleKind {
    /// Stable identifier used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FieldMissing => "field-missing",
            Self::DuplicateSiblingName => "duplicate-sibling-name",
            Self::UnresolvedServiceReference => "unresolved-service-reference",
            Self::EmptyReferenceLocator => "empty-reference-locator",
            Self::LimitExceeded => "limit-exceeded",
        }
    }
}

impl Display for RuleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One violated invariant at one location in the candidate tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Where in the candidate tree the violation sits
    pub path: NodePath,
    /// Which invariant was violated
    pub rule: RuleKind,
    /// The offending value (field name, duplicated name, unresolved
    /// reference, …)
    pub offending: String,
}

impl ValidationFailure {
    pub(crate) fn new(path: NodePath, rule: RuleKind, offending: impl Into<String>) -> Self {
        Self {
            path,
            rule,
            offending: offending.into(),
        }
    }
}

impl Display for ValidationFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.path, self.rule, self.offending)
    }
}

/// Every failure found in one finish pass, in tree traversal order
///
/// The same invalid tree always produces the same report. Finish is
/// all-or-nothing: when a report is returned, no document was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub(crate) fn new(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    /// The failures, ordered by tree traversal order
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// Number of failures
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// A report is never constructed empty, but mirror the slice API anyway
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// True when at least one failure violates the given rule
    #[must_use]
    pub fn violates(&self, rule: RuleKind) -> bool {
        self.failures.iter().any(|failure| failure.rule == rule)
    }

    /// Failures of one rule kind, in report order
    pub fn of_rule(&self, rule: RuleKind) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter().filter(move |f| f.rule == rule)
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failure(s)", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(rule: RuleKind, offending: &str) -> ValidationFailure {
        ValidationFailure::new(NodePath::single("catalog:top"), rule, offending)
    }

    #[test]
    fn report_display_lists_every_failure() {
        let report = ValidationReport::new(vec![
            failure(RuleKind::FieldMissing, "name"),
            failure(RuleKind::EmptyReferenceLocator, "reference"),
        ]);
        let rendered = report.to_string();
        assert!(rendered.starts_with("2 validation failure(s)"));
        assert!(rendered.contains("field-missing"));
        assert!(rendered.contains("empty-reference-locator"));
    }

    #[test]
    fn report_rule_queries() {
        let report = ValidationReport::new(vec![failure(RuleKind::DuplicateSiblingName, "odap")]);
        assert!(report.violates(RuleKind::DuplicateSiblingName));
        assert!(!report.violates(RuleKind::FieldMissing));
        assert_eq!(report.of_rule(RuleKind::DuplicateSiblingName).count(), 1);
    }

    #[test]
    fn finish_error_exposes_report() {
        let report = ValidationReport::new(vec![failure(RuleKind::FieldMissing, "name")]);
        let error = FinishError::from(report.clone());
        assert_eq!(error.report(), Some(&report));
        assert_eq!(FinishError::AlreadyFinished.report(), None);
    }
}
