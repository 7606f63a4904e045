//! Cross-package reconciliation onto a single base version

use crate::domain::Base;
use crate::validator::{BumpOutcome, Rejection};
use std::collections::BTreeMap;
use std::fmt;

/// Accepted packages that disagree on the base to release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConflict {
    /// Every distinct base and the packages proposing it
    pub proposals: BTreeMap<Base, Vec<String>>,
}

impl fmt::Display for BaseConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listed: Vec<String> = self
            .proposals
            .iter()
            .map(|(base, packages)| format!("{} ({})", base, packages.join(", ")))
            .collect();
        write!(
            f,
            "MultipleBasesProposed: packages must agree on one base version, found {}",
            listed.join("; ")
        )
    }
}

/// Everything that prevented a run from agreeing on a base
///
/// Reports are cumulative: every rejected package is listed, and a base
/// conflict among the accepted ones is reported alongside them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileFailure {
    pub rejections: Vec<(String, Rejection)>,
    pub conflict: Option<BaseConflict>,
    /// No package took part in the run
    pub no_packages: bool,
}

impl ReconcileFailure {
    /// Report for a run that found nothing to validate
    pub fn no_packages() -> Self {
        ReconcileFailure {
            no_packages: true,
            ..Default::default()
        }
    }

    /// One line per failure, in package order, conflict last
    pub fn reasons(&self) -> Vec<String> {
        let mut reasons: Vec<String> = self
            .rejections
            .iter()
            .map(|(package, rejection)| format!("[{}] {}", package, rejection))
            .collect();
        if let Some(conflict) = &self.conflict {
            reasons.push(conflict.to_string());
        }
        if self.no_packages {
            reasons.push("No packages found to validate".to_string());
        }
        reasons
    }
}

impl fmt::Display for ReconcileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reasons().join("\n"))
    }
}

impl std::error::Error for ReconcileFailure {}

/// Reduce per-package outcomes to the run's single accepted base
///
/// # Returns
/// * `Ok(Base)` - Every package was accepted and all proposed the same base
/// * `Err(ReconcileFailure)` - Every rejection and any base disagreement
pub fn reconcile(outcomes: &[BumpOutcome]) -> Result<Base, ReconcileFailure> {
    if outcomes.is_empty() {
        return Err(ReconcileFailure::no_packages());
    }

    let mut failure = ReconcileFailure::default();
    let mut proposals: BTreeMap<Base, Vec<String>> = BTreeMap::new();

    for outcome in outcomes {
        match (outcome.resolved_base(), outcome.rejection()) {
            (Some(base), _) => proposals
                .entry(base)
                .or_default()
                .push(outcome.package.clone()),
            (None, Some(rejection)) => failure
                .rejections
                .push((outcome.package.clone(), rejection.clone())),
            (None, None) => {}
        }
    }

    if proposals.len() > 1 {
        failure.conflict = Some(BaseConflict { proposals });
        return Err(failure);
    }

    if !failure.rejections.is_empty() {
        return Err(failure);
    }

    proposals
        .into_keys()
        .next()
        .ok_or_else(ReconcileFailure::no_packages)
}
