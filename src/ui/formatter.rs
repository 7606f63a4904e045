//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text and are testable; `display_*`
//! functions print it. Reports and failures go to stderr, the decided tag to
//! stdout.

use crate::boundary::BoundaryWarning;
use crate::domain::{ExecutionContext, Tag};
use crate::reconcile::ReconcileFailure;
use crate::validator::{BumpOutcome, Decision};
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One observed-versions row: release state, declared version, base and verdict
pub fn format_outcome_row(outcome: &BumpOutcome) -> String {
    let declared = outcome
        .proposed
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());
    let verdict = match &outcome.decision {
        Decision::Accepted { base, rule } => format!("base={} ok ({})", base, rule),
        Decision::Rejected(rejection) => format!("base=- rejected ({})", rejection.kind()),
    };
    format!(
        "{}: released={} declared={} {}",
        outcome.package, outcome.release_state, declared, verdict
    )
}

/// Display every package's observed versions.
///
/// # Arguments
/// * `outcomes` - Per-package outcomes in validation order
pub fn display_observed_versions(outcomes: &[BumpOutcome]) {
    eprintln!("\n{}", style("Observed versions:").bold());
    for outcome in outcomes {
        eprintln!("  - {}", format_outcome_row(outcome));
    }
}

/// Display every reason the run was rejected.
pub fn display_failure_report(failure: &ReconcileFailure) {
    eprintln!("{}", style("Version check failed:").red().bold());
    for reason in failure.reasons() {
        eprintln!("  {}", reason);
    }
}

/// Display the decided tag.
pub fn display_decided_tag(tag: &Tag, context: ExecutionContext) {
    display_success(&format!("Version check passed for {}", context));
    println!("Tag: {}", style(tag).green().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;
    use crate::release::BaseTags;
    use crate::validator::validate;

    #[test]
    fn test_format_accepted_row() {
        let outcome = validate(
            "sensor",
            Version::new(1, 3, 0),
            Version::new(1, 2, 0),
            ExecutionContext::PullRequest,
            BaseTags::default(),
        );
        assert_eq!(
            format_outcome_row(&outcome),
            "sensor: released=1.2.0 declared=1.3.0 base=1.3.0 ok (minor bump)"
        );
    }

    #[test]
    fn test_format_rejected_row() {
        let outcome = validate(
            "motor",
            Version::new(1, 3, 0).with_dev(0),
            Version::new(1, 2, 0),
            ExecutionContext::MergeToMain,
            BaseTags::default(),
        );
        assert_eq!(
            format_outcome_row(&outcome),
            "motor: released=1.2.0 declared=1.3.0.dev0 base=- rejected (PreReleaseOnMerge)"
        );
    }

    #[test]
    fn test_display_functions_do_not_panic() {
        // Visual verification - output goes to the test harness
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_failure_report(&ReconcileFailure::no_packages());
    }
}
