//! User interface module - console reporting for CI logs.
//!
//! Runs are non-interactive, so this module only formats and prints.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_decided_tag, display_error, display_failure_report,
    display_observed_versions, display_status, display_success, format_outcome_row,
};
