//! Run orchestration behind the command-line entry point

pub mod orchestration;

pub use orchestration::{run_check, CheckWorkflowArgs, RunReport, WorkflowResult};
