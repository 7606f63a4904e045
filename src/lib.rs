pub mod allocator;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod metadata;
pub mod output;
pub mod reconcile;
pub mod registry;
pub mod release;
pub mod ui;
pub mod validator;

pub use error::{Result, VersionGateError};
