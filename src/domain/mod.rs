//! Domain logic - pure version rules independent of git operations

pub mod context;
pub mod tag;
pub mod version;

pub use context::{CiEnvironment, ExecutionContext};
pub use tag::{render, Tag};
pub use version::{Base, NextBases, Version, VersionBump};
