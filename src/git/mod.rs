//! Git history abstraction layer
//!
//! This module provides a trait-based abstraction over the history queries
//! version-gate needs, allowing for a real Git repository and a mock
//! implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! Release resolution and dev-number allocation depend only on the trait, so
//! their rules can be exercised without touching disk.
//!
//! ```rust
//! # use version_gate::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> version_gate::Result<()> {
//! let released = repo.tags_reachable_from("origin/main")?;
//! let local = repo.list_tags("v1.3.0.dev*")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// History query contract consumed by the release rules
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. A query that cannot be
/// performed at all (unknown reference, unreadable object database) is an
/// error; an empty answer is not.
pub trait Repository {
    /// Fetch a branch and all tags from a remote
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    /// * `branch` - Branch to fetch (e.g., "main")
    fn fetch(&self, remote: &str, branch: &str) -> Result<()>;

    /// List local tag names matching a glob pattern (e.g., "v1.2.0.dev*")
    ///
    /// Returns names sorted alphabetically.
    fn list_tags(&self, pattern: &str) -> Result<Vec<String>>;

    /// List tag names whose target commit is reachable from `reference`
    ///
    /// `reference` is anything rev-parse understands ("origin/main", "HEAD").
    fn tags_reachable_from(&self, reference: &str) -> Result<Vec<String>>;

    /// Read a file as it exists at `reference`
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` - File content
    /// * `Ok(None)` - The reference exists but the file does not
    /// * `Err` - If the reference cannot be resolved
    fn read_file_at(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Match a tag name against a `git tag --list` style glob
///
/// Supports `*` and `?`, which is all the release rules ever pass.
pub fn glob_matches(pattern: &str, name: &str) -> bool {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    regex::Regex::new(&format!("^{}$", escaped))
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matches_dev_tags() {
        assert!(glob_matches("v1.3.0.dev*", "v1.3.0.dev0"));
        assert!(glob_matches("v1.3.0.dev*", "v1.3.0.dev12"));
        assert!(!glob_matches("v1.3.0.dev*", "v1.3.0"));
        assert!(!glob_matches("v1.3.0.dev*", "v1.3.01.dev0"));
    }

    #[test]
    fn test_glob_dots_are_literal() {
        assert!(!glob_matches("v1.3.0", "v1x3x0"));
        assert!(glob_matches("v?.3.0", "v1.3.0"));
        assert!(glob_matches("*", "anything"));
    }
}
