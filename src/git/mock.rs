use crate::error::{VersionGateError, Result};
use crate::git::{glob_matches, Repository};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Mock repository for testing without actual git operations
///
/// Tags are recorded together with the references that reach them. A tag
/// added with [`MockRepository::add_tag`] exists locally but is reachable
/// from nothing, like a tag cut on an unmerged pull request branch.
pub struct MockRepository {
    tags: BTreeMap<String, BTreeSet<String>>,
    references: BTreeSet<String>,
    files: HashMap<(String, String), Vec<u8>>,
    fetch_error: Option<String>,
    fetch_count: Cell<usize>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            tags: BTreeMap::new(),
            references: BTreeSet::new(),
            files: HashMap::new(),
            fetch_error: None,
            fetch_count: Cell::new(0),
        }
    }

    /// Register a reference with no tags or files
    pub fn add_reference(&mut self, reference: impl Into<String>) {
        self.references.insert(reference.into());
    }

    /// Add a local tag that no reference reaches
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.entry(name.into()).or_default();
    }

    /// Add a tag reachable from `reference`
    pub fn add_tag_on(&mut self, reference: impl Into<String>, name: impl Into<String>) {
        let reference = reference.into();
        self.references.insert(reference.clone());
        self.tags.entry(name.into()).or_default().insert(reference);
    }

    /// Add a file as it exists at `reference`
    pub fn add_file(
        &mut self,
        reference: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) {
        let reference = reference.into();
        self.references.insert(reference.clone());
        self.files.insert((reference, path.into()), content.into());
    }

    /// Make every subsequent fetch fail with the given message
    pub fn fail_fetch(&mut self, message: impl Into<String>) {
        self.fetch_error = Some(message.into());
    }

    /// Number of fetches performed so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }

    fn ensure_reference(&self, reference: &str) -> Result<()> {
        if self.references.contains(reference) {
            Ok(())
        } else {
            Err(VersionGateError::history(format!(
                "Cannot resolve '{}'",
                reference
            )))
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        match &self.fetch_error {
            Some(message) => Err(VersionGateError::history(format!(
                "Fetch of '{}' from '{}' failed: {}",
                branch, remote, message
            ))),
            None => Ok(()),
        }
    }

    fn list_tags(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(self
            .tags
            .keys()
            .filter(|name| glob_matches(pattern, name))
            .cloned()
            .collect())
    }

    fn tags_reachable_from(&self, reference: &str) -> Result<Vec<String>> {
        self.ensure_reference(reference)?;
        Ok(self
            .tags
            .iter()
            .filter(|(_, reached_by)| reached_by.contains(reference))
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn read_file_at(&self, reference: &str, path: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_reference(reference)?;
        Ok(self
            .files
            .get(&(reference.to_string(), path.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_reachability() {
        let mut repo = MockRepository::new();
        repo.add_tag_on("origin/main", "v1.0.0");
        repo.add_tag("v1.1.0.dev0");

        assert_eq!(
            repo.tags_reachable_from("origin/main").unwrap(),
            vec!["v1.0.0".to_string()]
        );
        assert_eq!(repo.list_tags("v*").unwrap().len(), 2);
    }

    #[test]
    fn test_mock_repository_unknown_reference() {
        let repo = MockRepository::new();
        assert!(repo.tags_reachable_from("origin/main").is_err());
        assert!(repo.read_file_at("origin/main", "src/a/__init__.py").is_err());
    }

    #[test]
    fn test_mock_repository_files() {
        let mut repo = MockRepository::new();
        repo.add_file("origin/main", "src/a/__init__.py", "__version__ = '1.0.0'");

        assert!(repo
            .read_file_at("origin/main", "src/a/__init__.py")
            .unwrap()
            .is_some());
        assert_eq!(
            repo.read_file_at("origin/main", "src/b/__init__.py").unwrap(),
            None
        );
    }

    #[test]
    fn test_mock_repository_fetch() {
        let mut repo = MockRepository::new();
        assert!(repo.fetch("origin", "main").is_ok());
        repo.fail_fetch("network down");
        assert!(repo.fetch("origin", "main").is_err());
        assert_eq!(repo.fetch_count(), 2);
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags("*").unwrap().is_empty());
    }
}
