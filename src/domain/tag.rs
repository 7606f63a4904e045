use crate::domain::{Base, ExecutionContext, Version};
use crate::error::{VersionGateError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn canonical_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^v(\d+)\.(\d+)\.(\d+)(?:\.dev(\d+))?$").expect("canonical tag regex is valid")
    })
}

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Version carried by a canonical tag (`vX.Y.Z` or `vX.Y.Z.devN`)
    ///
    /// Returns `None` for anything else, including tags whose numbers overflow.
    pub fn version(&self) -> Option<Version> {
        if !canonical_tag_regex().is_match(&self.name) {
            return None;
        }
        Version::parse(&self.name).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Render the tag for a decided run
///
/// Merges get `vX.Y.Z`; pull requests get `vX.Y.Z.devN` and must supply the
/// allocated counter. Any other combination is refused.
pub fn render(base: Base, context: ExecutionContext, dev_number: Option<u32>) -> Result<Tag> {
    match (context, dev_number) {
        (ExecutionContext::MergeToMain, None) => Ok(Tag::new(format!("v{}", base))),
        (ExecutionContext::PullRequest, Some(n)) => Ok(Tag::new(format!("v{}.dev{}", base, n))),
        (ExecutionContext::MergeToMain, Some(n)) => Err(VersionGateError::tag(format!(
            "a merge to main cannot carry a dev number (got dev{} for {})",
            n, base
        ))),
        (ExecutionContext::PullRequest, None) => Err(VersionGateError::tag(format!(
            "a pull request tag for {} needs an allocated dev number",
            base
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_version_final() {
        let tag = Tag::new("v1.2.3");
        assert_eq!(tag.version(), Some(Version::new(1, 2, 3)));
    }

    #[test]
    fn test_tag_version_dev() {
        let tag = Tag::new("v1.3.0.dev12");
        assert_eq!(tag.version(), Some(Version::new(1, 3, 0).with_dev(12)));
    }

    #[test]
    fn test_non_canonical_tags_are_ignored() {
        for name in [
            "1.2.3",
            "V1.2.3",
            "vv1.2.3",
            "release-1.2.3",
            "v1.2",
            "v1.2.3-rc1",
            "v1.2.3.rc1",
            "v1.2.3.dev",
            "v99999999999.0.0",
        ] {
            assert_eq!(Tag::new(name).version(), None, "{} should not parse", name);
        }
    }

    #[test]
    fn test_render_merge() {
        let tag = render(Base::new(1, 3, 0), ExecutionContext::MergeToMain, None).unwrap();
        assert_eq!(tag.as_str(), "v1.3.0");
    }

    #[test]
    fn test_render_pull_request() {
        let tag = render(Base::new(1, 3, 0), ExecutionContext::PullRequest, Some(3)).unwrap();
        assert_eq!(tag.as_str(), "v1.3.0.dev3");
    }

    #[test]
    fn test_render_rejects_mismatched_inputs() {
        assert!(render(Base::new(1, 3, 0), ExecutionContext::MergeToMain, Some(0)).is_err());
        assert!(render(Base::new(1, 3, 0), ExecutionContext::PullRequest, None).is_err());
    }

    #[test]
    fn test_rendered_tag_parses_back() {
        let tag = render(Base::new(2, 0, 0), ExecutionContext::PullRequest, Some(0)).unwrap();
        assert_eq!(tag.version(), Some(Base::new(2, 0, 0).dev(0)));
    }
}
