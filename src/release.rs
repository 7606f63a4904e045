//! Release state resolution from tag history

use crate::domain::{Base, Tag, Version};
use crate::error::{VersionGateError, Result};
use crate::git::Repository;
use tracing::debug;

/// Derives the currently released version from tags reachable from a branch
pub struct ReleaseStateResolver<'a, R: Repository + ?Sized> {
    repo: &'a R,
}

impl<'a, R: Repository + ?Sized> ReleaseStateResolver<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        ReleaseStateResolver { repo }
    }

    /// Highest canonical tag reachable from `reference`, or `0.0.0` if none
    ///
    /// # Returns
    /// * `Ok(ReleaseState)` - The released version and the tag it came from
    /// * `Err(HistoryUnavailable)` - If the reachable tag set cannot be queried
    pub fn resolve(&self, reference: &str) -> Result<ReleaseState> {
        let names = self
            .repo
            .tags_reachable_from(reference)
            .map_err(|e| {
                if matches!(e, VersionGateError::HistoryUnavailable(_)) {
                    e
                } else {
                    VersionGateError::history(format!(
                        "Cannot list tags reachable from '{}': {}",
                        reference, e
                    ))
                }
            })?;

        let latest = names
            .into_iter()
            .map(Tag::new)
            .filter_map(|tag| tag.version().map(|version| (version, tag)))
            .max_by(|(a, _), (b, _)| a.cmp(b));

        let state = match latest {
            Some((version, tag)) => ReleaseState {
                version,
                tag: Some(tag),
            },
            None => ReleaseState::bootstrap(),
        };

        debug!(reference, release = %state.version, "resolved release state");
        Ok(state)
    }
}

/// The version judged to be released on the target branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseState {
    pub version: Version,
    /// The tag the version was read from; `None` when bootstrapping
    pub tag: Option<Tag>,
}

impl ReleaseState {
    /// Nothing released yet
    pub fn bootstrap() -> Self {
        ReleaseState {
            version: Version::zero(),
            tag: None,
        }
    }

    /// A release state that did not come from a tag (declared metadata)
    pub fn from_version(version: Version) -> Self {
        ReleaseState { version, tag: None }
    }

    pub fn is_bootstrap(&self) -> bool {
        self.tag.is_none() && self.version == Version::zero()
    }
}

/// Which kinds of tag already exist locally for one base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseTags {
    pub has_final: bool,
    pub has_dev: bool,
}

impl BaseTags {
    /// Look up the final and dev tags of `base` among local tags
    pub fn query<R: Repository + ?Sized>(repo: &R, base: &Base) -> Result<Self> {
        let mut tags = BaseTags::default();

        for name in repo.list_tags(&format!("v{}*", base))? {
            match Tag::new(name).version() {
                Some(version) if version.base() != *base => {}
                Some(version) if version.is_prerelease() => tags.has_dev = true,
                Some(_) => tags.has_final = true,
                None => {}
            }
        }

        Ok(tags)
    }
}
