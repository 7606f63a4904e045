//! Dev pre-release number allocation

use crate::boundary::BoundaryWarning;
use crate::domain::{Base, Tag, Version};
use crate::error::{Result, VersionGateError};
use crate::git::Repository;
use crate::registry::PrereleaseRegistry;
use tracing::{debug, warn};

/// Result of an allocation, with any registry trouble that was recovered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevAllocation {
    pub number: u32,
    pub warnings: Vec<BoundaryWarning>,
}

/// Computes the next `devN` for an accepted base
///
/// The number is one past the highest counter seen in the release state, in
/// local `v{base}.devN` tags and, when configured, in pre-releases already
/// published to the registry for any package of the run.
pub struct DevNumberAllocator<'a, R: Repository + ?Sized> {
    repo: &'a R,
    registry: &'a dyn PrereleaseRegistry,
    packages: Vec<String>,
}

impl<'a, R: Repository + ?Sized> DevNumberAllocator<'a, R> {
    pub fn new(repo: &'a R, registry: &'a dyn PrereleaseRegistry) -> Self {
        DevNumberAllocator {
            repo,
            registry,
            packages: Vec::new(),
        }
    }

    /// Packages whose published pre-releases should be consulted
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    /// Next dev number for `base`
    pub fn allocate(&self, base: Base, release_state: &Version) -> Result<u32> {
        Ok(self.allocate_detailed(base, release_state)?.number)
    }

    /// Next dev number for `base`, reporting recovered registry failures
    ///
    /// A registry error for one package drops only that package's
    /// contribution; answers from the other packages still count.
    ///
    /// # Returns
    /// * `Err` - The local tag listing fails, or the dev counter of `base`
    ///   is already at its limit
    pub fn allocate_detailed(&self, base: Base, release_state: &Version) -> Result<DevAllocation> {
        let mut highest: Option<u32> = None;
        let mut fold = |dev: u32| highest = Some(highest.map_or(dev, |h| h.max(dev)));

        if release_state.is_prerelease_of(&base) {
            if let Some(dev) = release_state.dev {
                fold(dev);
            }
        }

        for name in self.repo.list_tags(&format!("v{}.dev*", base))? {
            match Tag::new(name).version() {
                Some(version) if version.is_prerelease_of(&base) => {
                    if let Some(dev) = version.dev {
                        fold(dev);
                    }
                }
                _ => {}
            }
        }

        let mut warnings = Vec::new();
        for package in &self.packages {
            match self.registry.list_published_prereleases(package, &base) {
                Ok(published) => {
                    for raw in published {
                        match Version::parse(&raw) {
                            Ok(version) if version.is_prerelease_of(&base) => {
                                if let Some(dev) = version.dev {
                                    fold(dev);
                                }
                            }
                            _ => debug!(package = %package, version = %raw, "ignoring registry version"),
                        }
                    }
                }
                Err(e) => {
                    warn!(package = %package, error = %e, "registry unavailable, using local tags only");
                    warnings.push(BoundaryWarning::RegistryUnavailable {
                        package: package.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let number = match highest {
            None => 0,
            Some(h) => h.checked_add(1).ok_or_else(|| {
                VersionGateError::version(format!(
                    "Dev numbers for {} are exhausted: v{}.dev{} already exists",
                    base, base, h
                ))
            })?,
        };
        debug!(%base, number, "allocated dev number");
        Ok(DevAllocation { number, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::registry::NoRegistry;
    use std::collections::HashMap;

    struct FixedRegistry(HashMap<String, Vec<String>>);

    impl PrereleaseRegistry for FixedRegistry {
        fn list_published_prereleases(&self, package: &str, _base: &Base) -> Result<Vec<String>> {
            Ok(self.0.get(package).cloned().unwrap_or_default())
        }
    }

    struct BrokenRegistry;

    impl PrereleaseRegistry for BrokenRegistry {
        fn list_published_prereleases(&self, _package: &str, _base: &Base) -> Result<Vec<String>> {
            Err(VersionGateError::registry("connection refused"))
        }
    }

    fn base() -> Base {
        Base::new(1, 3, 0)
    }

    #[test]
    fn test_first_dev_number_is_zero() {
        let repo = MockRepository::new();
        let allocator = DevNumberAllocator::new(&repo, &NoRegistry);
        assert_eq!(allocator.allocate(base(), &Version::new(1, 2, 0)).unwrap(), 0);
    }

    #[test]
    fn test_continues_from_release_state() {
        let repo = MockRepository::new();
        let allocator = DevNumberAllocator::new(&repo, &NoRegistry);
        let release = Version::new(1, 3, 0).with_dev(2);
        assert_eq!(allocator.allocate(base(), &release).unwrap(), 3);
    }

    #[test]
    fn test_release_state_of_other_base_is_ignored() {
        let repo = MockRepository::new();
        let allocator = DevNumberAllocator::new(&repo, &NoRegistry);
        let release = Version::new(1, 2, 0).with_dev(9);
        assert_eq!(allocator.allocate(base(), &release).unwrap(), 0);
    }

    #[test]
    fn test_local_tags_raise_the_number() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.3.0.dev0");
        repo.add_tag("v1.3.0.dev5");
        repo.add_tag("v1.3.1.dev9");
        repo.add_tag("v1.3.0.devx");

        let allocator = DevNumberAllocator::new(&repo, &NoRegistry);
        assert_eq!(allocator.allocate(base(), &Version::new(1, 2, 0)).unwrap(), 6);
    }

    #[test]
    fn test_allocation_is_idempotent_until_tagged() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.3.0.dev0");
        let release = Version::new(1, 2, 0);

        let first = DevNumberAllocator::new(&repo, &NoRegistry)
            .allocate(base(), &release)
            .unwrap();
        let second = DevNumberAllocator::new(&repo, &NoRegistry)
            .allocate(base(), &release)
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(first, second);

        repo.add_tag("v1.3.0.dev1");
        let third = DevNumberAllocator::new(&repo, &NoRegistry)
            .allocate(base(), &release)
            .unwrap();
        assert_eq!(third, 2);
    }

    #[test]
    fn test_registry_versions_are_folded_in() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.3.0.dev1");
        let registry = FixedRegistry(HashMap::from([
            (
                "sensor".to_string(),
                vec!["1.3.0.dev4".to_string(), "garbage".to_string()],
            ),
            ("motor".to_string(), vec!["1.3.0.dev2".to_string()]),
        ]));

        let allocation = DevNumberAllocator::new(&repo, &registry)
            .with_packages(["motor", "sensor"])
            .allocate_detailed(base(), &Version::new(1, 2, 0))
            .unwrap();
        assert_eq!(allocation.number, 5);
        assert!(allocation.warnings.is_empty());
    }

    #[test]
    fn test_registry_failure_falls_back_to_local_tags() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.3.0.dev3");

        let allocation = DevNumberAllocator::new(&repo, &BrokenRegistry)
            .with_packages(["sensor"])
            .allocate_detailed(base(), &Version::new(1, 2, 0))
            .unwrap();
        assert_eq!(allocation.number, 4);
        assert_eq!(allocation.warnings.len(), 1);
        assert!(matches!(
            &allocation.warnings[0],
            BoundaryWarning::RegistryUnavailable { package, .. } if package == "sensor"
        ));
    }

    #[test]
    fn test_partial_registry_failure_keeps_other_packages() {
        struct HalfBrokenRegistry;

        impl PrereleaseRegistry for HalfBrokenRegistry {
            fn list_published_prereleases(&self, package: &str, _base: &Base) -> Result<Vec<String>> {
                match package {
                    "motor" => Ok(vec!["1.3.0.dev7".to_string()]),
                    _ => Err(VersionGateError::registry("ExpiredToken")),
                }
            }
        }

        let mut repo = MockRepository::new();
        repo.add_tag("v1.3.0.dev1");

        let allocation = DevNumberAllocator::new(&repo, &HalfBrokenRegistry)
            .with_packages(["motor", "sensor"])
            .allocate_detailed(base(), &Version::new(1, 2, 0))
            .unwrap();
        assert_eq!(allocation.number, 8);
        assert!(matches!(
            allocation.warnings.as_slice(),
            [BoundaryWarning::RegistryUnavailable { package, .. }] if package == "sensor"
        ));
    }

    #[test]
    fn test_exhausted_dev_counter_is_an_error() {
        let mut repo = MockRepository::new();
        repo.add_tag(format!("v1.3.0.dev{}", u32::MAX));

        let err = DevNumberAllocator::new(&repo, &NoRegistry)
            .allocate(base(), &Version::new(1, 2, 0))
            .unwrap_err();
        assert!(matches!(err, VersionGateError::Version(_)));
        assert!(err.to_string().contains("1.3.0"));
    }
}
