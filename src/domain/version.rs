use crate::error::{VersionGateError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The `(major, minor, patch)` projection of a version
///
/// Two versions share a base regardless of their dev counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Base {
    /// Create a new base
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Base {
            major,
            minor,
            patch,
        }
    }

    /// Bump this base according to bump type
    ///
    /// Returns `None` when the bumped component is already at its limit.
    pub fn bump(&self, bump_type: VersionBump) -> Option<Self> {
        match bump_type {
            VersionBump::Major => Some(Base::new(self.major.checked_add(1)?, 0, 0)),
            VersionBump::Minor => Some(Base::new(self.major, self.minor.checked_add(1)?, 0)),
            VersionBump::Patch => {
                Some(Base::new(self.major, self.minor, self.patch.checked_add(1)?))
            }
        }
    }

    /// The bases that are exactly one step ahead of this one
    pub fn next_candidates(&self) -> NextBases {
        NextBases {
            major: self.bump(VersionBump::Major),
            minor: self.bump(VersionBump::Minor),
            patch: self.bump(VersionBump::Patch),
        }
    }

    /// Which one-step bump leads from `self` to `proposed`, if any
    pub fn one_step_to(&self, proposed: &Base) -> Option<VersionBump> {
        [VersionBump::Major, VersionBump::Minor, VersionBump::Patch]
            .into_iter()
            .find(|bump| self.bump(*bump) == Some(*proposed))
    }

    /// The final release of this base
    pub fn release(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }

    /// Pre-release `devN` of this base
    pub fn dev(&self, n: u32) -> Version {
        self.release().with_dev(n)
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The legal one-step successors of a base, used for operator guidance
///
/// A successor is absent when its component cannot be incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextBases {
    pub major: Option<Base>,
    pub minor: Option<Base>,
    pub patch: Option<Base>,
}

impl NextBases {
    pub fn contains(&self, base: &Base) -> bool {
        [self.major, self.minor, self.patch].contains(&Some(*base))
    }
}

impl fmt::Display for NextBases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let candidates: Vec<String> = [
            ("MAJOR", self.major),
            ("MINOR", self.minor),
            ("PATCH", self.patch),
        ]
        .into_iter()
        .filter_map(|(label, base)| base.map(|b| format!("{} {}", label, b)))
        .collect();

        if candidates.is_empty() {
            write!(f, "none (every component is at its limit)")
        } else {
            write!(f, "{}", candidates.join(", "))
        }
    }
}

/// Version of the form `MAJOR.MINOR.PATCH[.devN]`
///
/// Ordering compares the base first. On an equal base every pre-release sorts
/// before the final release, and pre-releases sort by their dev counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub dev: Option<u32>,
}

impl Version {
    /// Create a new final version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
            dev: None,
        }
    }

    /// The bootstrap version used when nothing has been released yet
    pub fn zero() -> Self {
        Version::new(0, 0, 0)
    }

    /// Same base with a dev counter
    pub fn with_dev(self, dev: u32) -> Self {
        Version {
            dev: Some(dev),
            ..self
        }
    }

    /// Parse version from a declared string or a tag (e.g., "v1.2.3.dev4")
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let clean = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(VersionGateError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z or X.Y.Z.devN",
                input
            )));
        }

        let major = parse_component(parts[0], "major", input)?;
        let minor = parse_component(parts[1], "minor", input)?;
        let patch = parse_component(parts[2], "patch", input)?;

        let dev = match parts.get(3) {
            Some(suffix) => {
                let counter = suffix.strip_prefix("dev").ok_or_else(|| {
                    VersionGateError::version(format!(
                        "Invalid pre-release suffix '{}' in '{}' - only devN is supported",
                        suffix, input
                    ))
                })?;
                Some(parse_component(counter, "dev", input)?)
            }
            None => None,
        };

        Ok(Version {
            major,
            minor,
            patch,
            dev,
        })
    }

    pub fn base(&self) -> Base {
        Base::new(self.major, self.minor, self.patch)
    }

    pub fn is_prerelease(&self) -> bool {
        self.dev.is_some()
    }

    /// Whether this is a pre-release of the given base
    pub fn is_prerelease_of(&self, base: &Base) -> bool {
        self.is_prerelease() && self.base() == *base
    }
}

fn parse_component(raw: &str, name: &str, input: &str) -> Result<u32> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(VersionGateError::version(format!(
            "Invalid {} component '{}' in '{}'",
            name, raw, input
        )));
    }
    raw.parse::<u32>().map_err(|_| {
        VersionGateError::version(format!(
            "{} component '{}' in '{}' is out of range",
            name, raw, input
        ))
    })
}

impl FromStr for Version {
    type Err = VersionGateError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.base().cmp(&other.base()).then_with(|| {
            match (self.dev, other.dev) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            }
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        Ok(())
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Major => write!(f, "major"),
            VersionBump::Minor => write!(f, "minor"),
            VersionBump::Patch => write!(f, "patch"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v, Version::new(1, 2, 3));
        assert!(!v.is_prerelease());
    }

    #[test]
    fn test_version_parse_dev() {
        let v = Version::parse("1.3.0.dev2").unwrap();
        assert_eq!(v, Version::new(1, 3, 0).with_dev(2));
        assert!(v.is_prerelease_of(&Base::new(1, 3, 0)));
    }

    #[test]
    fn test_version_parse_uppercase_v() {
        assert_eq!(Version::parse("V0.1.0").unwrap(), Version::new(0, 1, 0));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("1.2.3.rc1").is_err());
        assert!(Version::parse("1.2.3.dev").is_err());
        assert!(Version::parse("1.+2.3").is_err());
        assert!(Version::parse("1.2.3-beta").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_prerelease_sorts_before_final() {
        let dev = Version::parse("1.3.0.dev7").unwrap();
        let final_release = Version::parse("1.3.0").unwrap();
        assert!(dev < final_release);
        assert!(Version::parse("1.2.9").unwrap() < dev);
    }

    #[test]
    fn test_prerelease_ordering_is_numeric() {
        let dev2 = Version::parse("1.3.0.dev2").unwrap();
        let dev10 = Version::parse("1.3.0.dev10").unwrap();
        assert!(dev2 < dev10);
    }

    #[test]
    fn test_version_max_of_mixed_tags() {
        let versions: Vec<Version> = ["1.2.0", "1.3.0.dev1", "1.3.0.dev0", "0.9.9"]
            .iter()
            .map(|s| Version::parse(s).unwrap())
            .collect();
        assert_eq!(
            versions.into_iter().max(),
            Some(Version::new(1, 3, 0).with_dev(1))
        );
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
        assert_eq!(Version::new(1, 2, 3).with_dev(0).to_string(), "1.2.3.dev0");
    }

    #[test]
    fn test_base_next_candidates() {
        let next = Base::new(1, 2, 3).next_candidates();
        assert_eq!(next.major, Some(Base::new(2, 0, 0)));
        assert_eq!(next.minor, Some(Base::new(1, 3, 0)));
        assert_eq!(next.patch, Some(Base::new(1, 2, 4)));
        assert_eq!(next.to_string(), "MAJOR 2.0.0, MINOR 1.3.0, PATCH 1.2.4");
    }

    #[test]
    fn test_base_one_step_to() {
        let base = Base::new(1, 2, 3);
        assert_eq!(base.one_step_to(&Base::new(2, 0, 0)), Some(VersionBump::Major));
        assert_eq!(base.one_step_to(&Base::new(1, 3, 0)), Some(VersionBump::Minor));
        assert_eq!(base.one_step_to(&Base::new(1, 2, 4)), Some(VersionBump::Patch));
        assert_eq!(base.one_step_to(&Base::new(1, 3, 1)), None);
        assert_eq!(base.one_step_to(&Base::new(1, 2, 3)), None);
    }

    #[test]
    fn test_one_step_from_zero_has_three_candidates() {
        let next = Version::zero().base().next_candidates();
        assert!(next.contains(&Base::new(1, 0, 0)));
        assert!(next.contains(&Base::new(0, 1, 0)));
        assert!(next.contains(&Base::new(0, 0, 1)));
    }

    #[test]
    fn test_next_candidates_at_numeric_limit() {
        let base = Base::new(1, 2, u32::MAX);
        let next = base.next_candidates();
        assert_eq!(next.patch, None);
        assert_eq!(next.minor, Some(Base::new(1, 3, 0)));
        assert_eq!(base.one_step_to(&Base::new(2, 0, 0)), Some(VersionBump::Major));
        assert_eq!(next.to_string(), "MAJOR 2.0.0, MINOR 1.3.0");

        let exhausted = Base::new(u32::MAX, u32::MAX, u32::MAX).next_candidates();
        assert_eq!(exhausted.to_string(), "none (every component is at its limit)");
    }
}
