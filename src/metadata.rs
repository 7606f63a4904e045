//! Package discovery and declared-version parsing

use crate::config::PackagesConfig;
use crate::domain::Version;
use crate::error::{VersionGateError, Result};
use crate::git::Repository;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn declared_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^__version__\s*=\s*['"]([^'"]+)['"]\s*$"#)
            .expect("declared version regex is valid")
    })
}

/// One component of the monorepo, released together with the others
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub declared_version: Version,
}

/// Where a package declares its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    pub name: String,
    /// Absolute path in the working tree
    pub path: PathBuf,
    /// Repository-relative path with forward slashes, for history lookups
    pub relative_path: String,
}

impl PackageSource {
    /// Read and parse the declared version from the working tree
    pub fn read_declared(&self) -> Result<Package> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            VersionGateError::metadata(format!("Cannot read {}: {}", self.relative_path, e))
        })?;
        let declared_version = parse_declared_version(&text, &self.relative_path)?;
        Ok(Package {
            name: self.name.clone(),
            declared_version,
        })
    }

    /// Read the declared version as committed at `reference`
    ///
    /// # Returns
    /// * `Ok(Some(version))` - Version declared at the reference
    /// * `Ok(None)` - The version file does not exist there (new package)
    /// * `Err` - History failure, or the committed file has no valid version
    pub fn read_released<R: Repository + ?Sized>(
        &self,
        repo: &R,
        reference: &str,
    ) -> Result<Option<Version>> {
        match repo.read_file_at(reference, &self.relative_path)? {
            Some(bytes) => {
                let text = String::from_utf8_lossy(&bytes);
                let location = format!("{} at {}", self.relative_path, reference);
                parse_declared_version(&text, &location).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Find every package under the configured source directory, sorted by name
pub fn discover_packages(root: &Path, config: &PackagesConfig) -> Result<Vec<PackageSource>> {
    let source_dir = root.join(&config.source_dir);
    if !source_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut packages = Vec::new();
    for entry in fs::read_dir(&source_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path().join(&config.version_file);
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let relative_path = Path::new(&config.source_dir)
            .join(&name)
            .join(&config.version_file)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        packages.push(PackageSource {
            name,
            path,
            relative_path,
        });
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

/// Parse `__version__ = "X.Y.Z[.devN]"` out of a version file
///
/// # Returns
/// * `Err(Metadata)` - No declaration found
/// * `Err(Version)` - A declaration exists but is not a valid version
pub fn parse_declared_version(text: &str, location: &str) -> Result<Version> {
    let captures = declared_version_regex().captures(text).ok_or_else(|| {
        VersionGateError::metadata(format!(
            "Could not find __version__ = '...' in {}",
            location
        ))
    })?;

    Version::parse(&captures[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use tempfile::TempDir;

    #[test]
    fn test_parse_declared_version_double_quotes() {
        let text = "\"\"\"Sensor driver.\"\"\"\n\n__version__ = \"1.3.0\"\n";
        assert_eq!(
            parse_declared_version(text, "x").unwrap(),
            Version::new(1, 3, 0)
        );
    }

    #[test]
    fn test_parse_declared_version_single_quotes_and_dev() {
        let text = "import os\n__version__='2.0.0.dev1'   \n";
        assert_eq!(
            parse_declared_version(text, "x").unwrap(),
            Version::new(2, 0, 0).with_dev(1)
        );
    }

    #[test]
    fn test_parse_declared_version_missing() {
        let err = parse_declared_version("VERSION = '1.0.0'\n", "src/a/__init__.py").unwrap_err();
        assert!(matches!(err, VersionGateError::Metadata(_)));
        assert!(err.to_string().contains("src/a/__init__.py"));
    }

    #[test]
    fn test_parse_declared_version_indented_is_ignored() {
        let err = parse_declared_version("    __version__ = '1.0.0'\n", "x").unwrap_err();
        assert!(matches!(err, VersionGateError::Metadata(_)));
    }

    #[test]
    fn test_parse_declared_version_malformed() {
        let err = parse_declared_version("__version__ = '1.0.0rc1'\n", "x").unwrap_err();
        assert!(matches!(err, VersionGateError::Version(_)));
    }

    #[test]
    fn test_discover_packages_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta", "alpha", "no_version"] {
            fs::create_dir_all(dir.path().join("src").join(name)).unwrap();
        }
        fs::write(dir.path().join("src/zeta/__init__.py"), "__version__ = '1.0.0'\n").unwrap();
        fs::write(dir.path().join("src/alpha/__init__.py"), "__version__ = '1.0.0'\n").unwrap();
        fs::write(dir.path().join("src/stray.py"), "").unwrap();

        let packages = discover_packages(dir.path(), &PackagesConfig::default()).unwrap();
        let names: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(packages[0].relative_path, "src/alpha/__init__.py");
        assert_eq!(
            packages[0].read_declared().unwrap().declared_version,
            Version::new(1, 0, 0)
        );
    }

    #[test]
    fn test_discover_packages_without_source_dir() {
        let dir = TempDir::new().unwrap();
        let packages = discover_packages(dir.path(), &PackagesConfig::default()).unwrap();
        assert!(packages.is_empty());
    }

    #[test]
    fn test_read_released() {
        let mut repo = MockRepository::new();
        repo.add_file(
            "origin/main",
            "src/alpha/__init__.py",
            "__version__ = \"1.2.0\"\n",
        );
        let source = |name: &str| PackageSource {
            name: name.to_string(),
            path: PathBuf::from(format!("/work/src/{}/__init__.py", name)),
            relative_path: format!("src/{}/__init__.py", name),
        };

        assert_eq!(
            source("alpha").read_released(&repo, "origin/main").unwrap(),
            Some(Version::new(1, 2, 0))
        );
        assert_eq!(
            source("beta").read_released(&repo, "origin/main").unwrap(),
            None
        );
        assert!(source("alpha").read_released(&repo, "origin/dev").is_err());
    }
}
