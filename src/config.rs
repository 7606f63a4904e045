use crate::error::{VersionGateError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "versiongate.toml";

/// Represents the complete configuration for version-gate.
///
/// Contains the repository to compare against, where packages live, how the
/// release state is derived, the optional registry and output settings.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

/// Where the released history lives.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Target branch; `GITHUB_BASE_REF` takes precedence when set
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Fetch the base branch and tags before resolving the release state
    #[serde(default = "default_true")]
    pub fetch: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            remote: default_remote(),
            base_branch: default_base_branch(),
            fetch: true,
        }
    }
}

impl RepositoryConfig {
    /// Branch to validate against, preferring a non-empty CI override
    pub fn effective_base_branch(&self, ci_base_ref: Option<&str>) -> String {
        match ci_base_ref.map(str::trim) {
            Some(branch) if !branch.is_empty() => branch.to_string(),
            _ => self.base_branch.clone(),
        }
    }

    /// Remote-tracking reference for a branch (e.g., "origin/main")
    pub fn reference_for(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_version_file() -> String {
    "__init__.py".to_string()
}

/// Package discovery: every `<source_dir>/<name>/<version_file>` is a package.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PackagesConfig {
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    #[serde(default = "default_version_file")]
    pub version_file: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        PackagesConfig {
            source_dir: default_source_dir(),
            version_file: default_version_file(),
        }
    }
}

/// How the currently released version is derived.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseSource {
    /// Highest canonical tag reachable from the base branch
    #[default]
    Tags,
    /// Each package's declared version as committed on the base branch
    Metadata,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default)]
    pub source: ReleaseSource,
}

/// Which registry client, if any, to consult for published pre-releases.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    #[default]
    None,
    Codeartifact,
}

fn default_registry_program() -> String {
    "aws".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RegistryConfig {
    #[serde(default)]
    pub kind: RegistryKind,

    /// Executable used to query the registry
    #[serde(default = "default_registry_program")]
    pub program: String,

    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub domain_owner: String,

    #[serde(default)]
    pub repository: String,

    #[serde(default)]
    pub namespace: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            kind: RegistryKind::None,
            program: default_registry_program(),
            domain: String::new(),
            domain_owner: String::new(),
            repository: String::new(),
            namespace: String::new(),
        }
    }
}

fn default_output_key() -> String {
    "tag".to_string()
}

/// Where the decided tag is published for downstream jobs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Append `<key>=<tag>` to the file named by `GITHUB_OUTPUT`
    #[serde(default = "default_true")]
    pub github_output: bool,

    #[serde(default = "default_output_key")]
    pub key: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            github_output: true,
            key: default_output_key(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `versiongate.toml` in current directory
/// 3. `.versiongate.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        read_config_file(Path::new(CONFIG_FILE_NAME))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(config_str: &str) -> Result<Config> {
    toml::from_str(config_str).map_err(|e| VersionGateError::config(e.to_string()))
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        VersionGateError::config(format!("Cannot read {}: {}", path.display(), e))
    })
}
