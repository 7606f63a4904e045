use crate::config::RegistryConfig;
use crate::domain::Base;
use crate::error::{VersionGateError, Result};
use crate::registry::PrereleaseRegistry;
use serde::Deserialize;
use std::process::Command;
use tracing::debug;

/// AWS CodeArtifact generic-package registry, queried through the `aws` CLI
///
/// The CLI is used rather than an SDK so the run picks up whatever credentials
/// the CI job already configured for publishing.
#[derive(Debug, Clone)]
pub struct CodeArtifactRegistry {
    program: String,
    domain: String,
    domain_owner: String,
    repository: String,
    namespace: String,
}

#[derive(Debug, Deserialize)]
struct ListPackageVersionsResponse {
    #[serde(default)]
    versions: Vec<PackageVersionSummary>,
}

#[derive(Debug, Deserialize)]
struct PackageVersionSummary {
    version: String,
}

impl CodeArtifactRegistry {
    /// Build a client from the `[registry]` configuration section
    ///
    /// # Returns
    /// * `Err(Config)` - If domain, domain owner, repository or namespace is empty
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let required = [
            ("domain", &config.domain),
            ("domain_owner", &config.domain_owner),
            ("repository", &config.repository),
            ("namespace", &config.namespace),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(VersionGateError::config(format!(
                "codeartifact registry needs registry.{}",
                missing.join(", registry.")
            )));
        }

        Ok(CodeArtifactRegistry {
            program: config.program.clone(),
            domain: config.domain.clone(),
            domain_owner: config.domain_owner.clone(),
            repository: config.repository.clone(),
            namespace: config.namespace.clone(),
        })
    }

    fn list_versions(&self, package: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .args([
                "codeartifact",
                "list-package-versions",
                "--domain",
                &self.domain,
                "--domain-owner",
                &self.domain_owner,
                "--repository",
                &self.repository,
                "--format",
                "generic",
                "--namespace",
                &self.namespace,
                "--package",
                package,
                "--output",
                "json",
            ])
            .output()
            .map_err(|e| {
                VersionGateError::registry(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VersionGateError::registry(format!(
                "{} exited with code {}: {}",
                self.program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extract the `base.devN` versions from a `list-package-versions` response
pub fn parse_prerelease_versions(json: &str, base: &Base) -> Result<Vec<String>> {
    let response: ListPackageVersionsResponse = serde_json::from_str(json).map_err(|e| {
        VersionGateError::registry(format!("Unexpected list-package-versions output: {}", e))
    })?;

    let prefix = format!("{}.dev", base);
    Ok(response
        .versions
        .into_iter()
        .map(|summary| summary.version)
        .filter(|version| version.starts_with(&prefix))
        .collect())
}

impl PrereleaseRegistry for CodeArtifactRegistry {
    fn list_published_prereleases(&self, package: &str, base: &Base) -> Result<Vec<String>> {
        let json = self.list_versions(package)?;
        let versions = parse_prerelease_versions(&json, base)?;
        debug!(package, %base, count = versions.len(), "registry pre-releases");
        Ok(versions)
    }
}
