//! Package registry capability
//!
//! Published artifacts may consume a dev number before its tag reaches the
//! local clone. A registry that can list published pre-releases lets the
//! allocator skip those numbers. Having no registry is the default.

pub mod codeartifact;

pub use codeartifact::CodeArtifactRegistry;

use crate::config::{RegistryConfig, RegistryKind};
use crate::domain::Base;
use crate::error::Result;

/// Lists pre-release versions already published for a package
pub trait PrereleaseRegistry {
    /// Version strings of published pre-releases of `base` for `package`
    ///
    /// Implementations may return unrelated or malformed strings; callers
    /// only fold in the ones that parse as `base.devN`.
    fn list_published_prereleases(&self, package: &str, base: &Base) -> Result<Vec<String>>;
}

/// Registry that knows about nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl PrereleaseRegistry for NoRegistry {
    fn list_published_prereleases(&self, _package: &str, _base: &Base) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Build the configured registry client
pub fn from_config(config: &RegistryConfig) -> Result<Box<dyn PrereleaseRegistry>> {
    match config.kind {
        RegistryKind::None => Ok(Box::new(NoRegistry)),
        RegistryKind::Codeartifact => Ok(Box::new(CodeArtifactRegistry::from_config(config)?)),
    }
}
