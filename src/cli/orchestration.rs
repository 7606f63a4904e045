//! Main workflow orchestration logic
//!
//! Runs one validation end to end and returns the decision as a value. The
//! binary is the only place that turns a [`RunReport`] into an exit code.

use std::path::Path;

use tracing::{debug, info};

use crate::allocator::DevNumberAllocator;
use crate::boundary::BoundaryWarning;
use crate::config::{Config, ReleaseSource};
use crate::domain::{render, Base, ExecutionContext, Tag, Version};
use crate::error::{Result, VersionGateError};
use crate::git::Repository;
use crate::metadata::{discover_packages, PackageSource};
use crate::reconcile::{reconcile, ReconcileFailure};
use crate::registry::PrereleaseRegistry;
use crate::release::{BaseTags, ReleaseState, ReleaseStateResolver};
use crate::validator::{validate, BumpOutcome, Rejection};

/// Exit code for an accepted run
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code when at least one package or the reconciliation was rejected
pub const EXIT_REJECTED: i32 = 1;
/// Exit code when the run could not reach a decision
pub const EXIT_FATAL: i32 = 2;

/// Arguments for the check workflow
///
/// Mirrors the CLI Args after the CI environment has been folded in, so the
/// workflow can be called programmatically without depending on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckWorkflowArgs {
    pub context: ExecutionContext,

    /// Branch whose history defines what is released
    pub base_branch: String,

    /// Explicit reference to resolve instead of `<remote>/<base_branch>`
    pub reference: Option<String>,

    /// Fetch the base branch and tags first
    pub fetch: bool,
}

/// Result of an accepted run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The tag downstream jobs should create
    pub tag: Tag,

    /// The base every package agreed on
    pub base: Base,

    pub context: ExecutionContext,

    pub outcomes: Vec<BumpOutcome>,

    pub warnings: Vec<BoundaryWarning>,
}

/// Result of a rejected run
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRun {
    pub failure: ReconcileFailure,
    pub outcomes: Vec<BumpOutcome>,
    pub warnings: Vec<BoundaryWarning>,
}

/// The decision of one run
#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    Tagged(WorkflowResult),
    Rejected(RejectedRun),
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunReport::Tagged(_) => EXIT_SUCCESS,
            RunReport::Rejected(_) => EXIT_REJECTED,
        }
    }

    pub fn outcomes(&self) -> &[BumpOutcome] {
        match self {
            RunReport::Tagged(result) => &result.outcomes,
            RunReport::Rejected(run) => &run.outcomes,
        }
    }

    pub fn warnings(&self) -> &[BoundaryWarning] {
        match self {
            RunReport::Tagged(result) => &result.warnings,
            RunReport::Rejected(run) => &run.warnings,
        }
    }

    pub fn tag(&self) -> Option<&Tag> {
        match self {
            RunReport::Tagged(result) => Some(&result.tag),
            RunReport::Rejected(_) => None,
        }
    }
}

/// Main check workflow
///
/// Orchestrates one run:
/// 1. Fetch the base branch and tags
/// 2. Resolve the release state from reachable tags
/// 3. Discover packages and validate each declared version
/// 4. Reconcile all packages onto one base
/// 5. Allocate the dev number (pull requests) and render the tag
///
/// # Arguments
///
/// * `repo` - History queries
/// * `registry` - Published pre-release lookup for dev numbers
/// * `workspace_root` - Working tree containing the packages
/// * `config` - version-gate configuration
/// * `args` - Run arguments
///
/// # Returns
///
/// * `Ok(RunReport)` - A decision, accepted or rejected
/// * `Err` - History could not be read; no decision is possible
pub fn run_check<R: Repository + ?Sized>(
    repo: &R,
    registry: &dyn PrereleaseRegistry,
    workspace_root: &Path,
    config: &Config,
    args: &CheckWorkflowArgs,
) -> Result<RunReport> {
    let reference = args
        .reference
        .clone()
        .unwrap_or_else(|| config.repository.reference_for(&args.base_branch));

    if args.fetch {
        repo.fetch(&config.repository.remote, &args.base_branch)?;
    }

    let mut warnings = Vec::new();

    let tag_state = match config.release.source {
        ReleaseSource::Tags => {
            let state = ReleaseStateResolver::new(repo).resolve(&reference)?;
            if state.is_bootstrap() {
                warnings.push(BoundaryWarning::NoReleaseTags {
                    reference: reference.clone(),
                });
            }
            Some(state)
        }
        ReleaseSource::Metadata => None,
    };

    let sources = discover_packages(workspace_root, &config.packages)?;
    info!(
        packages = sources.len(),
        context = %args.context,
        reference = %reference,
        "validating version bumps"
    );

    let mut outcomes = Vec::with_capacity(sources.len());
    for source in &sources {
        let release_state = match &tag_state {
            Some(state) => state.version,
            None => match released_from_metadata(repo, source, &reference, &mut warnings)? {
                Ok(version) => version,
                Err(rejection) => {
                    outcomes.push(BumpOutcome::unreadable(
                        &source.name,
                        Version::zero(),
                        rejection,
                    ));
                    continue;
                }
            },
        };

        let package = match source.read_declared() {
            Ok(package) => package,
            Err(e) => {
                outcomes.push(BumpOutcome::unreadable(
                    &source.name,
                    release_state,
                    rejection_for(&e, &source.relative_path),
                ));
                continue;
            }
        };

        let tags = BaseTags::query(repo, &package.declared_version.base())?;
        let outcome = validate(
            &package.name,
            package.declared_version,
            release_state,
            args.context,
            tags,
        );
        debug!(package = %outcome.package, accepted = outcome.accepted(), "validated");
        outcomes.push(outcome);
    }

    let base = match reconcile(&outcomes) {
        Ok(base) => base,
        Err(failure) => {
            info!(reasons = failure.reasons().len(), "version check rejected");
            return Ok(RunReport::Rejected(RejectedRun {
                failure,
                outcomes,
                warnings,
            }));
        }
    };

    let dev_number = if args.context.is_pull_request() {
        let release_state = allocation_release_state(&outcomes, &base);
        let allocation = DevNumberAllocator::new(repo, registry)
            .with_packages(outcomes.iter().map(|o| o.package.clone()))
            .allocate_detailed(base, &release_state)?;
        warnings.extend(allocation.warnings);
        Some(allocation.number)
    } else {
        None
    };

    let tag = render(base, args.context, dev_number)?;
    info!(tag = %tag, "version check passed");

    Ok(RunReport::Tagged(WorkflowResult {
        tag,
        base,
        context: args.context,
        outcomes,
        warnings,
    }))
}

/// Release state of one package from its version file on the base branch
///
/// The outer `Result` carries fatal history errors, the inner one a
/// per-package rejection for the batch report.
fn released_from_metadata<R: Repository + ?Sized>(
    repo: &R,
    source: &PackageSource,
    reference: &str,
    warnings: &mut Vec<BoundaryWarning>,
) -> Result<std::result::Result<Version, Rejection>> {
    match source.read_released(repo, reference) {
        Ok(Some(version)) => Ok(Ok(version)),
        Ok(None) => {
            warnings.push(BoundaryWarning::MissingMetadataFile {
                package: source.name.clone(),
                path: source.relative_path.clone(),
                reference: reference.to_string(),
            });
            Ok(Ok(ReleaseState::bootstrap().version))
        }
        Err(e) if e.is_fatal_history() => Err(e),
        Err(e) => Ok(Err(rejection_for(
            &e,
            &format!("{} at {}", source.relative_path, reference),
        ))),
    }
}

fn rejection_for(error: &VersionGateError, location: &str) -> Rejection {
    match error {
        VersionGateError::Metadata(_) => Rejection::MissingDeclaredVersion {
            path: location.to_string(),
        },
        VersionGateError::Version(message) => Rejection::MalformedVersionString {
            location: location.to_string(),
            message: message.clone(),
        },
        other => Rejection::MalformedVersionString {
            location: location.to_string(),
            message: other.to_string(),
        },
    }
}

/// Highest release state among the packages that settled on `base`
fn allocation_release_state(outcomes: &[BumpOutcome], base: &Base) -> Version {
    outcomes
        .iter()
        .filter(|o| o.resolved_base().as_ref() == Some(base))
        .map(|o| o.release_state)
        .max()
        .unwrap_or_else(Version::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_for_missing_declaration() {
        let rejection = rejection_for(&VersionGateError::metadata("nothing"), "src/a/__init__.py");
        assert_eq!(
            rejection,
            Rejection::MissingDeclaredVersion {
                path: "src/a/__init__.py".to_string()
            }
        );
    }

    #[test]
    fn test_rejection_for_malformed_version() {
        let rejection = rejection_for(&VersionGateError::version("bad"), "src/a/__init__.py");
        assert_eq!(rejection.kind(), "MalformedVersionString");
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_REJECTED);
        assert_ne!(EXIT_REJECTED, EXIT_FATAL);
        assert_ne!(EXIT_SUCCESS, EXIT_FATAL);
    }
}
