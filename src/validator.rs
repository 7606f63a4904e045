//! Version bump validation
//!
//! Decides whether a package's declared version is a legal successor of the
//! released version. The decision is a value, never a process exit, so every
//! rule can be tested in isolation.
//!
//! The one-step rule accepts exactly `(M+1,0,0)`, `(M,m+1,0)` and `(M,m,p+1)`
//! relative to the released base `(M,m,p)`. Pull requests may additionally
//! keep iterating on a base that is mid dev cycle, or adopt the released base
//! itself when it was never tagged final. Merges may close a dev cycle but
//! never land a pre-release.

use crate::domain::{Base, ExecutionContext, NextBases, Version, VersionBump};
use crate::release::BaseTags;
use std::fmt;

/// Why a proposal was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Exactly one major, minor or patch step ahead of the release
    OneStep(VersionBump),
    /// Pull request iterating on the base the release is a pre-release of
    DevContinuation,
    /// Pull request adopting the released base before it was ever tagged final
    Bootstrap,
    /// Merge landing the final release of a base that only has dev tags
    FinishDevCycle,
}

impl fmt::Display for Acceptance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acceptance::OneStep(bump) => write!(f, "{} bump", bump),
            Acceptance::DevContinuation => write!(f, "dev cycle continuation"),
            Acceptance::Bootstrap => write!(f, "bootstrap of untagged base"),
            Acceptance::FinishDevCycle => write!(f, "dev cycle finished"),
        }
    }
}

/// Why a package was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The declared version (or the released one) does not parse
    MalformedVersionString { location: String, message: String },
    /// The version file has no `__version__` declaration
    MissingDeclaredVersion { path: String },
    /// The proposal is not greater than the released version
    NonMonotonicBump {
        proposed: Version,
        released: Version,
        next: NextBases,
    },
    /// A merge carried a `.devN` suffix
    PreReleaseOnMerge {
        proposed: Version,
        released: Version,
        next: NextBases,
    },
    /// The proposed base skips or repeats a step
    InvalidOneStepBump {
        proposed: Version,
        released: Version,
        context: ExecutionContext,
        next: NextBases,
    },
}

impl Rejection {
    /// Stable name of the rejection kind
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::MalformedVersionString { .. } => "MalformedVersionString",
            Rejection::MissingDeclaredVersion { .. } => "MissingDeclaredVersion",
            Rejection::NonMonotonicBump { .. } => "NonMonotonicBump",
            Rejection::PreReleaseOnMerge { .. } => "PreReleaseOnMerge",
            Rejection::InvalidOneStepBump { .. } => "InvalidOneStepBump",
        }
    }

    /// The legal next bases, when the rejection came from a bump rule
    pub fn next_bases(&self) -> Option<&NextBases> {
        match self {
            Rejection::NonMonotonicBump { next, .. }
            | Rejection::PreReleaseOnMerge { next, .. }
            | Rejection::InvalidOneStepBump { next, .. } => Some(next),
            _ => None,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MalformedVersionString { location, message } => {
                write!(f, "{}: {}: {}", self.kind(), location, message)
            }
            Rejection::MissingDeclaredVersion { path } => write!(
                f,
                "{}: no __version__ = \"X.Y.Z\" declaration in {}",
                self.kind(),
                path
            ),
            Rejection::NonMonotonicBump {
                proposed,
                released,
                next,
            } => write!(
                f,
                "{}: {} is not greater than released {}. Expected one of: {}",
                self.kind(),
                proposed,
                released,
                next
            ),
            Rejection::PreReleaseOnMerge {
                proposed,
                released,
                next,
            } => write!(
                f,
                "{}: merges must land a final release, found {} (released {}). Expected one of: {}",
                self.kind(),
                proposed,
                released,
                next
            ),
            Rejection::InvalidOneStepBump {
                proposed,
                released,
                context,
                next,
            } => write!(
                f,
                "{}: {} is not exactly one step from released {} on {}. Expected one of: {}",
                self.kind(),
                proposed,
                released,
                context,
                next
            ),
        }
    }
}

/// Accept/Reject verdict for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted { base: Base, rule: Acceptance },
    Rejected(Rejection),
}

/// Per-package result of validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpOutcome {
    pub package: String,
    /// Declared version; `None` when it could not be read
    pub proposed: Option<Version>,
    /// Release state the package was validated against
    pub release_state: Version,
    pub decision: Decision,
}

impl BumpOutcome {
    /// Outcome for a package whose declared version could not be read
    pub fn unreadable(
        package: impl Into<String>,
        release_state: Version,
        rejection: Rejection,
    ) -> Self {
        BumpOutcome {
            package: package.into(),
            proposed: None,
            release_state,
            decision: Decision::Rejected(rejection),
        }
    }

    pub fn accepted(&self) -> bool {
        matches!(self.decision, Decision::Accepted { .. })
    }

    pub fn resolved_base(&self) -> Option<Base> {
        match self.decision {
            Decision::Accepted { base, .. } => Some(base),
            Decision::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match &self.decision {
            Decision::Rejected(rejection) => Some(rejection),
            Decision::Accepted { .. } => None,
        }
    }

    /// Human readable rejection reason
    pub fn reason(&self) -> Option<String> {
        self.rejection().map(|r| r.to_string())
    }
}

/// Validate one proposed version against the release state
///
/// # Arguments
/// * `package` - Package name, carried into the outcome
/// * `proposed` - The declared version of the package
/// * `release_state` - The currently released version
/// * `context` - Pull request or merge to main
/// * `tags` - Which tags already exist for the *proposed* base
pub fn validate(
    package: &str,
    proposed: Version,
    release_state: Version,
    context: ExecutionContext,
    tags: BaseTags,
) -> BumpOutcome {
    let decision = decide(proposed, release_state, context, tags);
    BumpOutcome {
        package: package.to_string(),
        proposed: Some(proposed),
        release_state,
        decision,
    }
}

fn decide(
    proposed: Version,
    release_state: Version,
    context: ExecutionContext,
    tags: BaseTags,
) -> Decision {
    let released_base = release_state.base();
    let proposed_base = proposed.base();
    let next = released_base.next_candidates();
    let accept = |rule| Decision::Accepted {
        base: proposed_base,
        rule,
    };

    // Adopting an untagged released base is the one case where "equal" is
    // legal, so it is settled before monotonicity.
    if context.is_pull_request()
        && !release_state.is_prerelease()
        && proposed_base == released_base
        && !tags.has_final
    {
        return accept(Acceptance::Bootstrap);
    }

    if proposed <= release_state {
        return Decision::Rejected(Rejection::NonMonotonicBump {
            proposed,
            released: release_state,
            next,
        });
    }

    match context {
        ExecutionContext::PullRequest => {
            if release_state.is_prerelease_of(&proposed_base) {
                return accept(Acceptance::DevContinuation);
            }
        }
        ExecutionContext::MergeToMain => {
            if proposed.is_prerelease() {
                return Decision::Rejected(Rejection::PreReleaseOnMerge {
                    proposed,
                    released: release_state,
                    next,
                });
            }
            let mid_dev_cycle = tags.has_dev || release_state.is_prerelease();
            if proposed_base == released_base && mid_dev_cycle && !tags.has_final {
                return accept(Acceptance::FinishDevCycle);
            }
        }
    }

    match released_base.one_step_to(&proposed_base) {
        Some(bump) => accept(Acceptance::OneStep(bump)),
        None => Decision::Rejected(Rejection::InvalidOneStepBump {
            proposed,
            released: release_state,
            context,
            next,
        }),
    }
}
