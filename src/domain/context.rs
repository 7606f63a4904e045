use std::fmt;

/// Where the run was triggered from
///
/// Fixed for the whole run. Pull requests iterate on dev pre-releases, merges
/// must land a final release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExecutionContext {
    PullRequest,
    MergeToMain,
}

/// The CI variables that decide the execution context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
    pub event_name: String,
    pub head_ref: String,
}

impl CiEnvironment {
    /// Read the GitHub Actions trigger variables from the process environment
    pub fn from_env() -> Self {
        CiEnvironment {
            event_name: std::env::var("GITHUB_EVENT_NAME").unwrap_or_default(),
            head_ref: std::env::var("GITHUB_HEAD_REF").unwrap_or_default(),
        }
    }
}

impl ExecutionContext {
    /// Detect the context from CI trigger metadata
    ///
    /// `pull_request` and `pull_request_target` events, or any run with a head
    /// ref, are pull requests. Everything else validates as a merge, which is
    /// the stricter rule set.
    pub fn detect(env: &CiEnvironment) -> Self {
        if env.event_name.starts_with("pull_request") || !env.head_ref.is_empty() {
            ExecutionContext::PullRequest
        } else {
            ExecutionContext::MergeToMain
        }
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(self, ExecutionContext::PullRequest)
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::PullRequest => write!(f, "pull request"),
            ExecutionContext::MergeToMain => write!(f, "merge to main"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(event: &str, head: &str) -> CiEnvironment {
        CiEnvironment {
            event_name: event.to_string(),
            head_ref: head.to_string(),
        }
    }

    #[test]
    fn test_detect_pull_request_events() {
        assert_eq!(
            ExecutionContext::detect(&env("pull_request", "")),
            ExecutionContext::PullRequest
        );
        assert_eq!(
            ExecutionContext::detect(&env("pull_request_target", "")),
            ExecutionContext::PullRequest
        );
    }

    #[test]
    fn test_detect_head_ref_means_pull_request() {
        assert_eq!(
            ExecutionContext::detect(&env("workflow_dispatch", "feature/x")),
            ExecutionContext::PullRequest
        );
    }

    #[test]
    fn test_detect_push_is_merge() {
        assert_eq!(
            ExecutionContext::detect(&env("push", "")),
            ExecutionContext::MergeToMain
        );
        assert_eq!(
            ExecutionContext::detect(&CiEnvironment::default()),
            ExecutionContext::MergeToMain
        );
    }
}
