use std::fmt;

/// Non-fatal conditions met while establishing a run's inputs.
/// These never change the decision but should be reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// No canonical tag is reachable from the reference; bootstrapping from 0.0.0
    NoReleaseTags { reference: String },
    /// The package's version file does not exist at the reference (new package)
    MissingMetadataFile {
        package: String,
        path: String,
        reference: String,
    },
    /// The registry could not be queried; dev numbers come from local tags only
    RegistryUnavailable { package: String, reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoReleaseTags { reference } => {
                write!(
                    f,
                    "No release tags reachable from '{}'; treating the release state as 0.0.0",
                    reference
                )
            }
            BoundaryWarning::MissingMetadataFile {
                package,
                path,
                reference,
            } => {
                write!(
                    f,
                    "[{}] {} does not exist at '{}'; treating it as a new package at 0.0.0",
                    package, path, reference
                )
            }
            BoundaryWarning::RegistryUnavailable { package, reason } => {
                write!(
                    f,
                    "[{}] Registry unavailable ({}); dev number computed from local tags only",
                    package, reason
                )
            }
        }
    }
}
