use crate::api::ApiError;
use std::path::PathBuf;

/// Problems caught on the client before any request is built.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Policy file is required")]
    MissingPolicyArtifact,
    #[error("Provide either DB URI or dataset file")]
    MissingDataSource,
    #[error("Provide either DB URI or dataset file, not both")]
    ConflictingDataSources,
    #[error("Dataset file not found: {}", .0.display())]
    UnreadableDataset(PathBuf),
    #[error("Interval must be between 1 and 1440 minutes (got {0})")]
    IntervalOutOfRange(i64),
}

#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a scan is already being submitted")]
    InFlight,
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: ApiError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("violation {0} is not open in the current list")]
    NotResolvable(i64),
    #[error("violation {0} is already being resolved")]
    AlreadyInFlight(i64),
    #[error("failed to resolve violation {id}")]
    Transport {
        id: i64,
        #[source]
        source: ApiError,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("settings are still loading")]
    NotLoaded,
    #[error("a save is already in progress")]
    InFlight,
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// User-facing text for a failed mutation: backend detail when present.
pub fn failure_message(err: &ApiError, fallback: &str) -> String {
    err.detail()
        .map(|d| d.to_string())
        .unwrap_or_else(|| fallback.to_string())
}
