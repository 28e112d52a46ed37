use std::fmt;

use monitor_core::{JobHandle, ValidationError};
use thiserror::Error;

use crate::persist::PersistError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the JSON shape the endpoint promises.
    Decode,
    /// Submission answered without a job id.
    MissingJobId,
    /// Status endpoint does not know the job.
    UnknownJob,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::MissingJobId => write!(f, "missing job id"),
            FailureKind::UnknownJob => write!(f, "unknown job"),
        }
    }
}

/// A single failed round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job submission failed: {0}")]
pub struct SubmissionError(pub RequestError);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status fetch failed: {0}")]
pub struct StatusFetchError(pub RequestError);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("history fetch failed: {0}")]
pub struct HistoryFetchError(pub RequestError);

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download failed: {0}")]
    Request(RequestError),
    #[error("could not store result: {0}")]
    Persist(#[from] PersistError),
}

/// Errors surfaced to callers of [`crate::JobLifecycleController::submit_job`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("invalid job request: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error("a submission is already waiting for the service")]
    SubmissionPending,
    /// `stop()` was called before the service answered. The job it created
    /// keeps running remotely but is not monitored.
    #[error("monitoring of job {0} was stopped before it started")]
    StoppedBeforeStart(JobHandle),
}
