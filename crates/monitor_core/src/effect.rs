use crate::{JobHandle, JobRequest, JobStatus, JobSummary, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the request to the remote service.
    SubmitJob(JobRequest),
    /// The submission was refused before any request was made.
    RejectSubmission(SubmitRejection),
    /// The service accepted a submission that was stopped while pending;
    /// its job is left running remotely and is not polled.
    DiscardSubmission(JobHandle),
    /// Begin ticking the status timer for this poll generation.
    StartPolling { generation: u64, handle: JobHandle },
    /// Cancel the timer and any outstanding request of this generation.
    StopPolling { generation: u64 },
    /// Issue exactly one status request.
    FetchStatus { generation: u64, handle: JobHandle },
    /// Issue one history request tagged with `seq`.
    FetchHistory { seq: u64 },
    /// Forward a lifecycle event to the rendering sink.
    Notify(LifecycleEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    Invalid(ValidationError),
    /// Another submission is still waiting for the service to answer.
    Pending,
}

/// Output contract of the controller towards whatever renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    MonitoringStarted(JobHandle),
    Progress { status: JobStatus, percent: u8 },
    Completed(JobHandle),
    Errored {
        handle: JobHandle,
        message: Option<String>,
    },
    HistoryUpdated(Vec<JobSummary>),
}
