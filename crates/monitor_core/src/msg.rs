use crate::{JobHandle, JobRequest, JobStatus, JobSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User asked to start a new scraping job.
    SubmitRequested(JobRequest),
    /// The service accepted the job.
    SubmitSucceeded(JobHandle),
    /// The service rejected the job or could not be reached.
    SubmitFailed { reason: String },
    /// Status timer fired for a poll generation.
    PollTick { generation: u64 },
    /// Status endpoint answered.
    StatusReceived { generation: u64, status: JobStatus },
    /// Status request failed in transport or decoding.
    StatusFetchFailed { generation: u64, reason: String },
    /// Stop polling the active job.
    StopRequested,
    /// History timer fired or a caller asked for a refresh.
    HistoryRefreshRequested,
    /// History endpoint answered.
    HistoryReceived { seq: u64, jobs: Vec<JobSummary> },
    /// History request failed.
    HistoryFetchFailed { seq: u64, reason: String },
}
