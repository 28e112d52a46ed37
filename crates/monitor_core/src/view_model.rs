use crate::{JobHandle, JobSummary, PollPhase};

/// Everything a renderer needs to draw the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonitorViewModel {
    pub phase: PollPhase,
    pub active_job: Option<JobHandle>,
    /// `idle`, `starting`, `stopping`, `running`, `completed` or `error`.
    pub status_label: String,
    pub progress_text: Option<String>,
    /// Bar fill in `[0, 100]`; `None` when no job is shown.
    pub percent: Option<u8>,
    pub indeterminate: bool,
    pub submit_enabled: bool,
    /// Set once the active job completed; its result can be downloaded.
    pub download: Option<JobHandle>,
    pub history: Vec<JobSummary>,
    pub history_error: Option<String>,
    pub last_error: Option<String>,
    pub poll_failures: u32,
}
