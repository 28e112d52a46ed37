//! Monitor core: pure job-lifecycle state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod progress;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, LifecycleEvent, SubmitRejection};
pub use job::{
    JobHandle, JobRequest, JobStatus, JobStatusKind, JobSummary, Platform, ValidationError,
};
pub use msg::Msg;
pub use progress::{
    estimate, Progress, COMPLETE_FILL, INDETERMINATE_FILL, ITEMS_PER_PAGE_ESTIMATE,
    PROGRESS_CEILING,
};
pub use state::{MonitorState, Outcome, PollPhase};
pub use update::update;
pub use view_model::MonitorViewModel;
