//! Monitor engine: talks to the scraping service and drives the core state
//! machine from timers and responses.
mod client;
mod controller;
mod filename;
mod history;
mod persist;
mod poller;
mod sink;
mod types;
mod wire;

pub use client::{ClientSettings, DownloadedFile, JobStatusClient, ReqwestJobClient};
pub use controller::{JobLifecycleController, MonitorSettings};
pub use filename::result_filename;
pub use history::HistorySynchronizer;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::StatusPoller;
pub use sink::{ChannelLifecycleSink, LifecycleSink};
pub use types::{
    DownloadError, FailureKind, HistoryFetchError, MonitorError, RequestError, StatusFetchError,
    SubmissionError,
};
