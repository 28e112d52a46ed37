#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use monitor_core::{
    JobHandle, JobRequest, JobStatus, JobStatusKind, JobSummary, LifecycleEvent, Platform,
};
use monitor_engine::{
    FailureKind, HistoryFetchError, JobLifecycleController, JobStatusClient, LifecycleSink,
    MonitorSettings, RequestError, StatusFetchError, SubmissionError,
};

pub fn init_logging() {
    monitor_logging::initialize_for_tests();
}

pub fn request(max_pages: i64) -> JobRequest {
    JobRequest {
        platform: Platform::LinkedIn,
        keywords: "engineer".to_string(),
        location: "remote".to_string(),
        max_pages,
        headless: true,
    }
}

pub fn network_error() -> RequestError {
    RequestError {
        kind: FailureKind::Network,
        message: "connection reset".to_string(),
    }
}

pub fn summary(job_id: &str, status: JobStatusKind) -> JobSummary {
    JobSummary {
        handle: JobHandle::new(job_id),
        platform: "linkedin".to_string(),
        keywords: "engineer".to_string(),
        location: Some("remote".to_string()),
        status,
        started_at: None,
        results_count: None,
        error: None,
    }
}

/// In-memory service answering from per-endpoint scripts.
#[derive(Default)]
pub struct ScriptedClient {
    submits: Mutex<VecDeque<Result<JobHandle, SubmissionError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<JobStatus, StatusFetchError>>>>,
    histories: Mutex<VecDeque<Result<Vec<JobSummary>, HistoryFetchError>>>,
    submit_delay: Mutex<Duration>,
    status_delay: Mutex<Duration>,
    history_delay: Mutex<Duration>,
    status_requests: Mutex<Vec<String>>,
    pub submit_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_submit(&self, result: Result<JobHandle, SubmissionError>) {
        self.submits.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, job_id: &str, result: Result<JobStatus, StatusFetchError>) {
        self.statuses
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn push_history(&self, result: Result<Vec<JobSummary>, HistoryFetchError>) {
        self.histories.lock().unwrap().push_back(result);
    }

    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = delay;
    }

    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = delay;
    }

    pub fn set_history_delay(&self, delay: Duration) {
        *self.history_delay.lock().unwrap() = delay;
    }

    pub fn status_calls(&self) -> usize {
        self.status_requests.lock().unwrap().len()
    }

    pub fn status_calls_for(&self, job_id: &str) -> usize {
        self.status_requests
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == job_id)
            .count()
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobStatusClient for ScriptedClient {
    async fn submit(&self, _request: &JobRequest) -> Result<JobHandle, SubmissionError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.submit_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SubmissionError(network_error())))
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus, StatusFetchError> {
        self.status_requests
            .lock()
            .unwrap()
            .push(handle.job_id().to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let scripted = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(handle.job_id())
            .and_then(VecDeque::pop_front);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        scripted.unwrap_or_else(|| Ok(JobStatus::running("Working...", 0)))
    }

    async fn fetch_history(&self) -> Result<Vec<JobSummary>, HistoryFetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.history_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.histories
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn download_url(&self, handle: &JobHandle) -> String {
        format!("http://scraper.test/api/download/{}", handle.job_id())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events other than history updates, in order.
    pub fn job_events(&self) -> Vec<LifecycleEvent> {
        self.events()
            .into_iter()
            .filter(|event| !matches!(event, LifecycleEvent::HistoryUpdated(_)))
            .collect()
    }

    pub fn history_updates(&self) -> Vec<Vec<JobSummary>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::HistoryUpdated(jobs) => Some(jobs),
                _ => None,
            })
            .collect()
    }
}

impl LifecycleSink for RecordingSink {
    fn emit(&self, event: LifecycleEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Controller polling every second with a history cadence long enough that
/// only the initial and eager refreshes happen during a test.
pub fn controller(
    client: &Arc<ScriptedClient>,
    sink: &Arc<RecordingSink>,
) -> JobLifecycleController {
    JobLifecycleController::start(
        client.clone(),
        sink.clone(),
        MonitorSettings {
            poll_interval: Duration::from_secs(1),
            history_interval: Duration::from_secs(3600),
        },
    )
}

/// Lets paused time run forward so timers and spawned tasks make progress.
pub async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}
