use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use monitor_core::{
    update, Effect, JobHandle, JobRequest, JobStatus, JobStatusKind, JobSummary, MonitorState,
    MonitorViewModel, Msg, SubmitRejection,
};
use monitor_logging::{monitor_debug, monitor_error, monitor_info, monitor_trace, monitor_warn};
use tokio_util::sync::CancellationToken;

use crate::history::HistorySynchronizer;
use crate::poller::StatusPoller;
use crate::{JobStatusClient, LifecycleSink, MonitorError, StatusFetchError};

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub history_interval: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            history_interval: Duration::from_secs(5),
        }
    }
}

struct Session {
    state: MonitorState,
    poller: Option<StatusPoller>,
}

/// State shared between the controller, the poll loop and the history loop.
pub(crate) struct Shared {
    client: Arc<dyn JobStatusClient>,
    sink: Arc<dyn LifecycleSink>,
    settings: MonitorSettings,
    session: Mutex<Session>,
    /// Cancelled when the controller is dropped; parent of every background task.
    shutdown: CancellationToken,
}

impl Shared {
    pub(crate) fn client(&self) -> &dyn JobStatusClient {
        self.client.as_ref()
    }

    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                monitor_error!("Session lock poisoned; continuing with inner state");
                poisoned.into_inner()
            }
        }
    }

    /// Applies `msg` and runs the effects that must take place atomically
    /// with the transition (sink notifications, poller start/stop). The rest
    /// is returned to the caller.
    fn dispatch(self: &Arc<Self>, msg: Msg) -> Vec<Effect> {
        let mut session = self.lock();
        let state = std::mem::take(&mut session.state);
        let (state, effects) = update(state, msg);
        session.state = state;

        let mut deferred = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify(event) => {
                    if self.shutdown.is_cancelled() {
                        monitor_debug!("Controller shut down; dropping {:?}", event);
                    } else {
                        self.sink.emit(event);
                    }
                }
                Effect::StartPolling { generation, handle } => {
                    if let Some(previous) = session.poller.take() {
                        previous.stop();
                    }
                    monitor_info!(
                        "Polling job {} every {:?} (generation {})",
                        handle,
                        self.settings.poll_interval,
                        generation
                    );
                    session.poller = Some(StatusPoller::start(
                        Arc::clone(self),
                        generation,
                        handle,
                        self.settings.poll_interval,
                    ));
                }
                Effect::StopPolling { generation } => {
                    let matches = session
                        .poller
                        .as_ref()
                        .is_some_and(|poller| poller.generation() == generation);
                    if matches {
                        if let Some(poller) = session.poller.take() {
                            poller.stop();
                        }
                    }
                }
                other => deferred.push(other),
            }
        }
        deferred
    }

    fn run_deferred(self: &Arc<Self>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchHistory { seq } => {
                    let shared = Arc::clone(self);
                    tokio::spawn(async move {
                        tokio::select! {
                            biased;
                            _ = shared.shutdown.cancelled() => {}
                            _ = shared.fetch_history(seq) => {}
                        }
                    });
                }
                other => monitor_debug!("Ignoring effect outside its flow: {:?}", other),
            }
        }
    }

    /// Returns the handle to fetch if this tick may issue a request.
    pub(crate) fn poll_tick(self: &Arc<Self>, generation: u64) -> Option<JobHandle> {
        let mut handle = None;
        let mut rest = Vec::new();
        for effect in self.dispatch(Msg::PollTick { generation }) {
            match effect {
                Effect::FetchStatus { handle: target, .. } => handle = Some(target),
                other => rest.push(other),
            }
        }
        self.run_deferred(rest);
        if handle.is_none() {
            monitor_trace!(
                "Poll tick for generation {} skipped: request outstanding or cycle ended",
                generation
            );
        }
        handle
    }

    pub(crate) fn poll_finished(
        self: &Arc<Self>,
        generation: u64,
        handle: &JobHandle,
        result: Result<JobStatus, StatusFetchError>,
    ) {
        let msg = match result {
            Ok(status) => {
                match status.status {
                    JobStatusKind::Running => monitor_debug!(
                        "Job {} running, processed={} progress={:?}",
                        handle,
                        status.processed_count,
                        status.progress_text
                    ),
                    JobStatusKind::Completed => monitor_info!("Job {} completed", handle),
                    JobStatusKind::Error => monitor_warn!(
                        "Job {} finished with error: {}",
                        handle,
                        status.error.as_deref().unwrap_or("no message")
                    ),
                }
                Msg::StatusReceived { generation, status }
            }
            Err(err) => {
                monitor_warn!("Status poll for job {} failed, will retry: {}", handle, err);
                Msg::StatusFetchFailed {
                    generation,
                    reason: err.to_string(),
                }
            }
        };
        let deferred = self.dispatch(msg);
        self.run_deferred(deferred);
    }

    pub(crate) async fn refresh_history(self: &Arc<Self>) -> Vec<JobSummary> {
        let mut rest = Vec::new();
        for effect in self.dispatch(Msg::HistoryRefreshRequested) {
            match effect {
                Effect::FetchHistory { seq } => self.fetch_history(seq).await,
                other => rest.push(other),
            }
        }
        self.run_deferred(rest);
        self.history_snapshot()
    }

    async fn fetch_history(self: &Arc<Self>, seq: u64) {
        let msg = match self.client.fetch_history().await {
            Ok(jobs) => {
                monitor_debug!("History refresh #{} returned {} jobs", seq, jobs.len());
                Msg::HistoryReceived { seq, jobs }
            }
            Err(err) => {
                monitor_warn!("History refresh #{} failed, keeping previous list: {}", seq, err);
                Msg::HistoryFetchFailed {
                    seq,
                    reason: err.to_string(),
                }
            }
        };
        let deferred = self.dispatch(msg);
        self.run_deferred(deferred);
    }

    pub(crate) fn history_snapshot(&self) -> Vec<JobSummary> {
        self.lock().state.history().to_vec()
    }

    fn shutdown_poller(&self) {
        if let Some(poller) = self.lock().poller.take() {
            poller.stop();
        }
    }
}

/// Orchestrates one monitoring session: submission, status polling of the
/// active job and the history list.
///
/// Must be created inside a tokio runtime; the history loop starts right
/// away and runs until the controller is dropped.
pub struct JobLifecycleController {
    shared: Arc<Shared>,
    history: HistorySynchronizer,
}

impl JobLifecycleController {
    pub fn start(
        client: Arc<dyn JobStatusClient>,
        sink: Arc<dyn LifecycleSink>,
        settings: MonitorSettings,
    ) -> Self {
        let history_interval = settings.history_interval;
        let shared = Arc::new(Shared {
            client,
            sink,
            settings,
            session: Mutex::new(Session {
                state: MonitorState::new(),
                poller: None,
            }),
            shutdown: CancellationToken::new(),
        });
        let history = HistorySynchronizer::start(Arc::clone(&shared), history_interval);
        Self { shared, history }
    }

    /// Validates and submits `request`, then starts polling the new job.
    ///
    /// Any job still being polled is abandoned locally first; it keeps
    /// running on the service.
    pub async fn submit_job(&self, request: JobRequest) -> Result<JobHandle, MonitorError> {
        let mut outgoing = None;
        let mut rest = Vec::new();
        for effect in self.shared.dispatch(Msg::SubmitRequested(request)) {
            match effect {
                Effect::RejectSubmission(SubmitRejection::Invalid(err)) => {
                    monitor_warn!("Rejected job request: {}", err);
                    return Err(err.into());
                }
                Effect::RejectSubmission(SubmitRejection::Pending) => {
                    return Err(MonitorError::SubmissionPending);
                }
                Effect::SubmitJob(request) => outgoing = Some(request),
                other => rest.push(other),
            }
        }
        self.shared.run_deferred(rest);
        let Some(request) = outgoing else {
            return Err(MonitorError::SubmissionPending);
        };

        monitor_info!(
            "Submitting {} job keywords={:?} location={:?} max_pages={} headless={}",
            request.platform,
            request.keywords,
            request.location,
            request.max_pages,
            request.headless
        );
        let mut guard = PendingSubmission {
            shared: &self.shared,
            armed: true,
        };
        let result = self.shared.client.submit(&request).await;
        guard.armed = false;

        match result {
            Ok(handle) => {
                monitor_info!("Job {} accepted by the service", handle);
                let mut discarded = false;
                let mut rest = Vec::new();
                for effect in self.shared.dispatch(Msg::SubmitSucceeded(handle.clone())) {
                    match effect {
                        Effect::DiscardSubmission(_) => discarded = true,
                        other => rest.push(other),
                    }
                }
                self.shared.run_deferred(rest);
                if discarded {
                    monitor_info!("Job {} not monitored: stop requested during submission", handle);
                    return Err(MonitorError::StoppedBeforeStart(handle));
                }
                Ok(handle)
            }
            Err(err) => {
                monitor_warn!("{}", err);
                let deferred = self.shared.dispatch(Msg::SubmitFailed {
                    reason: err.to_string(),
                });
                self.shared.run_deferred(deferred);
                Err(err.into())
            }
        }
    }

    /// Stops polling the active job. Idempotent; answers that arrive later
    /// are discarded. A submission still waiting for the service is
    /// abandoned: its job is never polled and `submit_job` reports
    /// [`MonitorError::StoppedBeforeStart`].
    pub fn stop(&self) {
        let deferred = self.shared.dispatch(Msg::StopRequested);
        self.shared.run_deferred(deferred);
    }

    pub fn history(&self) -> &HistorySynchronizer {
        &self.history
    }

    pub fn view(&self) -> MonitorViewModel {
        self.shared.lock().state.view()
    }

    /// Download link of the active job once it completed.
    pub fn download_url(&self) -> Option<String> {
        let handle = self.shared.lock().state.view().download?;
        Some(self.shared.client.download_url(&handle))
    }
}

impl Drop for JobLifecycleController {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        self.shared.shutdown_poller();
    }
}

/// Releases the submission slot if the submit future is dropped mid-request.
struct PendingSubmission<'a> {
    shared: &'a Arc<Shared>,
    armed: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if self.armed {
            monitor_warn!("Submission abandoned before the service answered");
            let deferred = self.shared.dispatch(Msg::SubmitFailed {
                reason: "submission abandoned".to_string(),
            });
            self.shared.run_deferred(deferred);
        }
    }
}
