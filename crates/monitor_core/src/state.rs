use crate::progress::{estimate, Progress};
use crate::view_model::MonitorViewModel;
use crate::{JobHandle, JobRequest, JobStatus, JobSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Polling,
    Terminal(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveJob {
    handle: JobHandle,
    generation: u64,
    max_pages: i64,
    phase: PollPhase,
    in_flight: bool,
    consecutive_failures: u32,
}

/// Session state of the monitor: at most one active job plus the last known
/// history list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonitorState {
    next_generation: u64,
    pending_submission: Option<JobRequest>,
    /// `stop()` arrived while the submission was still waiting for the service.
    submission_stopped: bool,
    active: Option<ActiveJob>,
    last_status: Option<JobStatus>,
    progress: Option<Progress>,
    last_error: Option<String>,
    history: Vec<JobSummary>,
    next_history_seq: u64,
    applied_history_seq: u64,
    history_error: Option<String>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PollPhase {
        self.active
            .as_ref()
            .map(|job| job.phase)
            .unwrap_or(PollPhase::Idle)
    }

    pub fn active_handle(&self) -> Option<&JobHandle> {
        self.active.as_ref().map(|job| &job.handle)
    }

    /// Generation of the poll cycle currently allowed to report, if any.
    pub fn polling_generation(&self) -> Option<u64> {
        self.active
            .as_ref()
            .filter(|job| job.phase == PollPhase::Polling)
            .map(|job| job.generation)
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submission.is_some()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.is_submitting() && self.phase() != PollPhase::Polling
    }

    pub fn history(&self) -> &[JobSummary] {
        &self.history
    }

    pub fn view(&self) -> MonitorViewModel {
        let phase = self.phase();
        let status_label = if self.submission_stopped {
            "stopping"
        } else if self.is_submitting() {
            "starting"
        } else {
            match phase {
                PollPhase::Idle => "idle",
                PollPhase::Polling => self
                    .last_status
                    .as_ref()
                    .map(|status| status.status.as_str())
                    .unwrap_or("running"),
                PollPhase::Terminal(Outcome::Completed) => "completed",
                PollPhase::Terminal(Outcome::Errored) => "error",
            }
        };
        let download = match phase {
            PollPhase::Terminal(Outcome::Completed) => self.active_handle().cloned(),
            _ => None,
        };

        MonitorViewModel {
            phase,
            active_job: self.active_handle().cloned(),
            status_label: status_label.to_string(),
            progress_text: self
                .last_status
                .as_ref()
                .map(|status| status.progress_text.clone()),
            percent: self.progress.map(Progress::fill),
            indeterminate: self.progress.is_some_and(Progress::is_indeterminate),
            submit_enabled: self.submit_enabled(),
            download,
            history: self.history.clone(),
            history_error: self.history_error.clone(),
            last_error: self.last_error.clone(),
            poll_failures: self
                .active
                .as_ref()
                .map(|job| job.consecutive_failures)
                .unwrap_or(0),
        }
    }

    /// Abandons the active poll cycle, returning its generation if it was polling.
    pub(crate) fn abandon_active(&mut self) -> Option<u64> {
        let generation = self.polling_generation();
        self.active = None;
        self.last_status = None;
        self.progress = None;
        generation
    }

    pub(crate) fn begin_submission(&mut self, request: JobRequest) {
        self.pending_submission = Some(request);
        self.submission_stopped = false;
        self.last_error = None;
    }

    /// Marks the pending submission as stopped; returns false if none is pending.
    pub(crate) fn stop_submission(&mut self) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.submission_stopped = true;
        true
    }

    /// Releases a submission that was stopped while pending. The handle the
    /// service returned for it is never polled.
    pub(crate) fn discard_stopped_submission(&mut self) -> bool {
        if !self.submission_stopped {
            return false;
        }
        self.pending_submission = None;
        self.submission_stopped = false;
        true
    }

    pub(crate) fn reject_submission(&mut self, reason: String) {
        self.last_error = Some(reason);
    }

    /// Turns the pending submission into the active job and returns its new
    /// poll generation.
    pub(crate) fn accept_submission(&mut self, handle: JobHandle) -> Option<u64> {
        let request = self.pending_submission.take()?;
        self.next_generation += 1;
        let generation = self.next_generation;
        self.active = Some(ActiveJob {
            handle,
            generation,
            max_pages: request.max_pages,
            phase: PollPhase::Polling,
            in_flight: false,
            consecutive_failures: 0,
        });
        self.last_status = None;
        self.progress = Some(Progress::Indeterminate);
        Some(generation)
    }

    pub(crate) fn fail_submission(&mut self, reason: String) {
        self.pending_submission = None;
        self.submission_stopped = false;
        self.last_error = Some(reason);
    }

    /// Marks a status request in flight unless one already is.
    pub(crate) fn begin_poll(&mut self, generation: u64) -> Option<JobHandle> {
        let job = self.polling_job_mut(generation)?;
        if job.in_flight {
            return None;
        }
        job.in_flight = true;
        Some(job.handle.clone())
    }

    /// Applies a `running` status; returns the displayed fill.
    pub(crate) fn apply_running(&mut self, generation: u64, status: JobStatus) -> Option<u8> {
        let job = self.polling_job_mut(generation)?;
        job.in_flight = false;
        job.consecutive_failures = 0;
        let progress = estimate(status.processed_count, job.max_pages);
        self.progress = Some(progress);
        self.last_status = Some(status);
        Some(progress.fill())
    }

    /// Applies a terminal status; returns the handle of the finished job.
    pub(crate) fn apply_terminal(
        &mut self,
        generation: u64,
        outcome: Outcome,
        status: JobStatus,
    ) -> Option<JobHandle> {
        let job = self.polling_job_mut(generation)?;
        job.in_flight = false;
        job.consecutive_failures = 0;
        job.phase = PollPhase::Terminal(outcome);
        let handle = job.handle.clone();
        match outcome {
            Outcome::Completed => self.progress = Some(Progress::complete()),
            Outcome::Errored => self.last_error = status.error.clone(),
        }
        self.last_status = Some(status);
        Some(handle)
    }

    /// Records a transient status failure; returns the consecutive count.
    pub(crate) fn record_poll_failure(&mut self, generation: u64) -> Option<u32> {
        let job = self.polling_job_mut(generation)?;
        job.in_flight = false;
        job.consecutive_failures += 1;
        let failures = job.consecutive_failures;
        Some(failures)
    }

    pub(crate) fn next_history_seq(&mut self) -> u64 {
        self.next_history_seq += 1;
        self.next_history_seq
    }

    /// Replaces the history unless a newer response was already applied.
    pub(crate) fn apply_history(&mut self, seq: u64, jobs: Vec<JobSummary>) -> bool {
        if seq <= self.applied_history_seq {
            return false;
        }
        self.applied_history_seq = seq;
        self.history = jobs;
        self.history_error = None;
        true
    }

    pub(crate) fn record_history_failure(&mut self, seq: u64, reason: String) {
        if seq <= self.applied_history_seq {
            return;
        }
        self.history_error = Some(reason);
    }

    fn polling_job_mut(&mut self, generation: u64) -> Option<&mut ActiveJob> {
        self.active
            .as_mut()
            .filter(|job| job.generation == generation && job.phase == PollPhase::Polling)
    }
}
