use crate::{
    Effect, JobStatusKind, LifecycleEvent, MonitorState, Msg, Outcome, SubmitRejection,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: MonitorState, msg: Msg) -> (MonitorState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(request) => {
            if state.is_submitting() {
                return (state, vec![Effect::RejectSubmission(SubmitRejection::Pending)]);
            }
            if let Err(err) = request.validate() {
                state.reject_submission(err.to_string());
                return (state, vec![Effect::RejectSubmission(SubmitRejection::Invalid(err))]);
            }

            // A new submission abandons the previous job locally; the remote
            // job keeps running.
            let mut effects = Vec::with_capacity(2);
            if let Some(generation) = state.abandon_active() {
                effects.push(Effect::StopPolling { generation });
            }
            state.begin_submission(request.clone());
            effects.push(Effect::SubmitJob(request));
            effects
        }
        Msg::SubmitSucceeded(handle) => {
            if state.discard_stopped_submission() {
                return (state, vec![Effect::DiscardSubmission(handle)]);
            }
            match state.accept_submission(handle.clone()) {
                Some(generation) => vec![
                    Effect::StartPolling {
                        generation,
                        handle: handle.clone(),
                    },
                    Effect::Notify(LifecycleEvent::MonitoringStarted(handle)),
                ],
                None => Vec::new(),
            }
        }
        Msg::SubmitFailed { reason } => {
            state.fail_submission(reason);
            Vec::new()
        }
        Msg::PollTick { generation } => match state.begin_poll(generation) {
            Some(handle) => vec![Effect::FetchStatus { generation, handle }],
            None => Vec::new(),
        },
        Msg::StatusReceived { generation, status } => match status.status {
            JobStatusKind::Running => match state.apply_running(generation, status.clone()) {
                Some(percent) => vec![Effect::Notify(LifecycleEvent::Progress {
                    status,
                    percent,
                })],
                None => Vec::new(),
            },
            JobStatusKind::Completed => {
                match state.apply_terminal(generation, Outcome::Completed, status) {
                    Some(handle) => vec![
                        Effect::StopPolling { generation },
                        Effect::Notify(LifecycleEvent::Completed(handle)),
                        Effect::FetchHistory {
                            seq: state.next_history_seq(),
                        },
                    ],
                    None => Vec::new(),
                }
            }
            JobStatusKind::Error => {
                let message = status.error.clone();
                match state.apply_terminal(generation, Outcome::Errored, status) {
                    Some(handle) => vec![
                        Effect::StopPolling { generation },
                        Effect::Notify(LifecycleEvent::Errored { handle, message }),
                        Effect::FetchHistory {
                            seq: state.next_history_seq(),
                        },
                    ],
                    None => Vec::new(),
                }
            }
        },
        Msg::StatusFetchFailed { generation, .. } => {
            // Transient: the job stays in `Polling` and the next tick retries.
            state.record_poll_failure(generation);
            Vec::new()
        }
        Msg::StopRequested => {
            // A submission still in flight is abandoned once the service answers.
            if state.stop_submission() {
                return (state, Vec::new());
            }
            // Terminal jobs stay on display; only a live poll cycle is torn down.
            if state.polling_generation().is_none() {
                return (state, Vec::new());
            }
            state
                .abandon_active()
                .map(|generation| Effect::StopPolling { generation })
                .into_iter()
                .collect()
        }
        Msg::HistoryRefreshRequested => vec![Effect::FetchHistory {
            seq: state.next_history_seq(),
        }],
        Msg::HistoryReceived { seq, jobs } => {
            if state.apply_history(seq, jobs.clone()) {
                vec![Effect::Notify(LifecycleEvent::HistoryUpdated(jobs))]
            } else {
                Vec::new()
            }
        }
        Msg::HistoryFetchFailed { seq, reason } => {
            state.record_history_failure(seq, reason);
            Vec::new()
        }
    };

    (state, effects)
}
