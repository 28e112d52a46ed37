use monitor_core::{
    update, Effect, JobHandle, JobRequest, JobStatus, LifecycleEvent, MonitorState, Msg, Outcome,
    Platform, PollPhase,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    monitor_logging::initialize_for_tests();
}

/// Drives the state to `Polling` for job `abc` with three pages.
fn polling_state() -> MonitorState {
    let request = JobRequest {
        platform: Platform::LinkedIn,
        keywords: "engineer".to_string(),
        location: "remote".to_string(),
        max_pages: 3,
        headless: true,
    };
    let (state, _) = update(MonitorState::new(), Msg::SubmitRequested(request));
    let (state, _) = update(state, Msg::SubmitSucceeded(JobHandle::new("abc")));
    state
}

fn tick(state: MonitorState) -> (MonitorState, Vec<Effect>) {
    update(state, Msg::PollTick { generation: 1 })
}

#[test]
fn tick_issues_one_fetch_and_blocks_overlap() {
    init_logging();
    let (state, effects) = tick(polling_state());
    assert_eq!(
        effects,
        vec![Effect::FetchStatus {
            generation: 1,
            handle: JobHandle::new("abc"),
        }]
    );

    // Request still outstanding: further ticks are swallowed.
    let (state, effects) = tick(state);
    assert!(effects.is_empty());
    let (state, effects) = tick(state);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::running("Loading job list...", 0),
        },
    );
    let (_state, effects) = tick(state);
    assert_eq!(effects.len(), 1);
}

#[test]
fn running_status_updates_progress() {
    init_logging();
    let (state, _) = tick(polling_state());
    let status = JobStatus::running("Saved: Senior Engineer...", 20);
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: status.clone(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify(LifecycleEvent::Progress {
            status,
            percent: 26,
        })]
    );
    let view = state.view();
    assert_eq!(view.percent, Some(26));
    assert!(!view.indeterminate);
    assert_eq!(view.status_label, "running");
    assert_eq!(
        view.progress_text.as_deref(),
        Some("Saved: Senior Engineer...")
    );
}

#[test]
fn running_without_items_stays_indeterminate() {
    init_logging();
    let (state, _) = tick(polling_state());
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::running("Launching browser...", 0),
        },
    );
    let view = state.view();
    assert_eq!(view.percent, Some(10));
    assert!(view.indeterminate);
}

#[test]
fn completed_status_stops_polling_and_refreshes_history_once() {
    init_logging();
    let (state, _) = tick(polling_state());
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::completed("Completed successfully.", 60),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::StopPolling { generation: 1 },
            Effect::Notify(LifecycleEvent::Completed(JobHandle::new("abc"))),
            Effect::FetchHistory { seq: 1 },
        ]
    );
    let view = state.view();
    assert_eq!(view.phase, PollPhase::Terminal(Outcome::Completed));
    assert_eq!(view.percent, Some(100));
    assert_eq!(view.download, Some(JobHandle::new("abc")));
    assert!(view.submit_enabled);

    // A duplicate answer after the transition changes nothing.
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::completed("Completed successfully.", 60),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().percent, Some(100));
}

#[test]
fn error_status_is_terminal_with_message() {
    init_logging();
    let (state, _) = tick(polling_state());
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::errored("Script timed out."),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::StopPolling { generation: 1 },
            Effect::Notify(LifecycleEvent::Errored {
                handle: JobHandle::new("abc"),
                message: Some("Script timed out.".to_string()),
            }),
            Effect::FetchHistory { seq: 1 },
        ]
    );
    let view = state.view();
    assert_eq!(view.phase, PollPhase::Terminal(Outcome::Errored));
    assert_eq!(view.status_label, "error");
    assert_eq!(view.download, None);
    assert_eq!(view.last_error.as_deref(), Some("Script timed out."));
}

#[test]
fn fetch_failure_keeps_polling_and_allows_next_tick() {
    init_logging();
    let (state, _) = tick(polling_state());
    let (state, effects) = update(
        state,
        Msg::StatusFetchFailed {
            generation: 1,
            reason: "network error".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), PollPhase::Polling);
    assert_eq!(state.view().poll_failures, 1);

    let (state, effects) = tick(state);
    assert_eq!(effects.len(), 1);

    let (state, _) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::running("Loading job list...", 5),
        },
    );
    assert_eq!(state.view().poll_failures, 0);
}

#[test]
fn stop_is_idempotent_and_discards_late_answers() {
    init_logging();
    let (state, _) = tick(polling_state());
    let (state, effects) = update(state, Msg::StopRequested);
    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    assert_eq!(state.phase(), PollPhase::Idle);
    assert!(state.view().submit_enabled);

    let (state, effects) = update(state, Msg::StopRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::completed("Completed successfully.", 10),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().percent, None);
}

#[test]
fn answers_for_an_old_generation_are_ignored() {
    init_logging();
    let (state, _) = tick(polling_state());
    let (state, _) = update(
        state,
        Msg::SubmitRequested(JobRequest {
            platform: Platform::RubyOnRemote,
            keywords: "rust".to_string(),
            location: "anywhere".to_string(),
            max_pages: 1,
            headless: true,
        }),
    );
    let (state, _) = update(state, Msg::SubmitSucceeded(JobHandle::new("def")));

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            generation: 1,
            status: JobStatus::completed("Completed successfully.", 10),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), PollPhase::Polling);
    assert_eq!(state.active_handle(), Some(&JobHandle::new("def")));
}
