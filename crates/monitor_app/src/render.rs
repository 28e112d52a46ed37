//! Plain-text rendering of the monitor view and the job history.

use monitor_core::{JobHandle, JobStatusKind, JobSummary, MonitorViewModel};

const BAR_WIDTH: usize = 30;
const EMPTY_HISTORY: &str = "No jobs run yet.";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One-line progress display, e.g. `[#########.....]  26% running  Saved: ...`.
pub fn progress_line(view: &MonitorViewModel) -> String {
    let percent = view.percent.unwrap_or(0);
    let filled = BAR_WIDTH * usize::from(percent) / 100;
    let bar = if view.indeterminate {
        format!("{}{}", "~".repeat(filled), " ".repeat(BAR_WIDTH - filled))
    } else {
        format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
    };

    let mut line = format!("[{bar}] {percent:>3}% {}", view.status_label);
    if let Some(text) = view.progress_text.as_deref().filter(|text| !text.is_empty()) {
        line.push_str("  ");
        line.push_str(text);
    }
    if view.poll_failures > 0 {
        line.push_str(&format!("  (status unavailable x{})", view.poll_failures));
    }
    line
}

/// Rows for the history list, newest first as served.
pub fn history_lines(jobs: &[JobSummary], download_url: impl Fn(&JobHandle) -> String) -> Vec<String> {
    if jobs.is_empty() {
        return vec![EMPTY_HISTORY.to_string()];
    }
    jobs.iter()
        .map(|job| {
            let mut row = format!(
                "#{} {} \"{}\"",
                job.handle, job.platform, job.keywords
            );
            if let Some(location) = job.location.as_deref().filter(|l| !l.is_empty()) {
                row.push_str(&format!(" in {location}"));
            }
            // The service reports naive timestamps in its own local time.
            if let Some(started) = job.started_at {
                row.push_str(&format!(" | {}", started.format(TIME_FORMAT)));
            }
            row.push_str(" | ");
            row.push_str(&outcome_cell(job));
            if job.status == JobStatusKind::Completed {
                row.push_str(&format!(" | {}", download_url(&job.handle)));
            }
            row
        })
        .collect()
}

fn outcome_cell(job: &JobSummary) -> String {
    if let Some(count) = job.results_count {
        return format!("{count} items");
    }
    match (job.status, job.error.as_deref()) {
        (JobStatusKind::Error, Some(message)) => format!("error: {message}"),
        (status, _) => status.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use monitor_core::{Outcome, PollPhase};
    use pretty_assertions::assert_eq;

    fn job(id: &str, status: JobStatusKind) -> JobSummary {
        JobSummary {
            handle: JobHandle::new(id),
            platform: "linkedin".to_string(),
            keywords: "rust".to_string(),
            location: Some("berlin".to_string()),
            status,
            started_at: NaiveDate::from_ymd_opt(2024, 5, 1)
                .and_then(|date| date.and_hms_opt(9, 30, 0)),
            results_count: None,
            error: None,
        }
    }

    fn url(handle: &JobHandle) -> String {
        format!("http://localhost:5000/api/download/{handle}")
    }

    #[test]
    fn empty_history_has_a_placeholder() {
        assert_eq!(history_lines(&[], url), vec!["No jobs run yet.".to_string()]);
    }

    #[test]
    fn completed_rows_show_count_and_download() {
        let mut done = job("3", JobStatusKind::Completed);
        done.results_count = Some(40);
        let running = job("4", JobStatusKind::Running);

        let lines = history_lines(&[running, done], url);
        assert_eq!(
            lines,
            vec![
                "#4 linkedin \"rust\" in berlin | 2024-05-01 09:30:00 | running".to_string(),
                "#3 linkedin \"rust\" in berlin | 2024-05-01 09:30:00 | 40 items | http://localhost:5000/api/download/3".to_string(),
            ]
        );
    }

    #[test]
    fn errored_rows_carry_the_message() {
        let mut failed = job("5", JobStatusKind::Error);
        failed.location = None;
        failed.started_at = None;
        failed.error = Some("login wall".to_string());
        assert_eq!(
            history_lines(&[failed], url),
            vec!["#5 linkedin \"rust\" | error: login wall".to_string()]
        );
    }

    #[test]
    fn progress_line_reflects_the_view() {
        let view = MonitorViewModel {
            phase: PollPhase::Polling,
            status_label: "running".to_string(),
            progress_text: Some("Saved: Rust Engineer...".to_string()),
            percent: Some(50),
            ..MonitorViewModel::default()
        };
        let line = progress_line(&view);
        assert!(line.starts_with(&format!("[{}{}]", "#".repeat(15), ".".repeat(15))));
        assert!(line.ends_with(" 50% running  Saved: Rust Engineer..."));
    }

    #[test]
    fn completed_view_fills_the_bar() {
        let view = MonitorViewModel {
            phase: PollPhase::Terminal(Outcome::Completed),
            status_label: "completed".to_string(),
            percent: Some(100),
            poll_failures: 0,
            ..MonitorViewModel::default()
        };
        assert_eq!(
            progress_line(&view),
            format!("[{}] 100% completed", "#".repeat(30))
        );
    }
}
