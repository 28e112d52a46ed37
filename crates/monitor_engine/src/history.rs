use std::sync::Arc;
use std::time::Duration;

use monitor_core::JobSummary;
use monitor_logging::monitor_debug;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::controller::Shared;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Keeps the job list fresh on a fixed cadence, independent of any single
/// job. The first refresh happens immediately; the loop ends with the
/// controller that owns it.
pub struct HistorySynchronizer {
    shared: Arc<Shared>,
}

impl HistorySynchronizer {
    pub(crate) fn start(shared: Arc<Shared>, period: Duration) -> Self {
        let token = shared.shutdown_token().child_token();
        tokio::spawn(run(Arc::clone(&shared), token, period.max(MIN_INTERVAL)));
        Self { shared }
    }

    /// Fetches the list once and replaces the displayed one. On failure the
    /// previous list is kept and returned.
    pub async fn refresh_now(&self) -> Vec<JobSummary> {
        self.shared.refresh_history().await
    }

    /// Last list successfully received.
    pub fn latest(&self) -> Vec<JobSummary> {
        self.shared.history_snapshot()
    }
}

async fn run(shared: Arc<Shared>, token: CancellationToken, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = shared.refresh_history() => {}
        }
    }

    monitor_debug!("History refresh loop exited");
}
