use std::sync::Arc;
use std::time::Duration;

use monitor_core::JobHandle;
use monitor_logging::{monitor_debug, monitor_info};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::controller::Shared;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Timer driving status requests for one poll generation.
///
/// Requests are issued strictly one after another: the next tick is only
/// awaited once the previous answer has been applied, and ticks missed while
/// waiting are delayed rather than fired in a burst.
#[derive(Debug)]
pub struct StatusPoller {
    generation: u64,
    handle: JobHandle,
    token: CancellationToken,
}

impl StatusPoller {
    pub(crate) fn start(
        shared: Arc<Shared>,
        generation: u64,
        handle: JobHandle,
        period: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let period = period.max(MIN_INTERVAL);
        tokio::spawn(run(shared, generation, token.clone(), period));
        Self {
            generation,
            handle,
            token,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancels future ticks and abandons an outstanding request. Idempotent.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            monitor_info!(
                "Stopping status poll for job {} (generation {})",
                self.handle,
                self.generation
            );
            self.token.cancel();
        }
    }
}

async fn run(shared: Arc<Shared>, generation: u64, token: CancellationToken, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(handle) = shared.poll_tick(generation) else {
            continue;
        };

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = shared.client().fetch_status(&handle) => result,
        };
        shared.poll_finished(generation, &handle, result);
    }

    monitor_debug!("Status poll loop for generation {} exited", generation);
}
