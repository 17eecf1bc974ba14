//! Startup pass followed by a cancellable periodic refresh task

use crate::engine::PriceEngine;
use crate::error::{PriceError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Time between periodic refreshes
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Drives a [`PriceEngine`]: one startup pass, then a refresh every interval
pub struct Scheduler {
    engine: Arc<PriceEngine>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(engine: Arc<PriceEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Run the startup pass, then spawn the periodic task unless fetching is
    /// disabled.
    ///
    /// An error means startup failed and the engine should stay off for the
    /// rest of the process.
    pub async fn start(self) -> Result<Option<SchedulerHandle>> {
        let report = self.engine.startup().await?;
        log::info!(
            "Startup price update done: {} prices from {}",
            report.summary.updated,
            report.source
        );

        if self.engine.config().await.disable_price_fetching {
            log::info!("Price fetching is disabled, no periodic refresh");
            return Ok(None);
        }

        Ok(Some(self.spawn()))
    }

    /// Spawn the periodic task without a startup pass
    pub fn spawn(self) -> SchedulerHandle {
        let cancel = CancellationToken::new();
        log::info!(
            "Refreshing prices every {} minute(s)",
            self.interval.as_secs() / 60
        );
        let join = tokio::spawn(run_periodic(self.engine, self.interval, cancel.clone()));
        SchedulerHandle { cancel, join }
    }
}

async fn run_periodic(engine: Arc<PriceEngine>, interval: Duration, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(interval) => {}
        }

        log::info!("Scheduled price refresh triggered");
        match engine.refresh().await {
            Ok(report) => log::info!(
                "Scheduled refresh done: {} prices from {}",
                report.summary.updated,
                report.source
            ),
            Err(PriceError::PassInProgress) => {
                log::warn!("Skipping scheduled refresh, another update is still running")
            }
            Err(e) => log::error!("Scheduled price refresh failed: {}", e),
        }
    }

    log::info!("Price refresh task stopped");
}

/// Handle to the periodic task
pub struct SchedulerHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Token that stops the task when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Stop the task and wait for it. A refresh in flight completes first.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            log::error!("Price refresh task ended abnormally: {}", e);
        }
    }
}
