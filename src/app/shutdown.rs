use super::{CamdumpOrchestrator, ComponentState};
use crate::error::Result;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

const METRICS_STOP_TIMEOUT: Duration = Duration::from_secs(2);

impl CamdumpOrchestrator {
    /// Stop the sync loop after its in-flight item, then the metrics collector
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");
        let mut exit_code = 0;

        // Unbounded wait; the loop only stops between items.
        self.set_component_state("sync", ComponentState::Stopping);
        self.sync_token.cancel();
        if let Some(sync_task) = self.sync_task.take() {
            match sync_task.await {
                Ok(()) => self.set_component_state("sync", ComponentState::Stopped),
                Err(e) => {
                    error!("Sync loop ended abnormally: {}", e);
                    self.set_component_state("sync", ComponentState::Failed);
                    exit_code = 1;
                }
            }
        } else {
            self.set_component_state("sync", ComponentState::Stopped);
        }

        self.set_component_state("metrics", ComponentState::Stopping);
        self.cancellation_token.cancel();
        if let Some(metrics_task) = self.metrics_task.take() {
            match timeout(METRICS_STOP_TIMEOUT, metrics_task).await {
                Ok(Ok(metrics)) => {
                    info!(
                        "Session summary: {} item(s) fetched, {} deleted, {} byte(s), {} failure(s)",
                        metrics.count("media_fetched"),
                        metrics.count("media_deleted"),
                        metrics.bytes_fetched,
                        metrics.failures
                    );
                    self.final_metrics = Some(metrics);
                    self.set_component_state("metrics", ComponentState::Stopped);
                }
                Ok(Err(e)) => {
                    warn!("Metrics collector failed: {}", e);
                    self.set_component_state("metrics", ComponentState::Failed);
                }
                Err(_) => {
                    warn!("Metrics collector stop timeout");
                    self.set_component_state("metrics", ComponentState::Failed);
                }
            }
        } else {
            self.set_component_state("metrics", ComponentState::Stopped);
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }
}
