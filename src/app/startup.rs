use super::{CamdumpOrchestrator, ComponentState};
use crate::error::{CamdumpError, EventBusError, Result};
use crate::events::{EventFilter, EventMetrics, EventReceiver};
use std::sync::Arc;
use tracing::{error, info, warn};

impl CamdumpOrchestrator {
    /// Prepare the output directory. An unusable directory is fatal.
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing camdump");

        let output_dir = self.config.output_dir();
        tokio::fs::create_dir_all(&output_dir).await.map_err(|e| {
            error!("Cannot create output directory {}: {}", output_dir.display(), e);
            CamdumpError::system(format!(
                "invalid output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        let metadata = tokio::fs::metadata(&output_dir).await?;
        if metadata.permissions().readonly() {
            return Err(CamdumpError::system(format!(
                "output directory {} is read-only",
                output_dir.display()
            )));
        }

        self.set_component_state("metrics", ComponentState::Stopped);
        self.set_component_state("sync", ComponentState::Stopped);

        info!("Writing media to {}", output_dir.display());
        Ok(())
    }

    /// Spawn the metrics collector and the sync loop
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting camdump");

        self.set_component_state("metrics", ComponentState::Starting);
        let mut receiver = EventReceiver::new(
            self.event_bus.subscribe(),
            EventFilter::All,
            "metrics".to_string(),
        );
        let token = self.cancellation_token.clone();
        self.metrics_task = Some(tokio::spawn(async move {
            let mut metrics = EventMetrics::default();
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = receiver.recv() => match event {
                        Ok(event) => metrics.record_event(&event),
                        Err(EventBusError::ChannelClosed) => break,
                        Err(e) => warn!("Metrics collector: {}", e),
                    },
                }
            }
            for event in receiver.drain() {
                metrics.record_event(&event);
            }
            metrics
        }));
        self.set_component_state("metrics", ComponentState::Running);

        self.set_component_state("sync", ComponentState::Starting);
        let engine = Arc::clone(&self.engine);
        let token = self.sync_token.clone();
        self.sync_task = Some(tokio::spawn(async move {
            engine.run(token).await;
        }));
        self.set_component_state("sync", ComponentState::Running);

        info!("camdump started");
        Ok(())
    }
}
