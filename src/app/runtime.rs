use super::{CamdumpOrchestrator, ShutdownReason};
use crate::error::{CamdumpError, Result};
use crate::events::SyncEvent;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info};

impl CamdumpOrchestrator {
    /// Run until a signal or shutdown request arrives, then shut down
    pub async fn run(&mut self) -> Result<i32> {
        info!("camdump is running, press Ctrl+C to stop");

        let shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| CamdumpError::system("Shutdown receiver already taken"))?;

        self.setup_signal_handlers(Arc::clone(&self.shutdown_sender));

        let mut sync_ended = false;
        let shutdown_reason = match self.sync_task.as_mut() {
            Some(sync_task) => tokio::select! {
                reason = shutdown_receiver => reason.map_err(|_| {
                    CamdumpError::system("Shutdown channel closed unexpectedly")
                })?,
                joined = sync_task => {
                    sync_ended = true;
                    let message = match joined {
                        Ok(()) => "sync loop stopped unexpectedly".to_string(),
                        Err(e) => format!("sync loop failed: {}", e),
                    };
                    error!("{}", message);
                    ShutdownReason::Error(message)
                }
            },
            None => shutdown_receiver
                .await
                .map_err(|_| CamdumpError::system("Shutdown channel closed unexpectedly"))?,
        };
        if sync_ended {
            self.sync_task = None;
        }

        info!("Shutdown initiated: {}", shutdown_reason);
        self.event_bus.publish(SyncEvent::ShutdownRequested {
            reason: shutdown_reason.to_string(),
        });

        let mut exit_code = self.shutdown().await?;
        if matches!(shutdown_reason, ShutdownReason::Error(_)) {
            exit_code = exit_code.max(1);
        }

        info!("camdump shutdown complete");
        Ok(exit_code)
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(
        &self,
        shutdown_sender: Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>,
    ) {
        // SIGTERM (systemd stop), Unix only
        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };
                if let Some(()) = sigterm.recv().await {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        // SIGINT (Ctrl+C)
        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C), finishing the current item");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}
