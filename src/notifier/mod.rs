//! Completion command run when a camera session finishes.

mod executor;
mod template;
#[cfg(test)]
mod tests;

pub use executor::{CommandExecutor, CommandOutcome, ShellExecutor};
pub use template::{render_command, substitute, UNKNOWN_TOTAL};

use crate::events::{EventBus, SyncEvent};
use std::sync::Arc;
use tracing::{debug, info};

pub struct CompletionNotifier {
    template: Option<String>,
    executor: Arc<dyn CommandExecutor>,
    event_bus: EventBus,
}

impl CompletionNotifier {
    pub fn new(
        template: Option<String>,
        executor: Arc<dyn CommandExecutor>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            template: template.filter(|t| !t.trim().is_empty()),
            executor,
            event_bus,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.template.is_some()
    }

    /// Run the configured command for a finished session. Failures are
    /// published and logged, never returned.
    pub async fn notify(&self, camera: &str, fetched: u32, total: Option<u32>) {
        let Some(template) = &self.template else {
            debug!("No completion command configured for {}", camera);
            return;
        };

        let command = render_command(template, camera, fetched, total);
        info!("Running completion command for {}: {}", camera, command);

        let error = match self.executor.execute(&command).await {
            Ok(outcome) if outcome.success() => return,
            Ok(outcome) => match outcome.code {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            },
            Err(e) => e,
        };
        self.event_bus.publish(SyncEvent::CommandFailed {
            camera: camera.to_string(),
            error,
        });
    }
}
