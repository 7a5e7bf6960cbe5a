use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Exit status of a completed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs completion commands
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, String>;
}

/// Runs commands through `sh -c`, killing them after `timeout`
pub struct ShellExecutor {
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> Result<CommandOutcome, String> {
        debug!("Running: sh -c {:?}", command);
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| format!("failed to start shell: {}", e))?;

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => Ok(CommandOutcome {
                code: status.code(),
            }),
            Ok(Err(e)) => Err(format!("failed waiting for command: {}", e)),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill timed out command: {}", e);
                }
                Err(format!("timed out after {}s", self.timeout.as_secs()))
            }
        }
    }
}
