//! Running `Match exec` commands through the system shell
// (c) 2024 Ross Younger

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::config::CommandRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs commands with `sh -c`, discarding their output.
///
/// Success means the command exited with status zero.
/// If a timeout is set and the command overruns it, the command is killed and the run is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    /// A runner that waits as long as it takes
    pub const DEFAULT: ShellRunner = ShellRunner { timeout: None };

    /// A runner that gives up on commands that take longer than `timeout`
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command_line: &str) -> anyhow::Result<bool> {
        let start = Instant::now();
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn `{command_line}`"))?;

        let status = match self.timeout {
            None => child
                .wait()
                .with_context(|| format!("waiting for `{command_line}`"))?,
            Some(timeout) => loop {
                if let Some(status) = child
                    .try_wait()
                    .with_context(|| format!("waiting for `{command_line}`"))?
                {
                    break status;
                }
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    anyhow::bail!(
                        "`{command_line}` exceeded timeout of {:.1}s",
                        timeout.as_secs_f64()
                    );
                }
                std::thread::sleep(POLL_INTERVAL);
            },
        };
        tracing::debug!(
            "`{command_line}` completed in {:.1}s with exit code {:?}",
            start.elapsed().as_secs_f64(),
            status.code()
        );
        Ok(status.success())
    }
}
