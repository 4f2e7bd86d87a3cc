//! Subprocess execution against the automation backend
//!
//! All backend commands run through the [`CommandRunner`] trait so the
//! bridge logic can be exercised against a mock runner in tests. The real
//! implementation, [`ShellRunner`], executes the configured backend binary
//! relative to a single fixed working directory. There is no implicit
//! retry: a failed command aborts the calling operation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::{BridgeError, BridgeResult};
use crate::protocol::BackendCommand;

/// Captured result of one backend command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Execution abstraction over the automation backend.
#[mockall::automock]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command, blocking the calling task until it exits.
    ///
    /// Captures stdout, stderr, and the exit code; the exit code is not
    /// interpreted.
    async fn run(&self, command: &BackendCommand) -> BridgeResult<CommandOutput>;

    /// Run a command and fail on non-zero exit.
    ///
    /// On failure the captured stdout is emitted line by line at info
    /// level and stderr at error level before the error is returned.
    async fn run_checked(&self, command: &BackendCommand) -> BridgeResult<CommandOutput>;

    /// Run a command, forwarding output incrementally as it is produced.
    ///
    /// Used for long-running remote commands whose progress callers want
    /// to observe live. The exit code is not interpreted.
    async fn run_streaming(&self, command: &BackendCommand) -> BridgeResult<CommandOutput>;
}

/// Production runner that shells out to the backend executable.
pub struct ShellRunner {
    backend_program: String,
    working_dir: PathBuf,
}

impl ShellRunner {
    pub fn new(backend_program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend_program: backend_program.into(),
            working_dir: working_dir.into(),
        }
    }

    fn command_for(&self, command: &BackendCommand) -> Command {
        let mut cmd = Command::new(&self.backend_program);
        cmd.args(command.subcommand_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null());
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        debug!("Executing: {} {}", self.backend_program, command);
        let output = self.command_for(command).output().await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_checked(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        let output = self.run(command).await?;

        if !output.success() {
            for line in output.stdout.lines() {
                info!("out> {line}");
            }
            for line in output.stderr.lines() {
                error!("err> {line}");
            }
            return Err(BridgeError::CommandFailed {
                command: command.to_string(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }

    async fn run_streaming(&self, command: &BackendCommand) -> BridgeResult<CommandOutput> {
        debug!("Executing (streaming): {} {}", self.backend_program, command);

        let mut child = self
            .command_for(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        let out_task = tokio::spawn(async move {
            let mut collected = String::new();
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!("out> {line}");
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });
        let err_task = tokio::spawn(async move {
            let mut collected = String::new();
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                error!("err> {line}");
                collected.push_str(&line);
                collected.push('\n');
            }
            collected
        });

        let status = child.wait().await?;
        let stdout = out_task.await.unwrap_or_default();
        let stderr = err_task.await.unwrap_or_default();

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_success_is_exit_zero() {
        let ok = CommandOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        };
        let failed = CommandOutput {
            exit_code: 2,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());
        assert!(!failed.success());
    }

    #[tokio::test]
    async fn shell_runner_captures_exit_code() {
        // `true` ignores the rendered subcommand args and exits 0.
        let runner = ShellRunner::new("true", ".");
        let output = runner.run(&BackendCommand::ListClusters).await.unwrap();
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn run_checked_fails_on_nonzero_exit() {
        let runner = ShellRunner::new("false", ".");
        let err = runner
            .run_checked(&BackendCommand::ListClusters)
            .await
            .unwrap_err();
        match err {
            BridgeError::CommandFailed { exit_code, .. } => assert_ne!(exit_code, 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_backend_binary_is_an_io_error() {
        let runner = ShellRunner::new("definitely-not-a-real-backend-tool", ".");
        let err = runner.run(&BackendCommand::ListClusters).await.unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
