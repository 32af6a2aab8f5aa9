//! SafeCommandExecutor: allowlisted command execution with captured output and timeouts
//!
//! # Security Features
//!
//! - **Allowlist validation**: Only approved executables can run, matched on file name
//! - **Injection prevention**: Uses `tokio::process::Command`, arguments never pass through a shell
//! - **Working directory validation**: Validates existence before execution
//! - **Timeout control**: Hanging processes are killed when the timeout expires
//!
//! # Example
//!
//! ```rust,no_run
//! use collection_publisher::SafeCommandExecutor;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), collection_publisher::CommandError> {
//! let mut executor = SafeCommandExecutor::new(std::env::temp_dir())?;
//! executor.set_timeout(Duration::from_secs(30));
//!
//! let output = executor.execute("ansible-galaxy", &["--version"]).await?;
//! println!("{}", output.stdout);
//! # Ok(())
//! # }
//! ```

use crate::core::traits::ToolOutput;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Executables allowed by default
const ALLOWED_COMMANDS: &[&str] = &["ansible-galaxy"];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed list
    #[error("Command '{0}' is not in the allowed list")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command exceeded the timeout duration
    #[error("Command timeout after {0:?}")]
    Timeout(Duration),
}

/// Safe command executor with security controls
#[derive(Debug)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
    /// Optional timeout for command execution
    timeout: Option<Duration>,
    /// Executable file names allowed to run
    allowed: Vec<String>,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            timeout: None,
            allowed: ALLOWED_COMMANDS.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Set command execution timeout.
    ///
    /// Commands exceeding this duration are killed.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Allow an additional executable file name
    pub fn allow_command(&mut self, name: &str) {
        if !self.allowed.iter().any(|a| a == name) {
            self.allowed.push(name.to_string());
        }
    }

    /// Check a command against the allowlist.
    ///
    /// Paths are accepted when their file name is allowed, so
    /// `/opt/venv/bin/ansible-galaxy` passes but `/bin/rm` does not.
    pub fn is_allowed(&self, command: &str) -> bool {
        Path::new(command)
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.allowed.iter().any(|a| a == name))
    }

    /// Execute a command and capture its output.
    ///
    /// A non-zero exit is not an error: it is reported through
    /// [`ToolOutput::success`] so callers can classify it.
    ///
    /// # Errors
    ///
    /// - `CommandError::CommandNotAllowed` - Command not in allowlist
    /// - `CommandError::ExecutionFailed` - Binary not found or execution error
    /// - `CommandError::Timeout` - Command ran longer than the configured timeout
    pub async fn execute<S: AsRef<OsStr>>(
        &self,
        command: &str,
        args: &[S],
    ) -> Result<ToolOutput, CommandError> {
        if !self.is_allowed(command) {
            return Err(CommandError::CommandNotAllowed(command.to_string()));
        }

        let child = Command::new(command)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command, e)))?;

        // Dropping the wait future on timeout drops the child, which kills it
        let waited = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| CommandError::Timeout(timeout))?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
