// file: src/process/runner.rs
// description: capability interface for external command execution
// reference: https://docs.rs/async-trait

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }
}

/// Abstraction over spawning external commands so the synchronizer can be
/// exercised without real `git`/`ssh` binaries. `Err` means the process
/// could not be launched at all; a launched process that exits non-zero is
/// reported through [`CommandOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>)
        -> Result<CommandOutput>;
}
