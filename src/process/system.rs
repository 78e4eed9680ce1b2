// file: src/process/system.rs
// description: production command runner backed by tokio::process
// reference: https://docs.rs/tokio/latest/tokio/process

use crate::error::{Result, SyncError};
use crate::process::runner::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Spawns real `git`/`ssh` processes. Stdin is closed and interactive
/// credential prompts are disabled so a misconfigured remote fails fast
/// instead of hanging on a hidden prompt.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!("spawning: {} {}", program, args.join(" "));

        let output = cmd.output().await.map_err(|e| SyncError::CommandSpawn {
            program: program.to_string(),
            source: e,
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
