//! Typed git command layer
//!
//! One narrow seam for running git: the driver's state machine talks to a
//! `GitRunner`, so unit tests can substitute a scripted fake instead of a
//! real repository. The process implementation captures output and never
//! treats a non-zero exit as a Rust error; callers decide which steps are
//! fatal.

use std::path::{Path, PathBuf};
use std::process::Command;

use snapsync_core::{ErrorKind, Result, SnapError};

/// Captured result of one git invocation.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Whether the command exited zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Trimmed stdout, the usual thing a caller wants from rev-parse etc.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// stdout and stderr concatenated for diagnostics.
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }
}

/// Runs git subcommands with captured output.
pub trait GitRunner: Send + Sync {
    /// Run one git subcommand. `Err` only when git itself could not be
    /// executed; a failing command returns `Ok` with `success == false`.
    fn run(&self, args: &[&str]) -> Result<GitOutput>;
}

/// Real implementation shelling out to `git -C <repo>`.
pub struct ProcessRunner {
    repo: PathBuf,
}

impl ProcessRunner {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }
}

impl GitRunner for ProcessRunner {
    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        tracing::debug!(command = %format!("git {}", args.join(" ")), "Running git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .map_err(|e| {
                SnapError::new(ErrorKind::GitCommand)
                    .with_op("git")
                    .with_message(format!("failed to execute git: {}", e))
            })?;
        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
