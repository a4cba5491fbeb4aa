//! Sync driver state machine
//!
//! Per run:
//! 1. verify the working directory is a git checkout (fatal if not)
//! 2. ensure the configured branch (skipped while a rebase/merge is in
//!    progress, to avoid corrupting that state)
//! 3. ensure the merge=ours declaration for the snapshot glob exists
//! 4. force-add the snapshot paths (bypassing ignore rules)
//! 5. commit with a timestamped message (optionally --allow-empty, so a
//!    no-change run still advances history as a heartbeat)
//! 6. push, creating the upstream tracking relationship on first push
//! 7. on rejection: stash -> pull --rebase -> resolve snapshot conflicts
//!    as ours -> re-push -> stash pop
//! 8. compare local HEAD against the remote tip for operator visibility
//!
//! Non-fatal step failures become notes on the returned report instead of
//! aborting; the dominant design goal is that a sync hiccup never blocks
//! snapshot generation.

use std::fs;
use std::path::PathBuf;

use snapsync_core::document::now_iso;
use snapsync_core::job::SNAPSHOT_GLOB;
use snapsync_core::{ErrorKind, Result, SnapError};

use crate::command::GitRunner;

/// Driver settings for one run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Target branch; created/reset if the checkout is elsewhere
    pub branch: String,
    /// Commit even when nothing changed
    pub allow_empty: bool,
    /// Treat a failed final push as fatal instead of degraded
    pub strict_push: bool,
    /// Extra paths committed alongside the snapshots (the original system
    /// committed its own script source as a heartbeat)
    pub extra_paths: Vec<String>,
}

impl SyncOptions {
    pub fn for_branch(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            allow_empty: true,
            strict_push: false,
            extra_paths: Vec::new(),
        }
    }
}

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Commit reached the remote
    Synced,
    /// Run completed but the remote was not updated (absorbed failures)
    Degraded,
    /// Sync was not attempted (gated off by configuration)
    Skipped,
}

/// Structured result of a sync run, replacing the original's silent
/// error swallowing: callers and tests can assert on what happened.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// Local HEAD commit hash, truncated to 7 chars
    pub local_head: Option<String>,
    /// Remote branch tip hash, truncated to 7 chars
    pub remote_head: Option<String>,
    /// Absorbed non-fatal failures, in step order
    pub notes: Vec<String>,
}

impl SyncReport {
    pub fn skipped() -> Self {
        Self {
            outcome: SyncOutcome::Skipped,
            local_head: None,
            remote_head: None,
            notes: Vec::new(),
        }
    }
}

/// The sync state machine over an injected command runner.
pub struct SyncDriver<'a, R: GitRunner> {
    runner: &'a R,
    repo_root: PathBuf,
    options: SyncOptions,
}

impl<'a, R: GitRunner> SyncDriver<'a, R> {
    pub fn new(runner: &'a R, repo_root: impl Into<PathBuf>, options: SyncOptions) -> Self {
        Self {
            runner,
            repo_root: repo_root.into(),
            options,
        }
    }

    /// Stage, commit, and push the given snapshot paths.
    ///
    /// ## Errors
    ///
    /// - `ErrorKind::GitRepository`: the working directory is not a checkout
    /// - `ErrorKind::GitPush`: final push failed and `strict_push` is set
    /// - `ErrorKind::GitCommand`: git itself could not be executed
    pub fn sync(&self, paths: &[String]) -> Result<SyncReport> {
        let mut notes = Vec::new();

        self.verify_repository()?;
        self.ensure_branch(&mut notes)?;
        self.ensure_merge_policy(&mut notes)?;
        // Line-ending rewriting would churn every snapshot diff.
        self.run_noted(&["config", "core.autocrlf", "false"], &mut notes)?;

        for path in paths.iter().chain(self.options.extra_paths.iter()) {
            self.run_noted(&["add", "-f", path], &mut notes)?;
        }
        self.commit(&mut notes)?;

        let pushed = self.push_with_recovery(paths, &mut notes)?;

        let local_head = self.local_head()?;
        let remote_head = self.remote_head()?;
        let outcome = if pushed {
            SyncOutcome::Synced
        } else {
            SyncOutcome::Degraded
        };

        tracing::info!(
            ?outcome,
            local = local_head.as_deref().unwrap_or("-"),
            remote = remote_head.as_deref().unwrap_or("-"),
            absorbed = notes.len(),
            "Sync finished"
        );

        Ok(SyncReport {
            outcome,
            local_head,
            remote_head,
            notes,
        })
    }

    /// Step 1: fatal unless the working directory is a git checkout.
    fn verify_repository(&self) -> Result<()> {
        let out = self.runner.run(&["rev-parse", "--is-inside-work-tree"])?;
        if !out.success {
            return Err(SnapError::new(ErrorKind::GitRepository)
                .with_op("verify_repository")
                .with_path(&self.repo_root)
                .with_message(out.combined()));
        }
        Ok(())
    }

    /// Step 2: force the checkout onto the configured branch, unless a
    /// rebase or merge is already in progress.
    fn ensure_branch(&self, notes: &mut Vec<String>) -> Result<()> {
        let current = self.runner.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        if current.stdout_trimmed() == self.options.branch {
            return Ok(());
        }
        if self.sequencer_in_progress() {
            note(notes, "branch switch skipped: rebase/merge in progress");
            return Ok(());
        }
        self.run_noted(&["checkout", "-B", &self.options.branch], notes)?;
        Ok(())
    }

    /// A rebase or merge currently owns the worktree state.
    fn sequencer_in_progress(&self) -> bool {
        let git_dir = self.repo_root.join(".git");
        git_dir.join("rebase-merge").exists()
            || git_dir.join("rebase-apply").exists()
            || git_dir.join("MERGE_HEAD").exists()
    }

    /// Step 3: write the merge=ours declaration for the snapshot glob once
    /// and register the ours strategy driver.
    fn ensure_merge_policy(&self, notes: &mut Vec<String>) -> Result<()> {
        let line = format!("{} merge=ours", SNAPSHOT_GLOB);
        let attributes = self.repo_root.join(".gitattributes");
        let existing = fs::read_to_string(&attributes).unwrap_or_default();
        if existing.lines().any(|l| l.trim() == line) {
            return Ok(());
        }

        let mut content = existing;
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(&line);
        content.push('\n');
        // Absorbed on failure: the sync can proceed without the policy, it
        // just loses conflict auto-resolution.
        if let Err(e) = fs::write(&attributes, content) {
            note(
                notes,
                format!(
                    "gitattributes write failed ({}): {}",
                    attributes.display(),
                    e
                ),
            );
            return Ok(());
        }

        self.run_noted(&["add", ".gitattributes"], notes)?;
        self.run_noted(
            &[
                "commit",
                "-m",
                "chore: set merge=ours for data/*.json",
                "--allow-empty",
            ],
            notes,
        )?;
        self.run_noted(&["config", "merge.ours.driver", "true"], notes)?;
        Ok(())
    }

    /// Step 5: commit with a timestamped message.
    fn commit(&self, notes: &mut Vec<String>) -> Result<()> {
        let message = format!("chore: update snapshot {}", now_iso());
        if self.options.allow_empty {
            self.run_noted(&["commit", "-m", &message, "--allow-empty"], notes)?;
        } else {
            self.run_noted(&["commit", "-m", &message], notes)?;
        }
        Ok(())
    }

    /// Steps 6-7: push, falling back to stash -> pull --rebase -> ours
    /// resolution -> re-push on rejection. Returns whether a push landed.
    fn push_with_recovery(&self, paths: &[String], notes: &mut Vec<String>) -> Result<bool> {
        let upstream = self
            .runner
            .run(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])?;
        let first_push = !upstream.success;

        let first = if first_push {
            self.runner
                .run(&["push", "-u", "origin", &self.options.branch])?
        } else {
            self.runner.run(&["push", "origin", &self.options.branch])?
        };
        if first.success {
            return Ok(true);
        }
        note(
            notes,
            format!("push rejected, attempting rebase: {}", first.combined()),
        );

        // Keep the index, stash unstaged/untracked noise out of the rebase.
        self.run_noted(&["stash", "push", "-u", "-k", "-m", "autosync"], notes)?;

        let pull = self
            .runner
            .run(&["pull", "--rebase", "origin", &self.options.branch])?;
        if !pull.success {
            // Rebase conflicted: force every registered snapshot path to
            // the local run's content and continue. Any remote-side manual
            // edit to these files is discarded here, by policy.
            for path in paths {
                self.run_noted(&["checkout", "--ours", path], notes)?;
                self.run_noted(&["add", path], notes)?;
            }
            note(notes, format!("resolved {} snapshot path(s) as ours", paths.len()));
            self.run_noted(&["rebase", "--continue"], notes)?;
        }

        let second = self.runner.run(&["push", "origin", &self.options.branch])?;
        self.run_noted(&["stash", "pop"], notes)?;

        if second.success {
            return Ok(true);
        }
        if self.options.strict_push {
            return Err(SnapError::new(ErrorKind::GitPush)
                .with_op("push_with_recovery")
                .with_message(second.combined()));
        }
        note(notes, format!("push failed after rebase: {}", second.combined()));
        Ok(false)
    }

    /// Step 8a: local HEAD, truncated for operator visibility.
    fn local_head(&self) -> Result<Option<String>> {
        let out = self.runner.run(&["rev-parse", "HEAD"])?;
        Ok(out
            .success
            .then(|| truncate_hash(out.stdout_trimmed()))
            .filter(|h| !h.is_empty()))
    }

    /// Step 8b: remote branch tip via ls-remote, truncated.
    fn remote_head(&self) -> Result<Option<String>> {
        let out = self
            .runner
            .run(&["ls-remote", "origin", &self.options.branch])?;
        if !out.success {
            return Ok(None);
        }
        let tip = out
            .stdout
            .split('\t')
            .next()
            .map(|s| truncate_hash(s.trim()))
            .filter(|h| !h.is_empty());
        Ok(tip)
    }

    /// Run a non-fatal step; a failing exit is recorded, not raised.
    fn run_noted(&self, args: &[&str], notes: &mut Vec<String>) -> Result<()> {
        let out = self.runner.run(args)?;
        if !out.success {
            note(
                notes,
                format!("git {} failed: {}", args.join(" "), out.combined()),
            );
        }
        Ok(())
    }
}

fn note(notes: &mut Vec<String>, message: impl Into<String>) {
    let message = message.into();
    tracing::warn!(step = %message, "Sync step absorbed");
    notes.push(message);
}

fn truncate_hash(hash: &str) -> String {
    hash.chars().take(7).collect()
}
