//! Best-effort git synchronisation of the release tree.
//!
//! The directory tree is authoritative. Every git failure is logged and
//! collected into a [`SyncReport`]; nothing here returns an error.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::GitIdentity;
use crate::runner::{CommandRunner, Invocation};

/// A non-fatal git failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncWarning {
    /// The git subcommand that failed (`add`, `commit`, `push`).
    pub step: String,
    pub detail: String,
}

/// Outcome of one commit-and-push attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub committed: bool,
    pub pushed: bool,
    pub warnings: Vec<SyncWarning>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.committed && self.pushed && self.warnings.is_empty()
    }
}

/// Stages, commits and pushes paths inside one working tree.
pub struct GitSync {
    runner: Arc<dyn CommandRunner>,
    workdir: PathBuf,
    identity: GitIdentity,
}

impl GitSync {
    pub fn new(runner: Arc<dyn CommandRunner>, workdir: PathBuf, identity: GitIdentity) -> Self {
        Self { runner, workdir, identity }
    }

    /// Runs `config user.name`, `config user.email` (failures ignored),
    /// then `add` for every path group, `commit -m message`, `push`.
    /// Stops at the first failing step.
    pub async fn commit_and_push(&self, adds: &[Vec<OsString>], message: &str) -> SyncReport {
        let mut report = SyncReport::default();

        self.best_effort(["config", "user.name", self.identity.name.as_str()]).await;
        self.best_effort(["config", "user.email", self.identity.email.as_str()]).await;

        for paths in adds {
            let mut args: Vec<OsString> = vec!["add".into()];
            args.extend(paths.iter().cloned());
            if let Err(w) = self.step("add", args).await {
                report.warnings.push(w);
                return report;
            }
        }

        let commit = vec!["commit".into(), "-m".into(), message.into()];
        if let Err(w) = self.step("commit", commit).await {
            report.warnings.push(w);
            return report;
        }
        report.committed = true;

        if let Err(w) = self.step("push", vec!["push".into()]).await {
            report.warnings.push(w);
            return report;
        }
        report.pushed = true;

        info!(%message, "git push successful");
        report
    }

    async fn best_effort<const N: usize>(&self, args: [&str; N]) {
        let inv = args.iter().fold(Invocation::new("git", &self.workdir), |inv, a| inv.arg(*a));
        // Identity is optional; a global config may already provide it.
        let _ = self.runner.run(&inv).await;
    }

    async fn step(&self, step: &str, args: Vec<OsString>) -> Result<(), SyncWarning> {
        let mut inv = Invocation::new("git", &self.workdir);
        inv.args = args;

        let detail = match self.runner.run(&inv).await {
            Ok(out) if out.success() => return Ok(()),
            Ok(out) => {
                let text = if out.stderr.trim().is_empty() { out.stdout } else { out.stderr };
                format!("exit {:?}: {}", out.code, text.trim())
            }
            Err(e) => format!("failed to spawn git: {e}"),
        };

        warn!(step, command = %inv.display(), %detail, "git operation failed");
        Err(SyncWarning { step: step.to_owned(), detail })
    }
}
