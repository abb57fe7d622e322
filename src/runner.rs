//! External process execution.
//!
//! The subsetting script and `git` are both reached through
//! [`CommandRunner`], so tests can substitute a scripted fake and run
//! without python or a git remote.

use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::process::Command;
use tracing::debug;

/// Boxed future returned by [`CommandRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = io::Result<CommandOutput>> + Send + 'a>>;

/// One process invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>, cwd: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new(), cwd: cwd.into() }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Lossy `program arg arg ...` rendering for logs.
    pub fn display(&self) -> String {
        let mut s = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            s.push(' ');
            s.push_str(&arg.to_string_lossy());
        }
        s
    }
}

/// Captured result of a finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a process to completion and captures its output.
///
/// `Err` means the process could not be spawned at all; a non-zero exit is
/// reported through [`CommandOutput::code`].
pub trait CommandRunner: Send + Sync {
    fn run<'a>(&'a self, invocation: &'a Invocation) -> RunFuture<'a>;
}

/// Spawns real processes with `tokio::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run<'a>(&'a self, invocation: &'a Invocation) -> RunFuture<'a> {
        Box::pin(async move {
            debug!(command = %invocation.display(), cwd = %invocation.cwd.display(), "spawning");
            let output = Command::new(&invocation.program)
                .args(&invocation.args)
                .current_dir(&invocation.cwd)
                .output()
                .await?;
            Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        })
    }
}

/// Joins `path` onto `base` for use as a process argument.
pub(crate) fn arg_path(base: &Path, path: &Path) -> OsString {
    if path.is_absolute() {
        path.as_os_str().to_owned()
    } else {
        base.join(path).into_os_string()
    }
}
