//! Shared fixtures: a temp workspace and a fake process runner standing in
//! for the subsetting script and git.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fontdock::readme::{END_MARKER, START_MARKER};
use fontdock::{CommandOutput, CommandRunner, Config, FontService, Invocation, RunFuture};
use tempfile::TempDir;

/// Pretends to be the subsetting tool (any non-git program) and git.
///
/// The fake tool writes `{stem}.css` referencing two `.woff2` files, plus the
/// files themselves, into its output directory.
#[derive(Default)]
pub struct FakeRunner {
    pub calls: Mutex<Vec<Invocation>>,
    /// Make the subsetting tool exit 1 with this stderr.
    pub subset_failure: Option<String>,
    /// Make the first git call with this subcommand fail.
    pub git_failure: Option<&'static str>,
}

impl FakeRunner {
    /// Arguments of every git call, as strings.
    pub fn git_calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|inv| inv.program == "git")
            .map(|inv| inv.args.iter().map(|a| a.to_string_lossy().into_owned()).collect())
            .collect()
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.git_calls()
            .into_iter()
            .filter(|args| args[0] == "commit")
            .map(|args| args[2].clone())
            .collect()
    }

    fn fake_subset(&self, inv: &Invocation) -> CommandOutput {
        if let Some(stderr) = &self.subset_failure {
            return CommandOutput { code: Some(1), stdout: String::new(), stderr: stderr.clone() };
        }
        let n = inv.args.len();
        let source = PathBuf::from(&inv.args[n - 3]);
        let out_dir = PathBuf::from(&inv.args[n - 1]);
        let stem = source.file_stem().unwrap().to_string_lossy().into_owned();

        std::fs::write(out_dir.join(format!("{stem}-0.woff2")), b"wOF2-0").unwrap();
        std::fs::write(out_dir.join(format!("{stem}-1.woff2")), b"wOF2-1").unwrap();
        let css = format!(
            "@font-face {{ font-family: '{stem}'; src: url('{stem}-0.woff2') format('woff2'); }}\n\
             @font-face {{ font-family: '{stem}'; src: url(\"{stem}-1.woff2\") format('woff2'); }}\n"
        );
        std::fs::write(out_dir.join(format!("{stem}.css")), css).unwrap();
        CommandOutput { code: Some(0), stdout: format!("subset {stem}: 2 chunks\n"), stderr: String::new() }
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(&'a self, inv: &'a Invocation) -> RunFuture<'a> {
        self.calls.lock().unwrap().push(inv.clone());
        let out = if inv.program == "git" {
            let sub = inv.args.first().map(|a| a.to_string_lossy().into_owned());
            if sub.as_deref() == self.git_failure {
                CommandOutput { code: Some(128), stdout: String::new(), stderr: "fatal: no remote".into() }
            } else {
                CommandOutput { code: Some(0), ..Default::default() }
            }
        } else {
            self.fake_subset(inv)
        };
        Box::pin(async move { Ok(out) })
    }
}

pub struct Workspace {
    pub dir: TempDir,
    pub runner: Arc<FakeRunner>,
    pub service: Arc<FontService>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_runner(FakeRunner::default())
    }

    pub fn with_runner(runner: FakeRunner) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("README.md"),
            format!("# Fonts\n\n## Usage\n{START_MARKER}\n{END_MARKER}\n\n## License\n"),
        )
        .unwrap();
        let runner = Arc::new(runner);
        let service = Arc::new(FontService::new(Config::new(dir.path()), runner.clone()));
        Self { dir, runner, service }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn test_tree(&self) -> PathBuf {
        self.root().join("public/test")
    }

    pub fn readme(&self) -> String {
        std::fs::read_to_string(self.root().join("README.md")).unwrap()
    }

    /// Font headings currently listed in the README usage block.
    pub fn readme_fonts(&self) -> Vec<String> {
        let text = self.readme();
        let start = text.find(START_MARKER).unwrap();
        let end = text.find(END_MARKER).unwrap();
        text[start..end]
            .lines()
            .filter_map(|l| l.strip_prefix("### "))
            .map(str::to_owned)
            .collect()
    }

    pub async fn upload(&self, file_name: &str) {
        self.service.upload(file_name, b"\0\x01\0\0fake-ttf").await.unwrap();
    }
}
