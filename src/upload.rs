//! Upload stage: store the original, subset it, relocate the stylesheet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::{Config, SubsetTool};
use crate::css::rewrite_font_urls;
use crate::error::{Error, Result};
use crate::font::{FontKey, Tree};
use crate::runner::{CommandRunner, Invocation, arg_path};

/// Result of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub message: String,
    pub font_id: String,
    pub font_family: String,
    pub slug: String,
    pub css_url: String,
    /// Standard output of the subsetting tool.
    pub logs: String,
}

/// Paths of one font directory in the test tree.
pub(crate) struct TestLayout {
    pub base: PathBuf,
    pub original: PathBuf,
    pub fonts: PathBuf,
    pub css: PathBuf,
}

impl TestLayout {
    pub fn new(test_root: &Path, key: &FontKey) -> Self {
        let base = test_root.join(key);
        Self {
            original: base.join("original"),
            fonts: base.join("fonts"),
            css: base.join("css"),
            base,
        }
    }
}

/// Runs the external subsetting script.
pub struct Subsetter {
    runner: Arc<dyn CommandRunner>,
    workspace: PathBuf,
    tool: SubsetTool,
}

impl Subsetter {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &Config) -> Self {
        Self {
            runner,
            workspace: config.workspace.clone(),
            tool: config.subset_tool.clone(),
        }
    }

    /// Invokes `[interpreter] script source reference_css out_dir` and
    /// returns the tool's stdout.
    pub async fn run(&self, source: &Path, out_dir: &Path) -> Result<String> {
        let script = arg_path(&self.workspace, &self.tool.script);
        let inv = match &self.tool.interpreter {
            Some(interpreter) => Invocation::new(arg_path(&self.workspace, interpreter), &self.workspace)
                .arg(script),
            None => Invocation::new(script, &self.workspace),
        }
        .arg(source.as_os_str())
        .arg(arg_path(&self.workspace, &self.tool.reference_css))
        .arg(out_dir.as_os_str());

        info!(command = %inv.display(), "running subsetting tool");
        let out = self.runner.run(&inv).await.map_err(|e| Error::Processing {
            message: format!("Upload failed: could not start subsetting tool: {e}"),
            stdout: String::new(),
            stderr: String::new(),
        })?;

        debug!(stdout = %out.stdout, "subsetting tool finished");
        if !out.stderr.is_empty() {
            warn!(stderr = %out.stderr, "subsetting tool wrote to stderr");
        }
        if !out.success() {
            return Err(Error::Processing {
                message: format!("Upload failed: subsetting tool exited with {:?}", out.code),
                stdout: out.stdout,
                stderr: out.stderr,
            });
        }
        Ok(out.stdout)
    }
}

/// Stores `bytes` as `file_name`, subsets it and moves the generated
/// stylesheet into `css/` with rewritten font URLs.
///
/// Directories created before a failure are left in place.
pub(crate) async fn upload(
    test_root: &Path,
    subsetter: &Subsetter,
    file_name: &str,
    bytes: &[u8],
) -> Result<UploadOutcome> {
    if bytes.is_empty() {
        return Err(Error::validation("No file uploaded"));
    }
    let key = FontKey::from_file_name(file_name)?;
    // Only the base name is kept, whatever path the client sent.
    let original_name = Path::new(file_name)
        .file_name()
        .ok_or_else(|| Error::validation(format!("invalid file name `{file_name}`")))?;

    let layout = TestLayout::new(test_root, &key);
    fs::create_dir_all(&layout.original).await?;
    fs::create_dir_all(&layout.fonts).await?;
    fs::create_dir_all(&layout.css).await?;

    let source = layout.original.join(original_name);
    fs::write(&source, bytes).await?;

    let logs = subsetter.run(&source, &layout.fonts).await?;

    let css_name = key.css_file_name();
    let generated = layout.fonts.join(&css_name);
    match fs::read_to_string(&generated).await {
        Ok(css) => {
            fs::write(layout.css.join(&css_name), rewrite_font_urls(&css)).await?;
            fs::remove_file(&generated).await?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(font = %key, "subsetting tool produced no stylesheet");
        }
        Err(e) => return Err(e.into()),
    }

    info!(font = %key, dir = %layout.base.display(), "upload processed");
    Ok(UploadOutcome {
        message: "Upload and processing complete".to_owned(),
        font_id: key.to_string(),
        font_family: key.to_string(),
        slug: key.slug(),
        css_url: key.css_url(Tree::Test),
        logs,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::runner::{CommandOutput, RunFuture};

    #[derive(Default)]
    struct Capture(Mutex<Vec<Invocation>>);

    impl CommandRunner for Capture {
        fn run<'a>(&'a self, inv: &'a Invocation) -> RunFuture<'a> {
            self.0.lock().unwrap().push(inv.clone());
            Box::pin(async { Ok(CommandOutput { code: Some(0), ..Default::default() }) })
        }
    }

    #[tokio::test]
    async fn tool_gets_source_reference_and_output_dir() {
        let capture = Arc::new(Capture::default());
        let config = Config::new("/w");
        let subsetter = Subsetter::new(capture.clone(), &config);

        subsetter.run(Path::new("/w/in.ttf"), Path::new("/w/out")).await.unwrap();

        let inv = capture.0.lock().unwrap()[0].clone();
        assert_eq!(inv.program, "/w/venv/bin/python");
        assert_eq!(
            inv.args,
            ["/w/scripts/split_font.py", "/w/in.ttf", "/w/scripts/google_fonts_reference.css", "/w/out"]
        );
        assert_eq!(inv.cwd, PathBuf::from("/w"));
    }

    #[tokio::test]
    async fn script_runs_directly_without_interpreter() {
        let capture = Arc::new(Capture::default());
        let config = Config::new("/w").with_interpreter(None).with_script("/opt/split");
        let subsetter = Subsetter::new(capture.clone(), &config);

        subsetter.run(Path::new("a.ttf"), Path::new("out")).await.unwrap();

        let inv = capture.0.lock().unwrap()[0].clone();
        assert_eq!(inv.program, "/opt/split");
        assert_eq!(inv.args.len(), 3);
    }

    #[tokio::test]
    async fn upload_without_stylesheet_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path());
        let subsetter = Subsetter::new(Arc::new(Capture::default()), &config);

        let outcome = upload(&config.test_root(), &subsetter, "Plain.otf", b"otf").await.unwrap();
        assert_eq!(outcome.css_url, "/test/Plain/css/Plain.css");
        assert!(config.test_root().join("Plain/original/Plain.otf").is_file());
        assert!(!config.test_root().join("Plain/css/Plain.css").exists());
    }
}
