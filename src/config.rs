//! Service configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Local CDN proxy prefix, used for `cssUrl`s and as the default README base.
pub const CDN_ROUTE: &str = "/api/cdn";

/// Static prefix under which the test tree is served.
pub const TEST_ROUTE: &str = "/test";

/// Commit identity used for release commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self {
            name: "Font Manager".to_owned(),
            email: "font-manager@localhost".to_owned(),
        }
    }
}

/// How to invoke the external subsetting script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetTool {
    /// Interpreter that runs the script. `None` executes the script directly.
    pub interpreter: Option<PathBuf>,
    /// The subsetting script.
    pub script: PathBuf,
    /// Reference stylesheet passed as the second argument.
    pub reference_css: PathBuf,
}

/// Configuration for the font service and its HTTP front end.
///
/// Relative paths are resolved against `workspace`, which must be the git
/// working tree that holds the dist directory and the README.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Git working tree and base for every relative path below.
    pub workspace: PathBuf,
    /// Staging tree (`public/test`).
    pub test_dir: PathBuf,
    /// Release tree (`dist`).
    pub dist_dir: PathBuf,
    /// README holding the generated usage block.
    pub readme: PathBuf,
    /// Base URL the README usage snippets point at.
    pub cdn_base: String,
    pub subset_tool: SubsetTool,
    pub git_identity: GitIdentity,
}

impl Config {
    /// Creates a configuration rooted at `workspace` with default layout.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            workspace: workspace.into(),
            test_dir: PathBuf::from("public").join("test"),
            dist_dir: PathBuf::from("dist"),
            readme: PathBuf::from("README.md"),
            cdn_base: CDN_ROUTE.to_owned(),
            subset_tool: SubsetTool {
                interpreter: Some(PathBuf::from("venv").join("bin").join("python")),
                script: PathBuf::from("scripts").join("split_font.py"),
                reference_css: PathBuf::from("scripts").join("google_fonts_reference.css"),
            },
            git_identity: GitIdentity::default(),
        }
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Sets the README usage base URL. A trailing `/` is dropped.
    pub fn with_cdn_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.cdn_base = base.trim_end_matches('/').to_owned();
        self
    }

    /// Sets the interpreter used to run the subsetting script.
    pub fn with_interpreter(mut self, interpreter: Option<PathBuf>) -> Self {
        self.subset_tool.interpreter = interpreter;
        self
    }

    /// Sets the subsetting script.
    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.subset_tool.script = script.into();
        self
    }

    /// Sets the reference stylesheet passed to the subsetting script.
    pub fn with_reference_css(mut self, css: impl Into<PathBuf>) -> Self {
        self.subset_tool.reference_css = css.into();
        self
    }

    /// Sets the commit identity.
    pub fn with_git_identity(mut self, identity: GitIdentity) -> Self {
        self.git_identity = identity;
        self
    }

    pub fn test_root(&self) -> PathBuf { self.resolve(&self.test_dir) }
    pub fn dist_root(&self) -> PathBuf { self.resolve(&self.dist_dir) }
    pub fn readme_path(&self) -> PathBuf { self.resolve(&self.readme) }

    /// Resolves `path` against the workspace unless it is already absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}
