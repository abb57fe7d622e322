//! fontdock server binary.
//!
//! Run from the git working tree that holds `dist/` and `README.md`:
//!
//! ```text
//! RUST_LOG=info fontdock --workspace . --bind 0.0.0.0:3000 \
//!     --cdn-base https://cdn.jsdelivr.net/gh/acme/fonts@main/dist
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fontdock::{Config, FontService, GitIdentity, Server, SystemRunner, api};

/// Self-hosted web font manager.
#[derive(Parser)]
#[command(name = "fontdock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Git working tree holding the test tree, dist and README
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Interpreter for the subsetting script
    #[arg(long, default_value = "venv/bin/python", conflicts_with = "no_python")]
    python: PathBuf,

    /// Execute the subsetting script directly instead of through an interpreter
    #[arg(long)]
    no_python: bool,

    /// Subsetting script
    #[arg(long, default_value = "scripts/split_font.py")]
    script: PathBuf,

    /// Reference stylesheet handed to the subsetting script
    #[arg(long, default_value = "scripts/google_fonts_reference.css")]
    reference_css: PathBuf,

    /// Base URL used in the README usage snippets
    #[arg(long, default_value = fontdock::config::CDN_ROUTE)]
    cdn_base: String,

    /// Commit author name
    #[arg(long, default_value = "Font Manager")]
    git_name: String,

    /// Commit author email
    #[arg(long, default_value = "font-manager@localhost")]
    git_email: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let workspace = cli
        .workspace
        .canonicalize()
        .with_context(|| format!("workspace {} is not accessible", cli.workspace.display()))?;

    let config = Config::new(workspace)
        .with_bind_addr(cli.bind)
        .with_interpreter((!cli.no_python).then_some(cli.python))
        .with_script(cli.script)
        .with_reference_css(cli.reference_css)
        .with_cdn_base(cli.cdn_base)
        .with_git_identity(GitIdentity { name: cli.git_name, email: cli.git_email });

    let addr = config.bind_addr;
    let service = Arc::new(FontService::new(config, Arc::new(SystemRunner)));

    Server::bind(addr)
        .serve(api::router(service))
        .await
        .context("server error")
}
