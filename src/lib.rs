//! # fontdock
//!
//! A small backend for self-hosted web fonts.
//!
//! - **Upload**: store a font, subset it with an external script, move the
//!   generated stylesheet into `css/` with `../fonts/` URLs.
//! - **List**: describe the fonts in the test tree or the release tree.
//! - **Release**: copy a test font into `dist/`, regenerate the README usage
//!   block, commit and push.
//! - **Delete**: remove a font from either tree, keeping README and git in
//!   line for releases.
//! - **Serve**: the release tree under `/api/cdn/…` with CORS, the test tree
//!   under `/test/…`.
//!
//! The dist directory is authoritative. Git is best effort: a failed commit
//! or push is reported as a [`SyncWarning`] and never fails the request.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fontdock::{Config, FontService, Server, SystemRunner, api};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fontdock::Error> {
//!     let config = Config::new("/srv/fonts");
//!     let addr = config.bind_addr;
//!     let service = Arc::new(FontService::new(config, Arc::new(SystemRunner)));
//!     Server::bind(addr).serve(api::router(service)).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod cdn;
pub mod config;
pub mod css;
pub mod font;
pub mod git;
pub mod health;
pub mod listing;
pub mod readme;
mod release;
pub mod runner;
pub mod service;
pub mod upload;

pub use config::{Config, GitIdentity, SubsetTool};
pub use error::{Error, Result};
pub use font::{FontKey, Tree};
pub use git::{SyncReport, SyncWarning};
pub use handler::{Handler, with_state};
pub use listing::FontDescriptor;
pub use method::Method;
pub use request::Request;
pub use response::{ContentType, FontFormat, IntoResponse, Json, Response};
pub use router::Router;
pub use runner::{CommandOutput, CommandRunner, Invocation, RunFuture, SystemRunner};
pub use server::Server;
pub use service::{DeleteOutcome, FontService, ReleaseOutcome};
pub use status::Status;
pub use upload::UploadOutcome;
