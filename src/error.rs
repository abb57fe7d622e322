//! Unified error type.

use serde::Serialize;
use thiserror::Error;

use crate::response::{IntoResponse, Json};
use crate::status::Status;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by fontdock's fallible operations.
///
/// Git failures are not represented here. They never fail a request and are
/// reported through [`SyncReport`](crate::SyncReport) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed client input.
    #[error("{0}")]
    Validation(String),

    /// A referenced test font does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The external subsetting tool failed.
    #[error("{message}")]
    Processing {
        message: String,
        stdout: String,
        stderr: String,
    },

    /// Filesystem failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Binding the listener failed.
    #[error("serve: {0}")]
    Serve(std::io::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Processing { .. } | Self::Io(_) | Self::Serve(_) => Status::InternalServerError,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> crate::Response {
        let error = match &self {
            Self::Processing { message, stderr, .. } => {
                format!("{message}\nSTDERR: {stderr}")
            }
            other => other.to_string(),
        };
        Json(ErrorBody { error }).with_status(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_mapping() {
        assert_eq!(u16::from(Error::validation("x").status()), 400);
        assert_eq!(u16::from(Error::not_found("x").status()), 404);
        let io = Error::from(std::io::Error::other("disk"));
        assert_eq!(u16::from(io.status()), 500);
    }

    #[test]
    fn processing_error_exposes_stderr() {
        let err = Error::Processing {
            message: "subsetting failed".into(),
            stdout: String::new(),
            stderr: "Traceback: boom".into(),
        };
        let resp = err.into_response();
        assert_eq!(resp.status_code(), 500);
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        let text = body["error"].as_str().unwrap();
        assert!(text.contains("subsetting failed"));
        assert!(text.contains("Traceback: boom"));
    }
}
