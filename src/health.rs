//! Liveness and readiness probes.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Is the workspace there to serve from? |

use std::sync::Arc;

use tokio::fs;

use crate::service::FontService;
use crate::{Request, Response, Status};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 ready` while the workspace directory exists, `503` otherwise.
pub async fn readiness(service: Arc<FontService>, _req: Request) -> Response {
    let workspace = &service.config().workspace;
    if fs::metadata(workspace).await.is_ok_and(|m| m.is_dir()) {
        Response::text("ready")
    } else {
        Response::builder()
            .status(Status::ServiceUnavailable)
            .text("workspace missing")
    }
}
