//! HTTP routes.
//!
//! | Method | Path | Stage |
//! |---|---|---|
//! | `POST` | `/api/upload?filename=…` | upload (raw body) |
//! | `GET` | `/api/fonts?dir=test\|release` | listing |
//! | `POST` | `/api/release` | release |
//! | `DELETE` | `/api/fonts/{id}?dir=test\|release` | delete |
//! | `GET` | `/api/cdn/{*path}` | release tree files |
//! | `GET` | `/test/{*path}` | test tree files |
//! | `GET` | `/healthz`, `/readyz` | probes |

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::cdn::serve_file;
use crate::error::{Error, Result};
use crate::font::Tree;
use crate::git::SyncWarning;
use crate::handler::with_state;
use crate::health;
use crate::listing::FontDescriptor;
use crate::service::FontService;
use crate::upload::UploadOutcome;
use crate::{Json, Method, Request, Response, Router};

/// Builds the full application router around `service`.
pub fn router(service: Arc<FontService>) -> Router {
    Router::new()
        .on(Method::Post,   "/api/upload",      with_state(service.clone(), upload))
        .on(Method::Get,    "/api/fonts",       with_state(service.clone(), list))
        .on(Method::Delete, "/api/fonts/{id}",  with_state(service.clone(), delete))
        .on(Method::Post,   "/api/release",     with_state(service.clone(), release))
        .on(Method::Get,    "/api/cdn/{*path}", with_state(service.clone(), cdn))
        .on(Method::Get,    "/test/{*path}",    with_state(service.clone(), test_file))
        .on(Method::Get,    "/healthz",         health::liveness)
        .on(Method::Get,    "/readyz",          with_state(service, health::readiness))
}

// POST /api/upload
//
// The body is the font file itself; its name comes from `?filename=` or the
// `x-file-name` header.
async fn upload(service: Arc<FontService>, req: Request) -> Result<Json<UploadOutcome>> {
    let file_name = req
        .query("filename")
        .or_else(|| req.header("x-file-name"))
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::validation("No file uploaded"))?;

    service.upload(file_name, req.body()).await.map(Json).inspect_err(|e| {
        error!("upload error: {e}");
    })
}

#[derive(Serialize)]
struct FontList {
    fonts: Vec<FontDescriptor>,
}

// GET /api/fonts?dir=release
async fn list(service: Arc<FontService>, req: Request) -> Result<Json<FontList>> {
    let tree = Tree::from_query(req.query("dir"));
    let fonts = service.list(tree).await.inspect_err(|e| {
        error!("failed to list fonts: {e}");
    })?;
    Ok(Json(FontList { fonts }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    font_family: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseResponse {
    success: bool,
    css_url: String,
    warnings: Vec<SyncWarning>,
}

// POST /api/release  {"id": "...", "fontFamily": "..."}
async fn release(service: Arc<FontService>, req: Request) -> Result<Json<ReleaseResponse>> {
    let body: ReleaseRequest = serde_json::from_slice(req.body())
        .map_err(|e| Error::validation(format!("invalid release request: {e}")))?;
    let id = body
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::validation("Font ID is required"))?;

    let outcome = service
        .release(&id, body.font_family.as_deref())
        .await
        .inspect_err(|e| error!("release error: {e}"))?;

    Ok(Json(ReleaseResponse {
        success: true,
        css_url: outcome.css_url,
        warnings: outcome.sync.warnings,
    }))
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<SyncWarning>>,
}

// DELETE /api/fonts/{id}?dir=release
async fn delete(service: Arc<FontService>, req: Request) -> Result<Json<DeleteResponse>> {
    let id = req.param("id").unwrap_or_default();
    let tree = Tree::from_query(req.query("dir"));
    let outcome = service.delete(id, tree).await?;
    Ok(Json(DeleteResponse {
        success: true,
        warnings: outcome.sync.map(|s| s.warnings),
    }))
}

// GET /api/cdn/{*path}
async fn cdn(service: Arc<FontService>, req: Request) -> Response {
    serve_file(&service.config().dist_root(), req.param("path").unwrap_or_default()).await
}

// GET /test/{*path}
async fn test_file(service: Arc<FontService>, req: Request) -> Response {
    serve_file(&service.config().test_root(), req.param("path").unwrap_or_default()).await
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use bytes::Bytes;

    use super::*;
    use crate::config::Config;
    use crate::runner::{CommandOutput, CommandRunner, Invocation, RunFuture};

    /// Stands in for the subsetting script (one stylesheet, one font) and
    /// for git, whose `push` can be made to fail.
    #[derive(Default)]
    struct Scripted {
        fail_push: bool,
    }

    impl CommandRunner for Scripted {
        fn run<'a>(&'a self, inv: &'a Invocation) -> RunFuture<'a> {
            let args: Vec<String> = inv.args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
            let out = if inv.program == "git" {
                if self.fail_push && args[0] == "push" {
                    CommandOutput { code: Some(1), stderr: "rejected".into(), ..Default::default() }
                } else {
                    CommandOutput { code: Some(0), ..Default::default() }
                }
            } else {
                let n = args.len();
                let stem = Path::new(&args[n - 3]).file_stem().unwrap().to_string_lossy().into_owned();
                let out_dir = Path::new(&args[n - 1]);
                std::fs::write(out_dir.join(format!("{stem}.woff2")), b"wOF2").unwrap();
                std::fs::write(out_dir.join(format!("{stem}.css")), format!("src: url('{stem}.woff2');")).unwrap();
                CommandOutput { code: Some(0), stdout: "done\n".into(), ..Default::default() }
            };
            Box::pin(async move { Ok(out) })
        }
    }

    fn app(dir: &Path) -> Router {
        app_with(dir, Scripted::default())
    }

    fn app_with(dir: &Path, runner: Scripted) -> Router {
        router(Arc::new(FontService::new(Config::new(dir), Arc::new(runner))))
    }

    fn request(method: Method, path: &str, query: Option<&str>, body: &[u8]) -> Request {
        Request::new(method, path.into(), query, Vec::new(), Bytes::copy_from_slice(body))
    }

    fn json(resp: &Response) -> serde_json::Value {
        serde_json::from_slice(resp.body()).unwrap()
    }

    #[tokio::test]
    async fn upload_without_name_or_body_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let resp = app.respond(request(Method::Post, "/api/upload", None, b"data")).await;
        assert_eq!(resp.status_code(), 400);
        assert_eq!(json(&resp)["error"], "No file uploaded");

        let resp = app
            .respond(request(Method::Post, "/api/upload", Some("filename=A.ttf"), b""))
            .await;
        assert_eq!(resp.status_code(), 400);
        assert!(!dir.path().join("public/test/A").exists());
    }

    #[tokio::test]
    async fn release_requires_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let resp = app.respond(request(Method::Post, "/api/release", None, b"{}")).await;
        assert_eq!(resp.status_code(), 400);
        assert_eq!(json(&resp)["error"], "Font ID is required");

        let resp = app.respond(request(Method::Post, "/api/release", None, b"not json")).await;
        assert_eq!(resp.status_code(), 400);
    }

    #[tokio::test]
    async fn release_of_unknown_font_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .respond(request(Method::Post, "/api/release", None, br#"{"id":"Ghost"}"#))
            .await;
        assert_eq!(resp.status_code(), 404);
        assert_eq!(json(&resp)["error"], "Test font not found");
    }

    #[tokio::test]
    async fn listing_missing_tree_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .respond(request(Method::Get, "/api/fonts", Some("dir=release"), b""))
            .await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(json(&resp), serde_json::json!({ "fonts": [] }));
    }

    #[tokio::test]
    async fn delete_missing_test_font_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .respond(request(Method::Delete, "/api/fonts/Nope", None, b""))
            .await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(json(&resp), serde_json::json!({ "success": true }));
    }

    #[tokio::test]
    async fn delete_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let resp = app(dir.path())
            .respond(request(Method::Delete, "/api/fonts/..", Some("dir=release"), b""))
            .await;
        assert_eq!(resp.status_code(), 400);
    }

    #[tokio::test]
    async fn test_tree_is_served_statically() {
        let dir = tempfile::tempdir().unwrap();
        let css = dir.path().join("public/test/A/css");
        std::fs::create_dir_all(&css).unwrap();
        std::fs::write(css.join("A.css"), "a{}").unwrap();

        let resp = app(dir.path())
            .respond(request(Method::Get, "/test/A/css/A.css", None, b""))
            .await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.header("content-type"), Some("text/css"));
    }

    #[tokio::test]
    async fn probes_answer() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        assert_eq!(app.respond(request(Method::Get, "/healthz", None, b"")).await.body(), b"ok");
        assert_eq!(app.respond(request(Method::Get, "/readyz", None, b"")).await.body(), b"ready");
    }

    #[tokio::test]
    async fn upload_reports_camel_case_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let resp = app
            .respond(request(Method::Post, "/api/upload", Some("filename=Mono.ttf"), b"ttf"))
            .await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(
            json(&resp),
            serde_json::json!({
                "message": "Upload and processing complete",
                "fontId": "Mono",
                "fontFamily": "Mono",
                "slug": "mono",
                "cssUrl": "/test/Mono/css/Mono.css",
                "logs": "done\n",
            })
        );

        let by_header = Request::new(
            Method::Post,
            "/api/upload".into(),
            None,
            vec![("X-File-Name".to_owned(), "Book Serif.otf".to_owned())],
            Bytes::from_static(b"otf"),
        );
        let resp = app.respond(by_header).await;
        assert_eq!(resp.status_code(), 200);
        let body = json(&resp);
        assert_eq!(body["fontId"], "Book Serif");
        assert_eq!(body["slug"], "book-serif");
        assert_eq!(body["cssUrl"], "/test/Book Serif/css/Book Serif.css");
        assert!(dir.path().join("public/test/Book Serif/original/Book Serif.otf").is_file());
    }

    #[tokio::test]
    async fn release_reports_css_url_and_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        app.respond(request(Method::Post, "/api/upload", Some("filename=Mono.ttf"), b"ttf")).await;

        let resp = app
            .respond(request(Method::Post, "/api/release", None, br#"{"id":"Mono"}"#))
            .await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(
            json(&resp),
            serde_json::json!({ "success": true, "cssUrl": "/api/cdn/Mono/css/Mono.css", "warnings": [] })
        );

        let css = app.respond(request(Method::Get, "/api/cdn/Mono/css/Mono.css", None, b"")).await;
        assert_eq!(css.status_code(), 200);
        assert_eq!(css.body(), b"src: url('../fonts/Mono.woff2');");
    }

    #[tokio::test]
    async fn release_under_family_name_serves_its_css_url() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        app.respond(request(Method::Post, "/api/upload", Some("filename=draft.ttf"), b"ttf")).await;

        let resp = app
            .respond(request(Method::Post, "/api/release", None, br#"{"id":"draft","fontFamily":"Final"}"#))
            .await;
        let css_url = json(&resp)["cssUrl"].as_str().unwrap().to_owned();
        assert_eq!(css_url, "/api/cdn/Final/css/Final.css");

        let css = app.respond(request(Method::Get, &css_url, None, b"")).await;
        assert_eq!(css.status_code(), 200);
    }

    #[tokio::test]
    async fn release_delete_with_failed_push_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Scripted { fail_push: true });
        app.respond(request(Method::Post, "/api/upload", Some("filename=Mono.ttf"), b"ttf")).await;

        let resp = app
            .respond(request(Method::Post, "/api/release", None, br#"{"id":"Mono"}"#))
            .await;
        assert_eq!(resp.status_code(), 200);
        assert_eq!(json(&resp)["warnings"][0]["step"], "push");

        let resp = app
            .respond(request(Method::Delete, "/api/fonts/Mono", Some("dir=release"), b""))
            .await;
        assert_eq!(resp.status_code(), 200);
        let body = json(&resp);
        assert_eq!(body["success"], true);
        assert_eq!(body["warnings"][0]["step"], "push");
        assert_eq!(body["warnings"][0]["detail"].as_str().map(|d| d.contains("rejected")), Some(true));
        assert!(!dir.path().join("dist/Mono").exists());
    }
}
