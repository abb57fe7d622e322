//! Static file serving for the release tree (the CDN proxy) and the test
//! tree.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{error, warn};

use crate::response::{ContentType, Response};
use crate::status::Status;

/// Maps a `/`-separated slug onto a path under `root`.
///
/// Returns `None` for any slug that could leave the root: empty segments,
/// `.`, `..` or backslashes.
pub fn resolve(root: &Path, slug: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in slug.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains(['\\', '\0']) {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

/// Serves `slug` from `root` with an extension-derived content type and an
/// open CORS header.
pub async fn serve_file(root: &Path, slug: &str) -> Response {
    let Some(path) = resolve(root, slug) else {
        warn!(%slug, "rejected static path");
        return not_found();
    };

    match fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return not_found(),
    }

    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return not_found(),
        Err(e) => {
            error!(path = %path.display(), "failed to read static file: {e}");
            return Response::status(Status::InternalServerError);
        }
    };

    let content_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(ContentType::OctetStream, ContentType::from_extension);

    Response::builder()
        .header("access-control-allow-origin", "*")
        .bytes(content_type, bytes)
}

fn not_found() -> Response {
    Response::builder().status(Status::NotFound).text("File not found")
}
