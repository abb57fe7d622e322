//! Listing of the test and release trees.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::warn;

use crate::font::Tree;

/// One listed font.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    /// Directory name in the tree.
    pub id: String,
    /// Stem of the discovered stylesheet.
    pub font_family: String,
    pub css_url: String,
    pub created_at: DateTime<Utc>,
}

/// Lists every font under `root`, newest first.
///
/// A missing root yields an empty list. Entries without a stylesheet are
/// omitted and entries that cannot be read are logged and skipped.
pub async fn list_fonts(root: &Path, tree: Tree) -> io::Result<Vec<FontDescriptor>> {
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut fonts = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let Ok(file_type) = entry.file_type().await else { continue };
        if !file_type.is_dir() {
            continue;
        }
        let Some(id) = entry.file_name().to_str().map(str::to_owned) else {
            warn!(path = %entry.path().display(), "skipping non UTF-8 font directory");
            continue;
        };
        match describe(&entry.path(), &id, tree).await {
            Ok(Some(font)) => fonts.push(font),
            Ok(None) => {}
            Err(e) => warn!(font = %id, "error reading font directory: {e}"),
        }
    }

    fonts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(fonts)
}

async fn describe(base: &Path, id: &str, tree: Tree) -> io::Result<Option<FontDescriptor>> {
    let css_dir = base.join("css");
    let (dir, in_css_dir) = if fs::metadata(&css_dir).await.is_ok_and(|m| m.is_dir()) {
        (css_dir, true)
    } else {
        (base.to_path_buf(), false)
    };

    let Some(css_file) = first_stylesheet(&dir).await? else {
        return Ok(None);
    };
    let path: PathBuf = dir.join(&css_file);
    let meta = fs::metadata(&path).await?;
    let created = meta.created().or_else(|_| meta.modified()).unwrap_or(SystemTime::UNIX_EPOCH);

    let sub = if in_css_dir { "css/" } else { "" };
    let font_family = css_file.strip_suffix(".css").unwrap_or(&css_file).to_owned();

    Ok(Some(FontDescriptor {
        id: id.to_owned(),
        css_url: format!("{}/{id}/{sub}{css_file}", tree.url_prefix()),
        font_family,
        created_at: created.into(),
    }))
}

/// First `*.css` regular file in `dir` by file name order.
async fn first_stylesheet(dir: &Path) -> io::Result<Option<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut best: Option<String> = None;
    while let Some(entry) = entries.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else { continue };
        if !name.ends_with(".css") || !entry.file_type().await?.is_file() {
            continue;
        }
        if best.as_ref().is_none_or(|b| name < *b) {
            best = Some(name);
        }
    }
    Ok(best)
}
