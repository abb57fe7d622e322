//! Promotion of a test font into the release tree.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::font::FontKey;
use crate::upload::TestLayout;

/// Replaces `dist/{target}` with copies of `test/{id}/fonts` and
/// `test/{id}/css`. A stylesheet named after `id` is renamed after `target`,
/// so the release answers at `{target}/css/{target}.css`.
///
/// The source is checked before anything under dist is touched: it must
/// exist and both subdirectories must be non-empty. A copy failure after
/// that point leaves the partial release in place for the caller to retry.
pub(crate) async fn promote(
    test_root: &Path,
    dist_root: &Path,
    id: &FontKey,
    target: &FontKey,
) -> Result<PathBuf> {
    let source = TestLayout::new(test_root, id);
    if !is_dir(&source.base).await {
        return Err(Error::not_found("Test font not found"));
    }
    for dir in [&source.fonts, &source.css] {
        if !has_entries(dir).await? {
            return Err(Error::not_found(format!(
                "Test font `{id}` has no processed files in {}",
                dir.file_name().and_then(|n| n.to_str()).unwrap_or_default()
            )));
        }
    }

    let release = dist_root.join(target);
    match fs::remove_dir_all(&release).await {
        Ok(()) => debug!(path = %release.display(), "removed previous release"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    let release_fonts = release.join("fonts");
    let release_css = release.join("css");
    fs::create_dir_all(&release_css).await?;
    fs::create_dir_all(&release_fonts).await?;

    copy_dir_all(&source.fonts, &release_fonts).await?;
    copy_dir_all(&source.css, &release_css).await?;

    if id != target {
        let copied = release_css.join(id.css_file_name());
        if fs::metadata(&copied).await.is_ok_and(|m| m.is_file()) {
            fs::rename(&copied, release_css.join(target.css_file_name())).await?;
        }
    }
    Ok(release)
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn has_entries(dir: &Path) -> io::Result<bool> {
    match fs::read_dir(dir).await {
        Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Recursively copies the contents of `from` into `to`, creating
/// directories as needed. Symlinks are followed.
pub(crate) async fn copy_dir_all(from: &Path, to: &Path) -> io::Result<()> {
    let mut pending = vec![(from.to_path_buf(), to.to_path_buf())];
    while let Some((src, dst)) = pending.pop() {
        fs::create_dir_all(&dst).await?;
        let mut entries = fs::read_dir(&src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = dst.join(entry.file_name());
            if fs::metadata(entry.path()).await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                fs::copy(entry.path(), &target).await?;
            }
        }
    }
    Ok(())
}
