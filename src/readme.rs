//! Generated usage block inside the repository README.
//!
//! The block between [`START_MARKER`] and [`END_MARKER`] is always rebuilt
//! from the live contents of the dist tree, never patched, so it converges
//! even after a skipped or failed update.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

pub const START_MARKER: &str = "<!-- FONTS_USAGE_START -->";
pub const END_MARKER: &str = "<!-- FONTS_USAGE_END -->";

/// Renders the usage block body for `fonts`, which must already be sorted.
pub fn render_usage(fonts: &[String], cdn_base: &str) -> String {
    let mut out = String::from("\n");
    if !fonts.is_empty() {
        out.push_str(
            "The released fonts are served from the `dist` directory and can be \
             linked directly from the CDN.\n\n",
        );
    }
    for font in fonts {
        let css_url = format!("{cdn_base}/{font}/css/{font}.css");
        let _ = write!(
            out,
            "### {font}\n\n\
             **1. HTML (Recommended)**\n\
             ```html\n\
             <link rel=\"stylesheet\" href=\"{css_url}\" />\n\
             ```\n\n\
             **2. CSS @import**\n\
             ```css\n\
             @import url(\"{css_url}\");\n\
             ```\n\n"
        );
    }
    out
}

/// Replaces the first marker block in `readme` with `body`. Returns `None`
/// when either marker is missing or they are out of order.
pub fn splice(readme: &str, body: &str) -> Option<String> {
    let start = readme.find(START_MARKER)?;
    let body_start = start + START_MARKER.len();
    let end = body_start + readme[body_start..].find(END_MARKER)?;

    let mut out = String::with_capacity(readme.len() + body.len());
    out.push_str(&readme[..body_start]);
    out.push_str(body);
    out.push_str(&readme[end..]);
    Some(out)
}

/// Sorted names of the directories directly under `dist_root`. A missing
/// root lists as empty.
pub async fn released_fonts(dist_root: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = match fs::read_dir(dist_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(names),
        Err(e) => return Err(e),
    };
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Regenerates the usage block in `readme_path` from `dist_root`.
///
/// Returns whether the file was rewritten. A missing README or one without
/// markers is left alone.
pub async fn sync(readme_path: &Path, dist_root: &Path, cdn_base: &str) -> io::Result<bool> {
    let current = match fs::read_to_string(readme_path).await {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %readme_path.display(), "no README, skipping usage sync");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };

    let fonts = released_fonts(dist_root).await?;
    let Some(updated) = splice(&current, &render_usage(&fonts, cdn_base)) else {
        debug!(path = %readme_path.display(), "README has no usage markers");
        return Ok(false);
    };
    if updated == current {
        return Ok(false);
    }

    fs::write(readme_path, updated).await?;
    info!(fonts = fonts.len(), "README usage block regenerated");
    Ok(true)
}
