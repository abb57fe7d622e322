//! The font service: every workflow stage behind one handle.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::config::Config;
use crate::error::Result;
use crate::font::{FontKey, Tree};
use crate::git::{GitSync, SyncReport, SyncWarning};
use crate::listing::{FontDescriptor, list_fonts};
use crate::readme;
use crate::release::promote;
use crate::runner::CommandRunner;
use crate::upload::{Subsetter, UploadOutcome, upload};

/// Result of a release: the promoted font plus the git side channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOutcome {
    pub font: String,
    pub css_url: String,
    pub readme_updated: bool,
    pub sync: SyncReport,
}

/// Result of a delete. `sync` is only present for the release tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub readme_updated: bool,
    pub sync: Option<SyncReport>,
}

/// Upload, list, release and delete fonts in one workspace.
///
/// Release and release-tree deletes hold the repository lock for their
/// whole duration: dist, the README and the git index are shared.
pub struct FontService {
    config: Config,
    subsetter: Subsetter,
    git: GitSync,
    repo_lock: Mutex<()>,
}

impl FontService {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let subsetter = Subsetter::new(Arc::clone(&runner), &config);
        let git = GitSync::new(runner, config.workspace.clone(), config.git_identity.clone());
        Self { config, subsetter, git, repo_lock: Mutex::new(()) }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stores and processes an uploaded font in the test tree.
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        upload(&self.config.test_root(), &self.subsetter, file_name, bytes).await
    }

    /// Lists `tree`, newest first.
    pub async fn list(&self, tree: Tree) -> Result<Vec<FontDescriptor>> {
        Ok(list_fonts(&tree.root(&self.config), tree).await?)
    }

    /// Promotes `test/{id}` to `dist/{font_family or id}`, regenerates the
    /// README block and commits. Git problems only show up in the report.
    pub async fn release(&self, id: &str, font_family: Option<&str>) -> Result<ReleaseOutcome> {
        let id = FontKey::new(id)?;
        let target = match font_family.filter(|f| !f.is_empty()) {
            Some(family) => FontKey::new(family)?,
            None => id.clone(),
        };

        let _guard = self.repo_lock.lock().await;
        let dist_root = self.config.dist_root();
        let release_dir = promote(&self.config.test_root(), &dist_root, &id, &target).await?;
        info!(font = %target, source = %id, "font released");

        let (readme_updated, readme_warning) = self.sync_readme(&dist_root).await;
        let mut adds = vec![vec![self.workspace_relative(&release_dir)]];
        if readme_updated {
            adds.push(vec![self.workspace_relative(&self.config.readme_path())]);
        }
        let mut sync = self
            .git
            .commit_and_push(&adds, &format!("release: update font {target}"))
            .await;
        if let Some(warning) = readme_warning {
            sync.warnings.insert(0, warning);
        }

        Ok(ReleaseOutcome {
            css_url: target.css_url(Tree::Release),
            font: target.to_string(),
            readme_updated,
            sync,
        })
    }

    /// Removes `id` from `tree`. Missing directories are not an error. For
    /// the release tree the README and git are brought in line afterwards.
    pub async fn delete(&self, id: &str, tree: Tree) -> Result<DeleteOutcome> {
        let id = FontKey::new(id)?;
        let root = tree.root(&self.config);

        if tree == Tree::Test {
            remove_font_dir(&root.join(&id)).await;
            return Ok(DeleteOutcome::default());
        }

        let _guard = self.repo_lock.lock().await;
        remove_font_dir(&root.join(&id)).await;

        let (readme_updated, readme_warning) = self.sync_readme(&root).await;
        let mut adds = vec![vec![OsString::from("-A"), self.workspace_relative(&root)]];
        if readme_updated {
            adds.push(vec![self.workspace_relative(&self.config.readme_path())]);
        }
        let mut sync = self
            .git
            .commit_and_push(&adds, &format!("release: delete font {id}"))
            .await;
        if let Some(warning) = readme_warning {
            sync.warnings.insert(0, warning);
        }

        Ok(DeleteOutcome { readme_updated, sync: Some(sync) })
    }

    async fn sync_readme(&self, dist_root: &Path) -> (bool, Option<SyncWarning>) {
        match readme::sync(&self.config.readme_path(), dist_root, &self.config.cdn_base).await {
            Ok(updated) => (updated, None),
            Err(e) => {
                error!("failed to update README: {e}");
                let warning = SyncWarning { step: "readme".to_owned(), detail: e.to_string() };
                (false, Some(warning))
            }
        }
    }

    /// Path as given to git: relative to the workspace when inside it.
    fn workspace_relative(&self, path: &Path) -> OsString {
        path.strip_prefix(&self.config.workspace)
            .unwrap_or(path)
            .as_os_str()
            .to_owned()
    }
}

async fn remove_font_dir(path: &Path) {
    match fs::remove_dir_all(path).await {
        Ok(()) => info!(path = %path.display(), "font directory deleted"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => error!(path = %path.display(), "error deleting directory: {e}"),
    }
}
