//! Font identity: on-disk keys and tree selection.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{CDN_ROUTE, Config, TEST_ROUTE};
use crate::error::{Error, Result};

/// Which directory tree an operation targets.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Tree {
    /// Staging fonts under the test root.
    #[default]
    Test,
    /// Promoted fonts under the dist root.
    Release,
}

impl Tree {
    /// Parses the `dir` query value. Only `release` selects the release
    /// tree; anything else, including a missing value, means test.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("release") => Self::Release,
            _ => Self::Test,
        }
    }

    pub fn root(self, config: &Config) -> PathBuf {
        match self {
            Self::Test => config.test_root(),
            Self::Release => config.dist_root(),
        }
    }

    /// URL prefix files in this tree are served under.
    pub fn url_prefix(self) -> &'static str {
        match self {
            Self::Test => TEST_ROUTE,
            Self::Release => CDN_ROUTE,
        }
    }
}

/// A validated font directory name.
///
/// The family name (the uploaded file's stem) is the single on-disk key in
/// both trees. It must be one path component so it can never address
/// anything outside its tree.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FontKey(String);

impl FontKey {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.trim().is_empty() {
            return Err(Error::validation("Font ID is required"));
        }
        if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(Error::validation(format!("invalid font name `{name}`")));
        }
        Ok(Self(name))
    }

    /// Derives the key from an uploaded file name: its base name without
    /// the final extension.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::validation(format!("invalid file name `{file_name}`")))?;
        Self::new(stem)
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// URL-friendly id: lowercased, every run of characters outside
    /// `[a-z0-9]` collapsed into one `-`.
    pub fn slug(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut in_gap = false;
        for c in self.0.to_lowercase().chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                out.push(c);
                in_gap = false;
            } else if !in_gap {
                out.push('-');
                in_gap = true;
            }
        }
        out
    }

    /// Canonical stylesheet name, `{key}.css`.
    pub fn css_file_name(&self) -> String {
        format!("{}.css", self.0)
    }

    /// Public URL of this font's stylesheet in `tree`.
    pub fn css_url(&self, tree: Tree) -> String {
        format!("{}/{}/css/{}", tree.url_prefix(), self.0, self.css_file_name())
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for FontKey {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}
