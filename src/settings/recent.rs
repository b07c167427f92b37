//! Recently opened files.

use super::MAX_RECENT_LIMIT;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Most-recent-first list of opened files, capped at `limit` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentFiles {
    paths: Vec<PathBuf>,
    limit: usize,
}

impl RecentFiles {
    pub fn new(limit: u32) -> Self {
        Self {
            paths: Vec::new(),
            limit: limit.min(MAX_RECENT_LIMIT) as usize,
        }
    }

    /// One path per line; blank lines and `#` comments are ignored.
    pub fn parse(text: &str, limit: u32) -> Self {
        let mut recent = Self::new(limit);
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let path = PathBuf::from(line);
            if !recent.paths.contains(&path) {
                recent.paths.push(path);
            }
        }
        recent.paths.truncate(recent.limit);
        recent
    }

    /// Moves `path` to the front, dropping the oldest entry when full.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.paths.retain(|existing| *existing != path);
        self.paths.insert(0, path);
        self.paths.truncate(self.limit);
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|existing| existing != path);
        self.paths.len() != before
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.min(MAX_RECENT_LIMIT) as usize;
        self.paths.truncate(self.limit);
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn to_config_string(&self) -> String {
        self.paths
            .iter()
            .map(|path| format!("{}\n", path.display()))
            .collect()
    }

    /// A missing file is an empty list.
    pub fn load_file(path: &Path, limit: u32) -> Result<Self> {
        if !path.exists() {
            debug!("No recent files list at {}", path.display());
            return Ok(Self::new(limit));
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recent files from {}", path.display()))?;
        Ok(Self::parse(&text, limit))
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(path, self.to_config_string())
            .with_context(|| format!("Failed to write recent files to {}", path.display()))?;
        info!("Saved {} recent files to {}", self.len(), path.display());
        Ok(())
    }
}
