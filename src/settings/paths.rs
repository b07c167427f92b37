//! Location of the user's configuration files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "flowframtk";

/// Directory holding the settings file and its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `flowframtk` under the platform configuration directory
    /// (`~/.config/flowframtk` on Linux).
    pub fn locate() -> Result<Self> {
        let root = dirs::config_dir()
            .context("Could not find config directory")?
            .join(APP_DIR);
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("flowframtk.conf")
    }

    pub fn accelerators_file(&self) -> PathBuf {
        self.root.join("accelerators.conf")
    }

    pub fn recent_files(&self) -> PathBuf {
        self.root.join("recentfiles")
    }

    pub fn text_mappings_file(&self) -> PathBuf {
        self.root.join("textmappings.conf")
    }

    pub fn math_mappings_file(&self) -> PathBuf {
        self.root.join("mathmappings.conf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_root() {
        let dir = ConfigDir::new("/tmp/cfg");
        assert_eq!(dir.settings_file(), PathBuf::from("/tmp/cfg/flowframtk.conf"));
        assert_eq!(dir.recent_files(), PathBuf::from("/tmp/cfg/recentfiles"));
        assert!(dir.math_mappings_file().starts_with(dir.root()));
    }
}
