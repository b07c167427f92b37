//! Everything stored in a configuration directory, loaded together.

use super::error::FormatError;
use super::mappings::CharMappings;
use super::parser::LoadReport;
use super::paths::ConfigDir;
use super::recent::RecentFiles;
use super::Settings;
use crate::actions::Keymap;
use crate::actions::catalogue::default_keymap;
use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Format errors found in one file of the profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FileProblems {
    pub path: PathBuf,
    pub errors: Vec<FormatError>,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub dir: ConfigDir,
    pub settings: Settings,
    pub report: LoadReport,
    /// Built-in bindings when there is no accelerators file
    pub keymap: Keymap,
    pub recent: RecentFiles,
    pub text_mappings: CharMappings,
    pub math_mappings: CharMappings,
    /// Problems in the sibling files; settings file errors are in `report`
    pub problems: Vec<FileProblems>,
}

impl Profile {
    /// Loads every file in `dir`. Missing files fall back to defaults.
    pub fn load(dir: ConfigDir) -> Result<Self> {
        let mut settings = Settings::default();
        let settings_path = dir.settings_file();
        let report = if settings_path.exists() {
            settings.load_file(&settings_path)?
        } else {
            info!("Settings file not found, using defaults");
            LoadReport {
                version_mismatch: true,
                ..LoadReport::default()
            }
        };

        let mut problems = Vec::new();
        let mut note = |path: PathBuf, errors: Vec<FormatError>| {
            if !errors.is_empty() {
                problems.push(FileProblems { path, errors });
            }
        };

        let accelerators = dir.accelerators_file();
        let keymap = if accelerators.exists() {
            let (keymap, errors) = Keymap::load_file(&accelerators)?;
            note(accelerators, errors);
            keymap
        } else {
            default_keymap()
        };

        let recent =
            RecentFiles::load_file(&dir.recent_files(), settings.general.max_recent())?;

        let text_path = dir.text_mappings_file();
        let (text_mappings, errors) =
            CharMappings::load_file(&text_path, CharMappings::text_defaults())?;
        note(text_path, errors);

        let math_path = dir.math_mappings_file();
        let (math_mappings, errors) =
            CharMappings::load_file(&math_path, CharMappings::math_defaults())?;
        note(math_path, errors);

        Ok(Self {
            dir,
            settings,
            report,
            keymap,
            recent,
            text_mappings,
            math_mappings,
            problems,
        })
    }

    /// Total number of bad lines across all files.
    pub fn error_count(&self) -> usize {
        self.report.errors.len() + self.problems.iter().map(|p| p.errors.len()).sum::<usize>()
    }

    /// Writes every file back in canonical form.
    pub fn save(&self) -> Result<()> {
        self.settings.save_file(&self.dir.settings_file())?;
        self.keymap.save_file(&self.dir.accelerators_file())?;
        self.recent.save_file(&self.dir.recent_files())?;
        self.text_mappings.save_file(&self.dir.text_mappings_file())?;
        self.math_mappings.save_file(&self.dir.math_mappings_file())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_directory_loads_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let profile = Profile::load(ConfigDir::new(temp.path())).unwrap();
        assert_eq!(profile.settings, Settings::default());
        assert!(profile.report.version_mismatch);
        assert_eq!(profile.keymap, default_keymap());
        assert_eq!(profile.text_mappings, CharMappings::text_defaults());
        assert_eq!(profile.error_count(), 0);
    }

    #[test]
    fn problems_are_collected_per_file() {
        let temp = tempfile::tempdir().unwrap();
        let dir = ConfigDir::new(temp.path());
        fs::write(dir.settings_file(), "showgrid=2\n").unwrap();
        fs::write(dir.accelerators_file(), "edit.copy=Ctrl+C\nedit.cut=Ctrl+C\n").unwrap();
        fs::write(dir.text_mappings_file(), "xyz=1\n").unwrap();

        let profile = Profile::load(dir.clone()).unwrap();
        assert_eq!(profile.report.errors.len(), 1);
        assert_eq!(profile.problems.len(), 2);
        assert_eq!(profile.problems[0].path, dir.accelerators_file());
        assert_eq!(profile.error_count(), 3);
    }

    #[test]
    fn save_then_load_is_stable() {
        let temp = tempfile::tempdir().unwrap();
        let dir = ConfigDir::new(temp.path().join("cfg"));

        let mut profile = Profile::load(dir.clone()).unwrap();
        profile.settings.ui.show_grid = true;
        profile.recent.add("/tmp/a.ajr");
        profile.save().unwrap();

        let reloaded = Profile::load(dir).unwrap();
        assert_eq!(reloaded.settings, profile.settings);
        assert_eq!(reloaded.recent, profile.recent);
        assert_eq!(reloaded.math_mappings, profile.math_mappings);
        assert_eq!(reloaded.keymap.to_config_string(), profile.keymap.to_config_string());
        assert!(!reloaded.report.version_mismatch);
    }
}
