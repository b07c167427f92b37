//! Detection of the TeX helper executables used for export.

use super::Settings;
use log::{debug, info};
use std::env;
use std::path::{Path, PathBuf};

/// Searches `PATH` for an executable called `name`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        candidates(&dir, name)
            .into_iter()
            .find(|candidate| is_executable(candidate))
    })
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(format!("{name}.exe")), dir.join(name)]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// A stored path that needs to be looked up again.
fn is_stale(path: &Option<PathBuf>) -> bool {
    match path {
        None => true,
        Some(path) => !path.exists(),
    }
}

impl Settings {
    /// Re-detects the export helpers.
    ///
    /// Every helper is looked up again when `version_mismatch` is set,
    /// otherwise only those whose stored path is empty or no longer exists.
    /// Returns the setting keys that changed.
    pub fn refresh_tool_paths(
        &mut self,
        version_mismatch: bool,
        lookup: impl Fn(&str) -> Option<PathBuf>,
    ) -> Vec<&'static str> {
        use super::keys::{DVIPS_APP, DVISVGM_APP, LATEX_APP, PDFLATEX_APP};

        let export = &mut self.export;
        let slots = [
            (LATEX_APP, "latex", &mut export.latex_app),
            (PDFLATEX_APP, "pdflatex", &mut export.pdflatex_app),
            (DVIPS_APP, "dvips", &mut export.dvips_app),
            (DVISVGM_APP, "dvisvgm", &mut export.dvisvgm_app),
        ];

        let mut changed = Vec::new();
        for (key, program, slot) in slots {
            if !version_mismatch && !is_stale(slot) {
                continue;
            }
            let Some(path) = lookup(program) else {
                debug!("Could not find '{}' on PATH", program);
                continue;
            };
            if slot.as_ref() != Some(&path) {
                info!("Using {} for {}", path.display(), key);
                *slot = Some(path);
                changed.push(key);
            }
        }
        changed
    }
}
