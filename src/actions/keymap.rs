//! Accelerator bindings for actions.
//!
//! Bindings live in their own flat file next to the main settings file:
//!
//! ```text
//! # action=binding
//! edit.copy=Ctrl+C
//! edit.select_all=Ctrl+A
//! view.zoom_in=Ctrl+Shift++
//! file.print=none
//! ```
//!
//! Malformed lines are collected as [`FormatError`]s and skipped.

use crate::settings::error::{FormatError, FormatErrorKind, ValueError};
use crate::settings::lines::{self, Line};
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Value used in the bindings file for an action without accelerator.
pub const UNBOUND: &str = "none";

/// A single keybinding: a key with optional modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a binding such as `Ctrl+Shift+W`, `Escape` or `Ctrl++`.
    ///
    /// Modifiers may appear in any order and spaces around `+` are ignored.
    /// Single letters are stored upper-case so `ctrl+w` and `Ctrl+W` are the
    /// same binding.
    pub fn parse(s: &str) -> Result<Self, ValueError> {
        let s = s.trim();
        let invalid = || ValueError::InvalidKeyBinding(s.to_string());

        if s.is_empty() {
            return Err(invalid());
        }

        // A trailing "++" means the key itself is '+'.
        let (modifiers, key) = if s == "+" {
            ("", "+")
        } else if let Some(rest) = s.strip_suffix("++") {
            (rest, "+")
        } else {
            match s.rsplit_once('+') {
                Some((modifiers, key)) => (modifiers, key.trim()),
                None => ("", s),
            }
        };

        if key.is_empty() {
            return Err(invalid());
        }

        let mut binding = Self {
            key: normalize_key(key),
            ctrl: false,
            shift: false,
            alt: false,
        };

        for part in modifiers.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => binding.ctrl = true,
                "shift" => binding.shift = true,
                "alt" => binding.alt = true,
                _ => return Err(invalid()),
            }
        }

        Ok(binding)
    }

    /// Check if this keybinding matches a key press.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
        _ => key.to_string(),
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        f.write_str(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct KeymapEntry {
    action: String,
    binding: Option<KeyBinding>,
    line: usize,
}

/// Ordered action→binding table as read from (or written to) the bindings
/// file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keymap {
    entries: Vec<KeymapEntry>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `action`, replacing any earlier binding for it.
    ///
    /// Fails if the chord is already used by a different action.
    pub fn bind(
        &mut self,
        action: impl Into<String>,
        binding: Option<KeyBinding>,
    ) -> Result<(), FormatErrorKind> {
        self.bind_at(action.into(), binding, 0)
    }

    fn bind_at(
        &mut self,
        action: String,
        binding: Option<KeyBinding>,
        line: usize,
    ) -> Result<(), FormatErrorKind> {
        if let Some(chord) = &binding {
            if let Some(other) = self
                .entries
                .iter()
                .find(|e| e.action != action && e.binding.as_ref() == Some(chord))
            {
                return Err(FormatErrorKind::DuplicateBinding {
                    binding: chord.to_string(),
                    existing: other.action.clone(),
                });
            }
        }

        match self.entries.iter_mut().find(|e| e.action == action) {
            Some(entry) => {
                entry.binding = binding;
                entry.line = line;
            }
            None => self.entries.push(KeymapEntry {
                action,
                binding,
                line,
            }),
        }
        Ok(())
    }

    /// Parses the bindings file format, collecting errors for bad lines.
    pub fn parse(text: &str) -> (Self, Vec<FormatError>) {
        let mut keymap = Self::new();
        let mut errors = Vec::new();

        for (line_no, line) in lines::split(text) {
            let (action, value) = match line {
                Line::Blank => continue,
                Line::Malformed => {
                    errors.push(FormatError::new(line_no, FormatErrorKind::MissingSeparator));
                    continue;
                }
                Line::Entry { key, value } => (key, value),
            };

            let binding = if value.trim().eq_ignore_ascii_case(UNBOUND) {
                None
            } else {
                match KeyBinding::parse(value) {
                    Ok(binding) => Some(binding),
                    Err(err) => {
                        debug!("Skipping binding on line {}: {}", line_no, err);
                        errors.push(FormatError::invalid_value(line_no, action, err));
                        continue;
                    }
                }
            };

            if let Err(kind) = keymap.bind_at(action.to_string(), binding, line_no) {
                errors.push(FormatError::new(line_no, kind));
            }
        }

        (keymap, errors)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binding for `action`: `None` if the action is not listed,
    /// `Some(None)` if it is explicitly unbound.
    pub fn get(&self, action: &str) -> Option<Option<&KeyBinding>> {
        self.entries
            .iter()
            .find(|e| e.action == action)
            .map(|e| e.binding.as_ref())
    }

    /// Entries in file order as `(action, binding, line)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&KeyBinding>, usize)> {
        self.entries
            .iter()
            .map(|e| (e.action.as_str(), e.binding.as_ref(), e.line))
    }

    /// Lookup table from chord to action name.
    pub fn chord_map(&self) -> HashMap<&KeyBinding, &str> {
        self.entries
            .iter()
            .filter_map(|e| e.binding.as_ref().map(|b| (b, e.action.as_str())))
            .collect()
    }

    pub fn to_config_string(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let value = entry
                .binding
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| UNBOUND.to_string());
            out.push_str(&entry.action);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        out
    }

    /// Reads a bindings file. Only an unreadable file is an error; bad lines
    /// are returned alongside the keymap.
    pub fn load_file(path: &Path) -> Result<(Self, Vec<FormatError>)> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key bindings from {}", path.display()))?;
        let (keymap, errors) = Self::parse(&text);
        info!(
            "Loaded {} key bindings from {} ({} errors)",
            keymap.len(),
            path.display(),
            errors.len()
        );
        Ok((keymap, errors))
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(path, self.to_config_string())
            .with_context(|| format!("Failed to write key bindings to {}", path.display()))?;
        info!("Saved key bindings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_key() {
        let binding = KeyBinding::parse("Escape").unwrap();
        assert_eq!(binding.key, "Escape");
        assert!(!binding.ctrl && !binding.shift && !binding.alt);
    }

    #[test]
    fn parse_modifiers_in_any_order() {
        let a = KeyBinding::parse("Ctrl+Shift+W").unwrap();
        let b = KeyBinding::parse("shift + ctrl + w").unwrap();
        assert_eq!(a, b);
        assert!(a.ctrl && a.shift && !a.alt);
        assert_eq!(a.key, "W");
    }

    #[test]
    fn parse_plus_key() {
        let binding = KeyBinding::parse("Ctrl+Shift++").unwrap();
        assert_eq!(binding.key, "+");
        assert!(binding.ctrl && binding.shift);
        assert_eq!(KeyBinding::parse("+").unwrap().key, "+");
    }

    #[test]
    fn parse_rejects_unknown_modifier_and_missing_key() {
        assert!(KeyBinding::parse("Hyper+K").is_err());
        assert!(KeyBinding::parse("Ctrl+").is_err());
        assert!(KeyBinding::parse("   ").is_err());
    }

    #[test]
    fn display_is_parseable() {
        for text in ["Ctrl+Shift+Alt+A", "F10", "Ctrl++", "Shift+Delete"] {
            let binding = KeyBinding::parse(text).unwrap();
            assert_eq!(KeyBinding::parse(&binding.to_string()).unwrap(), binding);
        }
    }

    #[test]
    fn matches_is_case_insensitive() {
        let binding = KeyBinding::parse("Ctrl+Z").unwrap();
        assert!(binding.matches("z", true, false, false));
        assert!(!binding.matches("Z", false, false, false));
    }

    #[test]
    fn keymap_collects_errors_and_continues() {
        let text = "\
# accelerators
edit.copy=Ctrl+C
edit.paste=Hyper+V
garbage
edit.cut=Ctrl+X
edit.undo=ctrl+c
file.print=none
";
        let (keymap, errors) = Keymap::parse(text);

        assert_eq!(keymap.len(), 3);
        assert_eq!(keymap.get("file.print"), Some(None));
        assert_eq!(
            keymap.get("edit.cut").flatten().map(ToString::to_string),
            Some("Ctrl+X".to_string())
        );

        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 6]);
        assert!(matches!(
            &errors[2].kind,
            FormatErrorKind::DuplicateBinding { existing, .. } if existing == "edit.copy"
        ));
    }

    #[test]
    fn rebinding_same_action_is_not_a_duplicate() {
        let mut keymap = Keymap::new();
        let chord = KeyBinding::parse("Ctrl+S").unwrap();
        keymap.bind("file.save", Some(chord.clone())).unwrap();
        keymap.bind("file.save", Some(chord)).unwrap();
        assert_eq!(keymap.len(), 1);
    }

    #[test]
    fn config_string_reparses_identically() {
        let (keymap, errors) = Keymap::parse("a=Ctrl+A\nb=none\nc=Shift+F3\n");
        assert!(errors.is_empty());
        let (again, errors) = Keymap::parse(&keymap.to_config_string());
        assert!(errors.is_empty());
        assert_eq!(
            again.iter().map(|(a, b, _)| (a, b.cloned())).collect::<Vec<_>>(),
            keymap.iter().map(|(a, b, _)| (a, b.cloned())).collect::<Vec<_>>()
        );
    }
}
