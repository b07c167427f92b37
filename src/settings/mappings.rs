//! Character mappings applied when text is exported to LaTeX.
//!
//! Text mode and math mode each have a table in its own file. Each line maps
//! a hexadecimal code point to its LaTeX replacement:
//!
//! ```text
//! 0024=\$
//! 03B1=\alpha
//! ```
//!
//! The replacement is taken verbatim, including trailing spaces.

use super::error::{FormatError, FormatErrorKind, ValueError};
use super::lines::{self, Line};
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMappings {
    map: BTreeMap<char, String>,
}

const TEXT_DEFAULTS: &[(char, &str)] = &[
    ('#', "\\#"),
    ('$', "\\$"),
    ('%', "\\%"),
    ('&', "\\&"),
    ('<', "\\textless "),
    ('>', "\\textgreater "),
    ('\\', "\\textbackslash "),
    ('^', "\\textasciicircum "),
    ('_', "\\_"),
    ('{', "\\{"),
    ('}', "\\}"),
    ('~', "\\textasciitilde "),
    ('£', "\\textsterling "),
    ('©', "\\textcopyright "),
    ('–', "--"),
    ('—', "---"),
];

const MATH_DEFAULTS: &[(char, &str)] = &[
    ('α', "\\alpha "),
    ('β', "\\beta "),
    ('γ', "\\gamma "),
    ('δ', "\\delta "),
    ('ε', "\\epsilon "),
    ('ζ', "\\zeta "),
    ('η', "\\eta "),
    ('θ', "\\theta "),
    ('ι', "\\iota "),
    ('κ', "\\kappa "),
    ('λ', "\\lambda "),
    ('μ', "\\mu "),
    ('ν', "\\nu "),
    ('ξ', "\\xi "),
    ('π', "\\pi "),
    ('ρ', "\\rho "),
    ('σ', "\\sigma "),
    ('τ', "\\tau "),
    ('υ', "\\upsilon "),
    ('φ', "\\phi "),
    ('χ', "\\chi "),
    ('ψ', "\\psi "),
    ('ω', "\\omega "),
    ('Γ', "\\Gamma "),
    ('Δ', "\\Delta "),
    ('Θ', "\\Theta "),
    ('Λ', "\\Lambda "),
    ('Ξ', "\\Xi "),
    ('Π', "\\Pi "),
    ('Σ', "\\Sigma "),
    ('Φ', "\\Phi "),
    ('Ψ', "\\Psi "),
    ('Ω', "\\Omega "),
    ('×', "\\times "),
    ('÷', "\\div "),
    ('±', "\\pm "),
    ('≤', "\\leq "),
    ('≥', "\\geq "),
    ('≠', "\\neq "),
    ('∞', "\\infty "),
];

fn parse_code_point(text: &str) -> Result<char, ValueError> {
    let invalid = || ValueError::InvalidCodePoint(text.to_string());
    let code = u32::from_str_radix(text, 16).map_err(|_| invalid())?;
    char::from_u32(code).ok_or_else(invalid)
}

impl CharMappings {
    fn from_pairs(pairs: &[(char, &str)]) -> Self {
        Self {
            map: pairs
                .iter()
                .map(|(c, replacement)| (*c, replacement.to_string()))
                .collect(),
        }
    }

    /// LaTeX special characters in text mode.
    pub fn text_defaults() -> Self {
        Self::from_pairs(TEXT_DEFAULTS)
    }

    /// Greek letters and common operators in math mode.
    pub fn math_defaults() -> Self {
        Self::from_pairs(MATH_DEFAULTS)
    }

    pub fn parse(text: &str) -> (Self, Vec<FormatError>) {
        let mut mappings = Self::default();
        let mut errors = Vec::new();

        for (line_no, line) in lines::split(text) {
            match line {
                Line::Blank => {}
                Line::Malformed => {
                    errors.push(FormatError::new(line_no, FormatErrorKind::MissingSeparator))
                }
                Line::Entry { key, value } => match parse_code_point(key) {
                    Ok(c) => {
                        mappings.insert(c, value);
                    }
                    Err(err) => {
                        debug!("Skipping mapping on line {}: {}", line_no, err);
                        errors.push(FormatError::invalid_value(line_no, key, err));
                    }
                },
            }
        }

        (mappings, errors)
    }

    pub fn insert(&mut self, c: char, replacement: impl Into<String>) -> Option<String> {
        self.map.insert(c, replacement.into())
    }

    pub fn remove(&mut self, c: char) -> Option<String> {
        self.map.remove(&c)
    }

    pub fn get(&self, c: char) -> Option<&str> {
        self.map.get(&c).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Replaces every mapped character in `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match self.map.get(&c) {
                Some(replacement) => out.push_str(replacement),
                None => out.push(c),
            }
        }
        out
    }

    pub fn to_config_string(&self) -> String {
        self.map
            .iter()
            .map(|(c, replacement)| format!("{:04X}={}\n", *c as u32, replacement))
            .collect()
    }

    /// Loads a table, falling back to `defaults` when the file does not exist.
    pub fn load_file(path: &Path, defaults: Self) -> Result<(Self, Vec<FormatError>)> {
        if !path.exists() {
            debug!("No mappings at {}, using defaults", path.display());
            return Ok((defaults, Vec::new()));
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mappings from {}", path.display()))?;
        let (mappings, errors) = Self::parse(&text);
        info!(
            "Loaded {} mappings from {} ({} errors)",
            mappings.len(),
            path.display(),
            errors.len()
        );
        Ok((mappings, errors))
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        fs::write(path, self.to_config_string())
            .with_context(|| format!("Failed to write mappings to {}", path.display()))?;
        info!("Saved mappings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mode_escapes_specials() {
        let mappings = CharMappings::text_defaults();
        assert_eq!(mappings.apply("50% & $5"), "50\\% \\& \\$5");
        assert_eq!(mappings.apply("a_b"), "a\\_b");
    }

    #[test]
    fn math_mode_maps_greek() {
        let mappings = CharMappings::math_defaults();
        assert_eq!(mappings.apply("α+β"), "\\alpha +\\beta ");
        assert_eq!(mappings.get('x'), None);
    }

    #[test]
    fn parse_keeps_replacement_verbatim() {
        let (mappings, errors) = CharMappings::parse("# greek\n03b1=\\alpha \n0024=\\$\n");
        assert!(errors.is_empty());
        assert_eq!(mappings.get('α'), Some("\\alpha "));
        assert_eq!(mappings.get('$'), Some("\\$"));
    }

    #[test]
    fn bad_code_points_are_collected() {
        let (mappings, errors) = CharMappings::parse("zz=1\nD800=x\nnoseparator\n41=A");
        assert_eq!(mappings.len(), 1);
        let lines: Vec<_> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert!(matches!(
            &errors[1].kind,
            FormatErrorKind::InvalidValue {
                source: ValueError::InvalidCodePoint(_),
                ..
            }
        ));
    }

    #[test]
    fn defaults_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mathmappings.conf");

        let (loaded, _) = CharMappings::load_file(&path, CharMappings::math_defaults()).unwrap();
        assert_eq!(loaded, CharMappings::math_defaults());

        let mut custom = CharMappings::text_defaults();
        custom.insert('€', "\\euro ");
        custom.save_file(&path).unwrap();

        let (loaded, errors) = CharMappings::load_file(&path, CharMappings::default()).unwrap();
        assert!(errors.is_empty());
        assert_eq!(loaded, custom);
    }
}
