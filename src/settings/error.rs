//! Error types for settings values, flat-file lines and setters.

use thiserror::Error;

/// A single value that failed its typed parser.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("expected 0 or 1, found '{0}'")]
    NotBoolean(String),

    #[error("'{0}' is not an integer")]
    NotInteger(String),

    #[error("'{0}' is not a number")]
    NotNumber(String),

    #[error("{value} is outside the range {}", describe_range(.min, .max))]
    OutOfRange { value: i64, min: i64, max: Option<i64> },

    #[error("{value} is less than the minimum {min}")]
    BelowMinimum { value: f64, min: f64 },

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("invalid angle '{0}'")]
    InvalidAngle(String),

    #[error("expected 'rgb' or 'rgb,alpha', found '{0}'")]
    InvalidColor(String),

    #[error("alpha {0} is outside the range 0..=255")]
    AlphaOutOfRange(i64),

    #[error("dash pattern declares {declared} values but supplies {found}")]
    DashCount { declared: usize, found: usize },

    #[error("unknown path segment type '{0}'")]
    UnknownSegment(String),

    #[error("path segment '{segment}' needs {expected} coordinates")]
    MissingCoordinates {
        segment: &'static str,
        expected: usize,
    },

    #[error("path has no winding rule")]
    EmptyPath,

    #[error("unknown value '{value}', expected one of: {expected}")]
    UnknownName { value: String, expected: String },

    #[error("invalid key binding '{0}'")]
    InvalidKeyBinding(String),

    #[error("invalid code point '{0}'")]
    InvalidCodePoint(String),
}

fn describe_range(min: &i64, max: &Option<i64>) -> String {
    match max {
        Some(max) => format!("{min}..={max}"),
        None => format!("{min}.."),
    }
}

/// What went wrong on a line of a flat configuration file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatErrorKind {
    #[error("missing '=' separator")]
    MissingSeparator,

    #[error("unknown setting '{0}'")]
    UnknownKey(String),

    #[error("invalid value for '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: ValueError,
    },

    #[error("'{key}' must follow a '{anchor}' line")]
    OrphanedDetail { key: String, anchor: String },

    #[error("key binding '{binding}' already assigned to '{existing}'")]
    DuplicateBinding { binding: String, existing: String },

    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// A recoverable error on one line of a flat configuration file.
///
/// Loaders collect these and carry on with the next line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {kind}")]
pub struct FormatError {
    /// 1-based line number
    pub line: usize,
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub fn new(line: usize, kind: FormatErrorKind) -> Self {
        Self { line, kind }
    }

    pub fn invalid_value(line: usize, key: &str, source: ValueError) -> Self {
        Self::new(
            line,
            FormatErrorKind::InvalidValue {
                key: key.to_string(),
                source,
            },
        )
    }
}

/// A setter was called with a value outside its contract.
///
/// Unlike [`FormatError`] this indicates a caller bug rather than bad input
/// data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("invalid {setting}: {value} (expected {expected})")]
    OutOfRange {
        setting: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl SettingsError {
    pub(crate) fn out_of_range(
        setting: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        Self::OutOfRange {
            setting,
            value: value.to_string(),
            expected,
        }
    }
}
