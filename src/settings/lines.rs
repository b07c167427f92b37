//! Line splitting shared by every `key=value` flat file.

/// Classification of one line of a flat configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank line or `#` comment
    Blank,
    /// Non-blank line without a `=` separator
    Malformed,
    /// `key=value`, split on the first `=`; the key is trimmed
    Entry { key: &'a str, value: &'a str },
}

/// Splits `text` into numbered lines (1-based).
pub fn split(text: &str) -> impl Iterator<Item = (usize, Line<'_>)> {
    text.lines()
        .enumerate()
        .map(|(index, raw)| (index + 1, classify(raw)))
}

pub fn classify(raw: &str) -> Line<'_> {
    if raw.trim().is_empty() || raw.trim_start().starts_with('#') {
        return Line::Blank;
    }

    match raw.split_once('=') {
        Some((key, value)) => Line::Entry {
            key: key.trim(),
            value,
        },
        None => Line::Malformed,
    }
}
