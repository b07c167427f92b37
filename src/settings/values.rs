//! Typed parsers and formatters for settings values.
//!
//! Parsers trim surrounding whitespace and reject anything outside the
//! documented grammar with a [`ValueError`]. Every formatter produces text
//! its parser accepts.

use super::error::ValueError;
use super::types::{
    Angle, AngleUnit, Color, DashPattern, Length, PathOutline, PathSegment, Unit, WindingRule,
};

pub fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(ValueError::NotBoolean(other.to_string())),
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

pub fn parse_int(value: &str) -> Result<i64, ValueError> {
    let value = value.trim();
    value
        .parse::<i64>()
        .map_err(|_| ValueError::NotInteger(value.to_string()))
}

/// Integer with an inclusive lower bound and optional inclusive upper bound.
pub fn parse_int_range(value: &str, min: i64, max: Option<i64>) -> Result<i64, ValueError> {
    let parsed = parse_int(value)?;
    if parsed < min || max.is_some_and(|max| parsed > max) {
        return Err(ValueError::OutOfRange {
            value: parsed,
            min,
            max,
        });
    }
    Ok(parsed)
}

/// Integer in `0..=2`.
pub fn parse_tristate(value: &str) -> Result<u32, ValueError> {
    parse_int_range(value, 0, Some(2)).map(|v| v as u32)
}

pub fn parse_u32_min(value: &str, min: u32) -> Result<u32, ValueError> {
    parse_int_range(value, min as i64, Some(u32::MAX as i64)).map(|v| v as u32)
}

/// Resolves a numeric id against a settings enum.
pub fn parse_choice<T: Copy>(
    value: &str,
    choices: &[T],
    id: impl Fn(T) -> u32,
) -> Result<T, ValueError> {
    let max = choices.iter().map(|c| id(*c)).max().unwrap_or(0) as i64;
    let parsed = parse_int_range(value, 0, Some(max))?;
    choices
        .iter()
        .copied()
        .find(|c| id(*c) as i64 == parsed)
        .ok_or(ValueError::OutOfRange {
            value: parsed,
            min: 0,
            max: Some(max),
        })
}

/// Resolves an enum by its exact, case-sensitive name.
pub fn parse_name<T: Copy>(
    value: &str,
    choices: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<T, ValueError> {
    let value = value.trim();
    choices
        .iter()
        .copied()
        .find(|c| name(*c) == value)
        .ok_or_else(|| ValueError::UnknownName {
            value: value.to_string(),
            expected: choices
                .iter()
                .map(|c| name(*c))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

pub fn parse_double(value: &str) -> Result<f64, ValueError> {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ValueError::NotNumber(value.to_string())),
    }
}

pub fn parse_double_min(value: &str, min: f64) -> Result<f64, ValueError> {
    let parsed = parse_double(value)?;
    if parsed < min {
        return Err(ValueError::BelowMinimum { value: parsed, min });
    }
    Ok(parsed)
}

pub fn parse_non_negative(value: &str) -> Result<f64, ValueError> {
    parse_double_min(value, 0.0)
}

/// Splits `12.5cm` into `("12.5", "cm")`.
fn split_unit(value: &str) -> (&str, &str) {
    let number = value.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    (number.trim_end(), &value[number.len()..])
}

/// Non-negative length: a plain number (bp) or a number followed by a unit.
pub fn parse_length(value: &str) -> Result<Length, ValueError> {
    let (number, unit) = split_unit(value.trim());
    let unit = if unit.is_empty() {
        Unit::Bp
    } else {
        Unit::from_name(unit).ok_or_else(|| ValueError::UnknownUnit(unit.to_string()))?
    };
    Ok(Length::new(parse_non_negative(number)?, unit))
}

/// Angle: a plain number (radians) or a number followed by `rad` or `deg`.
pub fn parse_angle(value: &str) -> Result<Angle, ValueError> {
    let value = value.trim();
    let invalid = || ValueError::InvalidAngle(value.to_string());
    let (number, unit) = split_unit(value);
    let unit = match unit {
        "" | "rad" => AngleUnit::Radians,
        "deg" => AngleUnit::Degrees,
        _ => return Err(invalid()),
    };
    let number = parse_double(number).map_err(|_| invalid())?;
    Ok(Angle {
        value: number,
        unit,
    })
}

/// `rgb` or `rgb,alpha`; only the low 24 bits of `rgb` are used.
pub fn parse_color(value: &str) -> Result<Color, ValueError> {
    let value = value.trim();
    let invalid = || ValueError::InvalidColor(value.to_string());
    let mut parts = value.split(',');

    let rgb = parts.next().ok_or_else(invalid)?;
    let rgb = rgb.trim().parse::<i64>().map_err(|_| invalid())?;

    let alpha = match parts.next() {
        Some(alpha) => {
            let alpha = alpha.trim().parse::<i64>().map_err(|_| invalid())?;
            u8::try_from(alpha).map_err(|_| ValueError::AlphaOutOfRange(alpha))?
        }
        None => 255,
    };

    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(Color::from_packed((rgb & 0xFF_FF_FF) as u32, alpha))
}

pub fn format_color(color: Color) -> String {
    if color.is_opaque() {
        color.packed_rgb().to_string()
    } else {
        format!("{},{}", color.packed_rgb(), color.a)
    }
}

/// Color, or `None` when the value is the keyword `none_word`.
pub fn parse_optional_color(value: &str, none_word: &str) -> Result<Option<Color>, ValueError> {
    if value.trim() == none_word {
        Ok(None)
    } else {
        parse_color(value).map(Some)
    }
}

pub fn format_optional_color(color: Option<Color>, none_word: &str) -> String {
    color
        .map(format_color)
        .unwrap_or_else(|| none_word.to_string())
}

/// `count,d0,...,d(count-1)`; a count of zero means no dash pattern.
pub fn parse_dash(value: &str) -> Result<Option<DashPattern>, ValueError> {
    let mut tokens = value.split(',').map(str::trim);
    let declared = tokens.next().unwrap_or_default();
    let declared = parse_int_range(declared, 0, None)? as usize;

    let dashes = tokens
        .map(parse_non_negative)
        .collect::<Result<Vec<_>, _>>()?;

    if dashes.len() != declared {
        return Err(ValueError::DashCount {
            declared,
            found: dashes.len(),
        });
    }

    Ok((declared > 0).then_some(DashPattern { dashes }))
}

pub fn format_dash(dash: Option<&DashPattern>) -> String {
    match dash {
        None => "0".to_string(),
        Some(pattern) => {
            let mut out = pattern.dashes.len().to_string();
            for dash in &pattern.dashes {
                out.push(',');
                out.push_str(&dash.to_string());
            }
            out
        }
    }
}

/// Winding rule followed by `(segment type, coordinates...)` groups, all
/// space separated.
pub fn parse_path(value: &str) -> Result<PathOutline, ValueError> {
    let mut tokens = value.split_whitespace();
    let winding = tokens.next().ok_or(ValueError::EmptyPath)?;
    let winding = parse_choice(winding, WindingRule::ALL, WindingRule::id)?;

    let mut segments = Vec::new();
    while let Some(kind) = tokens.next() {
        let (name, expected) = match kind {
            "0" => ("moveto", 2),
            "1" => ("lineto", 2),
            "2" => ("quadto", 4),
            "3" => ("cubicto", 6),
            "4" => ("close", 0),
            other => return Err(ValueError::UnknownSegment(other.to_string())),
        };

        let mut coords = [0.0; 6];
        for slot in coords.iter_mut().take(expected) {
            let token = tokens.next().ok_or(ValueError::MissingCoordinates {
                segment: name,
                expected,
            })?;
            *slot = parse_double(token)?;
        }

        let [a, b, c, d, e, f] = coords;
        segments.push(match expected {
            0 => PathSegment::Close,
            4 => PathSegment::QuadTo(a, b, c, d),
            6 => PathSegment::CubicTo(a, b, c, d, e, f),
            _ if kind == "0" => PathSegment::MoveTo(a, b),
            _ => PathSegment::LineTo(a, b),
        });
    }

    Ok(PathOutline { winding, segments })
}

pub fn format_path(path: &PathOutline) -> String {
    let mut out = path.winding.id().to_string();
    for segment in &path.segments {
        out.push(' ');
        out.push_str(&segment.id().to_string());
        for coord in segment.coords() {
            out.push(' ');
            out.push_str(&coord.to_string());
        }
    }
    out
}
