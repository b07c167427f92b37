//! Settings value types.

use super::error::SettingsError;
use std::fmt;

/// Declares a fieldless settings enum stored in the file either by numeric
/// id or by name.
macro_rules! settings_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $id:literal => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $id),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn id(self) -> u32 {
                self as u32
            }

            pub fn from_id(id: u32) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.id() == id)
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                Self::ALL.iter().copied().find(|v| v.name() == name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

settings_enum! {
    /// What to do with the stored settings at startup.
    pub enum InitSettings {
        /// Ignore the rest of the file and use built-in defaults
        Default = 0 => "default",
        /// Restore the settings in use when the editor last closed
        LastUsed = 1 => "last-used",
        /// Restore the user's explicitly saved settings
        User = 2 => "user",
    }
}

settings_enum! {
    /// Initial directory for the file chooser.
    pub enum StartDirType {
        Cwd = 0 => "cwd",
        Last = 1 => "last",
        Named = 2 => "named",
    }
}

settings_enum! {
    pub enum CapStyle {
        Butt = 0 => "butt",
        Round = 1 => "round",
        Square = 2 => "square",
    }
}

settings_enum! {
    pub enum JoinStyle {
        Miter = 0 => "miter",
        Round = 1 => "round",
        Bevel = 2 => "bevel",
    }
}

settings_enum! {
    pub enum WindingRule {
        EvenOdd = 0 => "even-odd",
        NonZero = 1 => "non-zero",
    }
}

settings_enum! {
    /// Line-end marker shapes.
    pub enum MarkerKind {
        None = 0 => "none",
        Pointed = 1 => "pointed",
        Triangle = 2 => "triangle",
        Circle = 3 => "circle",
        Diamond = 4 => "diamond",
        Square = 5 => "square",
        Bar = 6 => "bar",
        Single = 7 => "single",
        Round = 8 => "round",
        Star = 9 => "star",
        Scissors = 10 => "scissors",
    }
}

settings_enum! {
    pub enum GridType {
        Rectangular = 0 => "rectangular",
        Radial = 1 => "radial",
        Iso = 2 => "iso",
        Tschichold = 3 => "tschichold",
        Path = 4 => "path",
    }
}

settings_enum! {
    pub enum PaperSize {
        A0 = 0 => "a0",
        A1 = 1 => "a1",
        A2 = 2 => "a2",
        A3 = 3 => "a3",
        A4 = 4 => "a4",
        A5 = 5 => "a5",
        B5 = 6 => "b5",
        Letter = 7 => "letter",
        Legal = 8 => "legal",
        Executive = 9 => "executive",
        /// Dimensions taken from `paperwidth`/`paperheight`
        User = 10 => "user",
    }
}

settings_enum! {
    pub enum FontShape {
        Upright = 0 => "upright",
        Italic = 1 => "italic",
    }
}

settings_enum! {
    pub enum FontSeries {
        Medium = 0 => "medium",
        Bold = 1 => "bold",
    }
}

settings_enum! {
    pub enum HAlign {
        Left = 0 => "left",
        Centre = 1 => "centre",
        Right = 2 => "right",
    }
}

settings_enum! {
    pub enum VAlign {
        Top = 0 => "top",
        Centre = 1 => "centre",
        Base = 2 => "base",
        Bottom = 3 => "bottom",
    }
}

settings_enum! {
    /// TeX length units.
    pub enum Unit {
        Bp = 0 => "bp",
        Pt = 1 => "pt",
        In = 2 => "in",
        Cm = 3 => "cm",
        Mm = 4 => "mm",
        Pc = 5 => "pc",
        Dd = 6 => "dd",
        Cc = 7 => "cc",
    }
}

impl Unit {
    /// Size of one unit in PostScript points.
    pub fn in_bp(self) -> f64 {
        match self {
            Unit::Bp => 1.0,
            Unit::Pt => 72.0 / 72.27,
            Unit::In => 72.0,
            Unit::Cm => 72.0 / 2.54,
            Unit::Mm => 72.0 / 25.4,
            Unit::Pc => 12.0 * 72.0 / 72.27,
            Unit::Dd => 1238.0 / 1157.0 * 72.0 / 72.27,
            Unit::Cc => 12.0 * 1238.0 / 1157.0 * 72.0 / 72.27,
        }
    }
}

/// RGBA color with 8-bit components.
///
/// Stored in the settings file as a packed 24-bit RGB integer optionally
/// followed by an alpha value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0 = fully transparent, 255 = opaque
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from the low 24 bits of `packed`.
    pub fn from_packed(packed: u32, alpha: u8) -> Self {
        Self {
            r: (packed >> 16 & 0xFF) as u8,
            g: (packed >> 8 & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
            a: alpha,
        }
    }

    pub fn packed_rgb(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }
}

pub const RED: Color = Color::rgb(255, 0, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);
pub const YELLOW: Color = Color::rgb(255, 255, 0);
pub const BLACK: Color = Color::rgb(0, 0, 0);

/// A length with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn bp(value: f64) -> Self {
        Self::new(value, Unit::Bp)
    }

    pub fn to_bp(self) -> f64 {
        self.value * self.unit.in_bp()
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

impl AngleUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            AngleUnit::Radians => "rad",
            AngleUnit::Degrees => "deg",
        }
    }
}

/// An angle, remembering the unit it was given in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    pub value: f64,
    pub unit: AngleUnit,
}

impl Angle {
    pub const fn radians(value: f64) -> Self {
        Self {
            value,
            unit: AngleUnit::Radians,
        }
    }

    pub const fn degrees(value: f64) -> Self {
        Self {
            value,
            unit: AngleUnit::Degrees,
        }
    }

    pub fn to_radians(self) -> f64 {
        match self.unit {
            AngleUnit::Radians => self.value,
            AngleUnit::Degrees => self.value.to_radians(),
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

/// Dash lengths (in bp), alternating on and off. Never empty; "no dash" is
/// represented as `Option::None` by the owner.
#[derive(Debug, Clone, PartialEq)]
pub struct DashPattern {
    pub dashes: Vec<f64>,
}

/// One segment of a path outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadTo(f64, f64, f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Close,
}

impl PathSegment {
    /// Segment type id used in the settings file.
    pub fn id(&self) -> u32 {
        match self {
            PathSegment::MoveTo(..) => 0,
            PathSegment::LineTo(..) => 1,
            PathSegment::QuadTo(..) => 2,
            PathSegment::CubicTo(..) => 3,
            PathSegment::Close => 4,
        }
    }

    pub fn coords(&self) -> Vec<f64> {
        match *self {
            PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y) => vec![x, y],
            PathSegment::QuadTo(x1, y1, x, y) => vec![x1, y1, x, y],
            PathSegment::CubicTo(x1, y1, x2, y2, x, y) => vec![x1, y1, x2, y2, x, y],
            PathSegment::Close => Vec::new(),
        }
    }
}

/// Outline used by path grids.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutline {
    pub winding: WindingRule,
    pub segments: Vec<PathSegment>,
}

/// Which end of a line a marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    Start,
    Mid,
    End,
}

impl MarkerRole {
    pub const ALL: [MarkerRole; 3] = [MarkerRole::Start, MarkerRole::Mid, MarkerRole::End];

    /// Key prefix in the settings file.
    pub fn prefix(self) -> &'static str {
        match self {
            MarkerRole::Start => "start",
            MarkerRole::Mid => "mid",
            MarkerRole::End => "end",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Largest supported marker repeat count.
pub const MAX_MARKER_REPEAT: u32 = 10;

/// Appearance of a single marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub kind: MarkerKind,
    pub size: f64,
    pub width: f64,
    /// How many times the marker is drawn (1..=10)
    pub(super) repeat: u32,
    pub reversed: bool,
    /// Rotate with the line direction
    pub auto_orient: bool,
    /// Fixed orientation when `auto_orient` is off
    pub angle: Angle,
    /// `None` follows the line paint
    pub paint: Option<Color>,
}

impl MarkerStyle {
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            kind,
            size: 5.0,
            width: 1.0,
            repeat: 1,
            reversed: false,
            auto_orient: true,
            angle: Angle::radians(0.0),
            paint: None,
        }
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn set_repeat(&mut self, repeat: u32) -> Result<(), SettingsError> {
        if !(1..=MAX_MARKER_REPEAT).contains(&repeat) {
            return Err(SettingsError::out_of_range(
                "marker repeat",
                repeat,
                "1..=10",
            ));
        }
        self.repeat = repeat;
        Ok(())
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self::new(MarkerKind::None)
    }
}

/// Marker with an optional secondary marker layered on top.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Marker {
    pub primary: MarkerStyle,
    pub secondary: Option<MarkerStyle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_rgb_round_trips() {
        let color = Color::from_packed(0x12_34_56, 200);
        assert_eq!((color.r, color.g, color.b, color.a), (0x12, 0x34, 0x56, 200));
        assert_eq!(color.packed_rgb(), 0x12_34_56);
        assert_eq!(Color::from_packed(16711680, 255), RED);
    }

    #[test]
    fn enum_ids_and_names_resolve() {
        assert_eq!(CapStyle::from_id(1), Some(CapStyle::Round));
        assert_eq!(JoinStyle::from_id(2), Some(JoinStyle::Bevel));
        assert_eq!(WindingRule::from_id(1), Some(WindingRule::NonZero));
        assert_eq!(MarkerKind::from_id(11), None);
        assert_eq!(GridType::from_name("iso"), Some(GridType::Iso));
        assert_eq!(GridType::from_name("ISO"), None);
        assert_eq!(PaperSize::from_name("letter"), Some(PaperSize::Letter));
    }

    #[test]
    fn lengths_convert_to_bp() {
        assert_eq!(Length::new(1.0, Unit::In).to_bp(), 72.0);
        assert!((Length::new(72.27, Unit::Pt).to_bp() - 72.0).abs() < 1e-9);
        assert_eq!(Length::bp(2.5).to_string(), "2.5bp");
    }

    #[test]
    fn angles_convert_to_radians() {
        assert!((Angle::degrees(180.0).to_radians() - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(Angle::radians(0.5).to_string(), "0.5rad");
    }

    #[test]
    fn marker_repeat_is_bounded() {
        let mut style = MarkerStyle::new(MarkerKind::Triangle);
        assert!(style.set_repeat(0).is_err());
        assert!(style.set_repeat(11).is_err());
        assert_eq!(style.repeat(), 1);
        style.set_repeat(10).unwrap();
        assert_eq!(style.repeat(), 10);
    }
}
