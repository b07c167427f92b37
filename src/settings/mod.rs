//! Persistent editor settings.
//!
//! Settings are stored in a line-oriented `key=value` file (see [`keys`] for
//! the vocabulary). Loading is forgiving: each bad line is recorded in the
//! [`LoadReport`] and skipped. Saving always writes every key, so a saved
//! file loads back to the same [`Settings`].
//!
//! Values with a contract (window sizes, repeat counts, timeouts) can only
//! be changed through setters that reject out-of-range input with a
//! [`SettingsError`].

pub mod error;
pub mod keys;
pub mod lines;
pub mod mappings;
pub mod parser;
pub mod paths;
pub mod probe;
pub mod profile;
pub mod recent;
pub mod types;
pub mod values;
pub mod writer;

pub use error::{FormatError, FormatErrorKind, SettingsError, ValueError};
pub use mappings::CharMappings;
pub use parser::LoadReport;
pub use paths::ConfigDir;
pub use profile::Profile;
pub use recent::RecentFiles;
pub use types::{
    Angle, CapStyle, Color, DashPattern, FontSeries, FontShape, GridType, HAlign, InitSettings,
    JoinStyle, Length, Marker, MarkerKind, MarkerRole, MarkerStyle, PaperSize, PathOutline,
    StartDirType, Unit, VAlign, WindingRule,
};

use crate::actions::Tool;
use std::path::PathBuf;

/// Version written to and compared against the `version` key.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound for the recent files list.
pub const MAX_RECENT_LIMIT: u32 = 50;

/// Startup and file chooser behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralSettings {
    pub tool: Tool,
    pub start_dir_type: StartDirType,
    pub start_dir: Option<PathBuf>,
    pub look_and_feel: String,
    max_recent: u32,
    pub antialias: bool,
    pub render_quality: bool,
}

impl GeneralSettings {
    pub fn max_recent(&self) -> u32 {
        self.max_recent
    }

    pub fn set_max_recent(&mut self, max_recent: u32) -> Result<(), SettingsError> {
        if max_recent > MAX_RECENT_LIMIT {
            return Err(SettingsError::out_of_range(
                "maximum recent files",
                max_recent,
                "0..=50",
            ));
        }
        self.max_recent = max_recent;
        Ok(())
    }
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Select,
            start_dir_type: StartDirType::Cwd,
            start_dir: None,
            look_and_feel: String::new(),
            max_recent: 10,
            antialias: true,
            render_quality: true,
        }
    }
}

/// Window and canvas chrome.
#[derive(Debug, Clone, PartialEq)]
pub struct UiSettings {
    pub show_grid: bool,
    pub grid_lock: bool,
    pub show_rulers: bool,
    pub show_tools: bool,
    pub show_status: bool,
    ruler_width: u32,
    window_width: u32,
    window_height: u32,
    pub window_x: i32,
    pub window_y: i32,
    zoom: f64,
}

impl UiSettings {
    pub fn ruler_width(&self) -> u32 {
        self.ruler_width
    }

    pub fn set_ruler_width(&mut self, width: u32) -> Result<(), SettingsError> {
        if width == 0 {
            return Err(SettingsError::out_of_range("ruler width", width, ">= 1"));
        }
        self.ruler_width = width;
        Ok(())
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn set_window_size(&mut self, width: u32, height: u32) -> Result<(), SettingsError> {
        if width == 0 || height == 0 {
            return Err(SettingsError::out_of_range(
                "window size",
                format!("{width}x{height}"),
                "both dimensions >= 1",
            ));
        }
        self.window_width = width;
        self.window_height = height;
        Ok(())
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), SettingsError> {
        if !(zoom.is_finite() && zoom >= 0.0) {
            return Err(SettingsError::out_of_range("zoom", zoom, ">= 0"));
        }
        self.zoom = zoom;
        Ok(())
    }
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_grid: false,
            grid_lock: false,
            show_rulers: true,
            show_tools: true,
            show_status: true,
            ruler_width: 20,
            window_width: 800,
            window_height: 600,
            window_x: 0,
            window_y: 0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperSettings {
    pub size: PaperSize,
    pub portrait: bool,
    /// Only used with [`PaperSize::User`]
    pub width: Length,
    pub height: Length,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            size: PaperSize::A4,
            portrait: true,
            width: Length::new(210.0, Unit::Mm),
            height: Length::new(297.0, Unit::Mm),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    pub kind: GridType,
    pub unit: Unit,
    /// Distance between major divisions, in `unit`
    pub major: f64,
    pub subdivisions: u32,
    spokes: u32,
    /// Outline for [`GridType::Path`] grids
    pub path: Option<PathOutline>,
}

impl GridSettings {
    pub fn spokes(&self) -> u32 {
        self.spokes
    }

    pub fn set_spokes(&mut self, spokes: u32) -> Result<(), SettingsError> {
        if spokes == 0 {
            return Err(SettingsError::out_of_range("grid spokes", spokes, ">= 1"));
        }
        self.spokes = spokes;
        Ok(())
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            kind: GridType::Rectangular,
            unit: Unit::Bp,
            major: 100.0,
            subdivisions: 10,
            spokes: 8,
            path: None,
        }
    }
}

/// Stroke and fill applied to new shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeSettings {
    pen_width: Length,
    pub cap: CapStyle,
    pub join: JoinStyle,
    mitre_limit: f64,
    pub winding: WindingRule,
    pub dash: Option<DashPattern>,
    pub line_paint: Color,
    /// `None` leaves shapes unfilled
    pub fill_paint: Option<Color>,
    markers: [Marker; 3],
}

impl StrokeSettings {
    pub fn pen_width(&self) -> Length {
        self.pen_width
    }

    pub fn set_pen_width(&mut self, width: Length) -> Result<(), SettingsError> {
        if !(width.value.is_finite() && width.value >= 0.0) {
            return Err(SettingsError::out_of_range("pen width", width, ">= 0"));
        }
        self.pen_width = width;
        Ok(())
    }

    pub fn mitre_limit(&self) -> f64 {
        self.mitre_limit
    }

    pub fn set_mitre_limit(&mut self, limit: f64) -> Result<(), SettingsError> {
        if !(limit.is_finite() && limit >= 1.0) {
            return Err(SettingsError::out_of_range("mitre limit", limit, ">= 1"));
        }
        self.mitre_limit = limit;
        Ok(())
    }

    pub fn marker(&self, role: MarkerRole) -> &Marker {
        &self.markers[role.index()]
    }

    pub fn marker_mut(&mut self, role: MarkerRole) -> &mut Marker {
        &mut self.markers[role.index()]
    }

    pub fn set_marker_repeat(
        &mut self,
        role: MarkerRole,
        secondary: bool,
        repeat: u32,
    ) -> Result<(), SettingsError> {
        let marker = self.marker_mut(role);
        let style = if secondary {
            marker.secondary.as_mut().ok_or_else(|| {
                SettingsError::out_of_range("secondary marker", role.prefix(), "a composite marker")
            })?
        } else {
            &mut marker.primary
        };
        style.set_repeat(repeat)
    }
}

impl Default for StrokeSettings {
    fn default() -> Self {
        Self {
            pen_width: Length::bp(1.0),
            cap: CapStyle::Butt,
            join: JoinStyle::Miter,
            mitre_limit: 10.0,
            winding: WindingRule::NonZero,
            dash: None,
            line_paint: types::BLACK,
            fill_paint: None,
            markers: Default::default(),
        }
    }
}

/// Text attributes for new text areas and their LaTeX equivalents.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSettings {
    pub font_family: String,
    font_size: u32,
    pub shape: FontShape,
    pub series: FontSeries,
    pub paint: Color,
    pub halign: HAlign,
    pub valign: VAlign,
    pub latex_family: String,
    pub latex_size: String,
    pub latex_shape: String,
    pub latex_series: String,
}

impl TextSettings {
    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<(), SettingsError> {
        if size == 0 {
            return Err(SettingsError::out_of_range("font size", size, ">= 1"));
        }
        self.font_size = size;
        Ok(())
    }
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_family: "SansSerif".to_string(),
            font_size: 10,
            shape: FontShape::Upright,
            series: FontSeries::Medium,
            paint: types::BLACK,
            halign: HAlign::Left,
            valign: VAlign::Base,
            latex_family: "\\sffamily".to_string(),
            latex_size: "\\normalsize".to_string(),
            latex_shape: "\\upshape".to_string(),
            latex_series: "\\mdseries".to_string(),
        }
    }
}

/// External TeX tools used for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub latex_app: Option<PathBuf>,
    pub pdflatex_app: Option<PathBuf>,
    pub dvips_app: Option<PathBuf>,
    pub dvisvgm_app: Option<PathBuf>,
    max_process_time: u64,
    pub doc_class: String,
    normal_size: u32,
}

impl ExportSettings {
    /// Timeout for helper processes in milliseconds.
    pub fn max_process_time(&self) -> u64 {
        self.max_process_time
    }

    pub fn set_max_process_time(&mut self, millis: u64) -> Result<(), SettingsError> {
        if millis == 0 {
            return Err(SettingsError::out_of_range(
                "maximum process time",
                millis,
                ">= 1 ms",
            ));
        }
        self.max_process_time = millis;
        Ok(())
    }

    pub fn normal_size(&self) -> u32 {
        self.normal_size
    }

    pub fn set_normal_size(&mut self, size: u32) -> Result<(), SettingsError> {
        if size == 0 {
            return Err(SettingsError::out_of_range("normal font size", size, ">= 1"));
        }
        self.normal_size = size;
        Ok(())
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            latex_app: None,
            pdflatex_app: None,
            dvips_app: None,
            dvisvgm_app: None,
            max_process_time: 300_000,
            doc_class: "article".to_string(),
            normal_size: 10,
        }
    }
}

/// Every persisted editor setting.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub init: InitSettings,
    pub general: GeneralSettings,
    pub ui: UiSettings,
    pub paper: PaperSettings,
    pub grid: GridSettings,
    pub stroke: StrokeSettings,
    pub text: TextSettings,
    pub rotate_increment: Angle,
    pub export: ExportSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            init: InitSettings::LastUsed,
            general: GeneralSettings::default(),
            ui: UiSettings::default(),
            paper: PaperSettings::default(),
            grid: GridSettings::default(),
            stroke: StrokeSettings::default(),
            text: TextSettings::default(),
            rotate_increment: Angle::degrees(15.0),
            export: ExportSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_reject_out_of_contract_values() {
        let mut settings = Settings::default();

        assert!(settings.ui.set_ruler_width(0).is_err());
        assert!(settings.ui.set_window_size(0, 480).is_err());
        assert!(settings.ui.set_zoom(-1.0).is_err());
        assert!(settings.general.set_max_recent(51).is_err());
        assert!(settings.stroke.set_mitre_limit(0.5).is_err());
        assert!(settings.stroke.set_mitre_limit(f64::NAN).is_err());
        assert!(settings.stroke.set_pen_width(Length::bp(-1.0)).is_err());
        assert!(settings.export.set_max_process_time(0).is_err());
        assert!(settings.text.set_font_size(0).is_err());
        assert!(settings.grid.set_spokes(0).is_err());

        // Rejected values are never stored.
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn setters_store_valid_values() {
        let mut settings = Settings::default();
        settings.ui.set_window_size(1024, 768).unwrap();
        settings.general.set_max_recent(50).unwrap();
        settings.stroke.set_mitre_limit(1.0).unwrap();
        assert_eq!(settings.ui.window_size(), (1024, 768));
        assert_eq!(settings.general.max_recent(), 50);
        assert_eq!(settings.stroke.mitre_limit(), 1.0);
    }

    #[test]
    fn secondary_repeat_needs_a_composite_marker() {
        let mut stroke = StrokeSettings::default();
        assert!(stroke.set_marker_repeat(MarkerRole::End, true, 2).is_err());

        stroke.marker_mut(MarkerRole::End).secondary = Some(MarkerStyle::new(MarkerKind::Bar));
        stroke.set_marker_repeat(MarkerRole::End, true, 2).unwrap();
        assert_eq!(
            stroke
                .marker(MarkerRole::End)
                .secondary
                .as_ref()
                .map(MarkerStyle::repeat),
            Some(2)
        );
        assert!(stroke.set_marker_repeat(MarkerRole::Start, false, 11).is_err());
    }
}
