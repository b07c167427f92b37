//! Settings file loader.

use super::error::{FormatError, FormatErrorKind, ValueError};
use super::keys::{self, MarkerField, MarkerKey};
use super::lines::{self, Line};
use super::types::{
    CapStyle, FontSeries, FontShape, GridType, HAlign, InitSettings, JoinStyle, MAX_MARKER_REPEAT,
    MarkerKind, MarkerStyle, PaperSize, StartDirType, Unit, VAlign, WindingRule,
};
use super::values::{
    parse_angle, parse_bool, parse_choice, parse_color, parse_dash, parse_double_min,
    parse_int_range, parse_length, parse_name, parse_non_negative, parse_optional_color,
    parse_path, parse_u32_min,
};
use super::{APP_VERSION, MAX_RECENT_LIMIT, Settings};
use crate::actions::Tool;
use crate::messages::MessageSink;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of loading a settings file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// The file was written by a different version, or has no `version` line
    pub version_mismatch: bool,
    pub stored_version: Option<String>,
    /// Lines that were skipped, in file order
    pub errors: Vec<FormatError>,
    /// Number of lines whose value was applied
    pub applied: usize,
    /// Line of an `initsettings=0` entry that ended parsing early
    pub stopped_at: Option<usize>,
}

impl LoadReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// All format errors as one message, or `None` when the file was clean.
    pub fn diagnostic(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let mut text = format!(
            "{} problem{} found in settings:",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" }
        );
        for error in &self.errors {
            text.push('\n');
            text.push_str(&error.to_string());
        }
        Some(text)
    }

    /// Shows the diagnostic to the user, but only in debug mode.
    pub fn surface(&self, debug: bool, sink: &mut dyn MessageSink) {
        if !debug {
            return;
        }
        if let Some(text) = self.diagnostic() {
            sink.warning(&text);
        }
    }
}

/// Secondary marker under construction for one role.
#[derive(Debug, Clone, PartialEq)]
enum CompositeSlot {
    /// No `secondary<role>arrow` line seen yet
    Untouched,
    /// `secondary<role>arrow=0`
    Cleared,
    Building(MarkerStyle),
}

enum Outcome {
    Applied,
    Stop,
}

/// State carried across the lines of one load.
struct Loader<'a> {
    settings: &'a mut Settings,
    running_version: &'a str,
    report: LoadReport,
    composites: [CompositeSlot; 3],
}

impl<'a> Loader<'a> {
    fn new(settings: &'a mut Settings, running_version: &'a str) -> Self {
        Self {
            settings,
            running_version,
            report: LoadReport::default(),
            composites: [
                CompositeSlot::Untouched,
                CompositeSlot::Untouched,
                CompositeSlot::Untouched,
            ],
        }
    }

    fn run(mut self, text: &str) -> LoadReport {
        for (line_no, line) in lines::split(text) {
            let (key, value) = match line {
                Line::Blank => continue,
                Line::Malformed => {
                    self.skip(FormatError::new(line_no, FormatErrorKind::MissingSeparator));
                    continue;
                }
                Line::Entry { key, value } => (key, value),
            };

            match self.apply(key, value) {
                Ok(Outcome::Applied) => self.report.applied += 1,
                Ok(Outcome::Stop) => {
                    self.report.applied += 1;
                    self.report.stopped_at = Some(line_no);
                    debug!("initsettings=0 on line {}, using defaults", line_no);
                    break;
                }
                Err(kind) => self.skip(FormatError::new(line_no, kind)),
            }
        }

        if self.report.stored_version.is_none() {
            self.report.version_mismatch = true;
        }
        self.finish()
    }

    fn skip(&mut self, error: FormatError) {
        debug!("Skipping settings {}", error);
        self.report.errors.push(error);
    }

    fn finish(self) -> LoadReport {
        for (slot, marker) in self
            .composites
            .into_iter()
            .zip(self.settings.stroke.markers.iter_mut())
        {
            match slot {
                CompositeSlot::Untouched => {}
                CompositeSlot::Cleared => marker.secondary = None,
                CompositeSlot::Building(style) => marker.secondary = Some(style),
            }
        }
        self.report
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<Outcome, FormatErrorKind> {
        let bad = |source: ValueError| FormatErrorKind::InvalidValue {
            key: key.to_string(),
            source,
        };
        let s = &mut *self.settings;

        match key {
            keys::VERSION => {
                let stored = value.trim();
                if stored != self.running_version {
                    warn!(
                        "Settings were saved by version {} (running {})",
                        stored, self.running_version
                    );
                    self.report.version_mismatch = true;
                }
                self.report.stored_version = Some(stored.to_string());
            }
            keys::INIT_SETTINGS => {
                s.init = parse_choice(value, InitSettings::ALL, InitSettings::id).map_err(bad)?;
                if s.init == InitSettings::Default {
                    return Ok(Outcome::Stop);
                }
            }

            keys::TOOL => s.general.tool = parse_choice(value, &Tool::ALL, Tool::id).map_err(bad)?,
            keys::START_DIR_TYPE => {
                s.general.start_dir_type =
                    parse_choice(value, StartDirType::ALL, StartDirType::id).map_err(bad)?
            }
            keys::START_DIR => s.general.start_dir = optional_path(value),
            keys::LOOK_AND_FEEL => s.general.look_and_feel = value.trim().to_string(),
            keys::MAX_RECENT => {
                s.general.max_recent =
                    parse_int_range(value, 0, Some(MAX_RECENT_LIMIT as i64)).map_err(bad)? as u32
            }
            keys::ANTIALIAS => s.general.antialias = parse_bool(value).map_err(bad)?,
            keys::RENDER_QUALITY => s.general.render_quality = parse_bool(value).map_err(bad)?,

            keys::SHOW_GRID => s.ui.show_grid = parse_bool(value).map_err(bad)?,
            keys::GRID_LOCK => s.ui.grid_lock = parse_bool(value).map_err(bad)?,
            keys::SHOW_RULERS => s.ui.show_rulers = parse_bool(value).map_err(bad)?,
            keys::SHOW_TOOLS => s.ui.show_tools = parse_bool(value).map_err(bad)?,
            keys::SHOW_STATUS => s.ui.show_status = parse_bool(value).map_err(bad)?,
            keys::RULER_WIDTH => s.ui.ruler_width = parse_u32_min(value, 1).map_err(bad)?,
            keys::WINDOW_WIDTH => s.ui.window_width = parse_u32_min(value, 1).map_err(bad)?,
            keys::WINDOW_HEIGHT => s.ui.window_height = parse_u32_min(value, 1).map_err(bad)?,
            keys::WINDOW_X => s.ui.window_x = parse_i32(value).map_err(bad)?,
            keys::WINDOW_Y => s.ui.window_y = parse_i32(value).map_err(bad)?,
            keys::ZOOM => s.ui.zoom = parse_non_negative(value).map_err(bad)?,

            keys::PAPER => {
                s.paper.size = parse_name(value, PaperSize::ALL, PaperSize::name).map_err(bad)?
            }
            keys::PORTRAIT => s.paper.portrait = parse_bool(value).map_err(bad)?,
            keys::PAPER_WIDTH => s.paper.width = parse_length(value).map_err(bad)?,
            keys::PAPER_HEIGHT => s.paper.height = parse_length(value).map_err(bad)?,

            keys::GRID_TYPE => {
                s.grid.kind = parse_name(value, GridType::ALL, GridType::name).map_err(bad)?
            }
            keys::GRID_UNIT => s.grid.unit = parse_name(value, Unit::ALL, Unit::name).map_err(bad)?,
            keys::GRID_MAJOR => s.grid.major = parse_non_negative(value).map_err(bad)?,
            keys::GRID_SUBDIVISIONS => s.grid.subdivisions = parse_u32_min(value, 0).map_err(bad)?,
            keys::GRID_SPOKES => s.grid.spokes = parse_u32_min(value, 1).map_err(bad)?,
            keys::GRID_PATH => s.grid.path = Some(parse_path(value).map_err(bad)?),

            keys::PEN_WIDTH => s.stroke.pen_width = parse_length(value).map_err(bad)?,
            keys::CAP_STYLE => {
                s.stroke.cap = parse_choice(value, CapStyle::ALL, CapStyle::id).map_err(bad)?
            }
            keys::JOIN_STYLE => {
                s.stroke.join = parse_choice(value, JoinStyle::ALL, JoinStyle::id).map_err(bad)?
            }
            keys::MITRE_LIMIT => s.stroke.mitre_limit = parse_double_min(value, 1.0).map_err(bad)?,
            keys::WINDING_RULE => {
                s.stroke.winding =
                    parse_choice(value, WindingRule::ALL, WindingRule::id).map_err(bad)?
            }
            keys::DASH => s.stroke.dash = parse_dash(value).map_err(bad)?,
            keys::LINE_PAINT => s.stroke.line_paint = parse_color(value).map_err(bad)?,
            keys::FILL_PAINT => {
                s.stroke.fill_paint = parse_optional_color(value, keys::NO_PAINT).map_err(bad)?
            }

            keys::FONT_FAMILY => s.text.font_family = value.trim().to_string(),
            keys::FONT_SIZE => s.text.font_size = parse_u32_min(value, 1).map_err(bad)?,
            keys::FONT_SHAPE => {
                s.text.shape = parse_choice(value, FontShape::ALL, FontShape::id).map_err(bad)?
            }
            keys::FONT_SERIES => {
                s.text.series = parse_choice(value, FontSeries::ALL, FontSeries::id).map_err(bad)?
            }
            keys::TEXT_PAINT => s.text.paint = parse_color(value).map_err(bad)?,
            keys::HALIGN => {
                s.text.halign = parse_choice(value, HAlign::ALL, HAlign::id).map_err(bad)?
            }
            keys::VALIGN => {
                s.text.valign = parse_choice(value, VAlign::ALL, VAlign::id).map_err(bad)?
            }
            keys::LATEX_FAMILY => s.text.latex_family = value.trim().to_string(),
            keys::LATEX_SIZE => s.text.latex_size = value.trim().to_string(),
            keys::LATEX_SHAPE => s.text.latex_shape = value.trim().to_string(),
            keys::LATEX_SERIES => s.text.latex_series = value.trim().to_string(),

            keys::ROTATE_INCREMENT => s.rotate_increment = parse_angle(value).map_err(bad)?,

            keys::LATEX_APP => s.export.latex_app = optional_path(value),
            keys::PDFLATEX_APP => s.export.pdflatex_app = optional_path(value),
            keys::DVIPS_APP => s.export.dvips_app = optional_path(value),
            keys::DVISVGM_APP => s.export.dvisvgm_app = optional_path(value),
            keys::MAX_PROCESS_TIME => {
                s.export.max_process_time = parse_int_range(value, 1, None).map_err(bad)? as u64
            }
            keys::DOC_CLASS => s.export.doc_class = value.trim().to_string(),
            keys::NORMAL_SIZE => s.export.normal_size = parse_u32_min(value, 1).map_err(bad)?,

            _ => match MarkerKey::parse(key) {
                Some(marker_key) => self.apply_marker(marker_key, value).map_err(|err| match err {
                    MarkerError::Value(source) => bad(source),
                    MarkerError::Orphaned(anchor) => FormatErrorKind::OrphanedDetail {
                        key: key.to_string(),
                        anchor: anchor.to_string(),
                    },
                })?,
                None => return Err(FormatErrorKind::UnknownKey(key.to_string())),
            },
        }

        Ok(Outcome::Applied)
    }

    fn apply_marker(&mut self, key: MarkerKey, value: &str) -> Result<(), MarkerError> {
        let slot = &mut self.composites[key.role.index()];

        if key.secondary && key.field == MarkerField::Kind {
            let kind = parse_marker_kind(value)?;
            *slot = if kind == MarkerKind::None {
                CompositeSlot::Cleared
            } else {
                CompositeSlot::Building(MarkerStyle::new(kind))
            };
            return Ok(());
        }

        let style = if key.secondary {
            match slot {
                CompositeSlot::Building(style) => style,
                _ => return Err(MarkerError::Orphaned(key.anchor())),
            }
        } else {
            &mut self.settings.stroke.markers[key.role.index()].primary
        };

        match key.field {
            MarkerField::Kind => style.kind = parse_marker_kind(value)?,
            MarkerField::Size => style.size = parse_non_negative(value)?,
            MarkerField::Width => style.width = parse_non_negative(value)?,
            MarkerField::Repeat => {
                style.repeat = parse_int_range(value, 1, Some(MAX_MARKER_REPEAT as i64))? as u32;
            }
            MarkerField::Reverse => style.reversed = parse_bool(value)?,
            MarkerField::Orient => style.auto_orient = parse_bool(value)?,
            MarkerField::Angle => style.angle = parse_angle(value)?,
            MarkerField::Paint => style.paint = parse_optional_color(value, keys::LINE_PAINT_WORD)?,
        }
        Ok(())
    }
}

enum MarkerError {
    Value(ValueError),
    Orphaned(MarkerKey),
}

impl From<ValueError> for MarkerError {
    fn from(err: ValueError) -> Self {
        MarkerError::Value(err)
    }
}

fn parse_marker_kind(value: &str) -> Result<MarkerKind, ValueError> {
    parse_choice(value, MarkerKind::ALL, MarkerKind::id)
}

fn parse_i32(value: &str) -> Result<i32, ValueError> {
    parse_int_range(value, i32::MIN as i64, Some(i32::MAX as i64)).map(|v| v as i32)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

impl Settings {
    /// Applies the settings in `text` on top of the current values.
    pub fn load_str(&mut self, text: &str) -> LoadReport {
        self.load_with_version(text, APP_VERSION)
    }

    /// Like [`Settings::load_str`], comparing `version` against
    /// `running_version` instead of the crate version.
    pub fn load_with_version(&mut self, text: &str, running_version: &str) -> LoadReport {
        let report = Loader::new(self, running_version).run(text);
        if report.stopped_at.is_some() {
            let init = self.init;
            *self = Settings::default();
            self.init = init;
        }
        info!(
            "Loaded {} settings ({} skipped)",
            report.applied,
            report.errors.len()
        );
        report
    }

    /// Reads settings from `path`. A missing or unreadable file is an error;
    /// bad lines inside it are not.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        debug!("Loading settings from {}", path.display());
        Ok(self.load_str(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::CollectingSink;
    use crate::settings::types::{Color, DashPattern, Length, MarkerRole, RED};

    fn load(text: &str) -> (Settings, LoadReport) {
        let mut settings = Settings::default();
        let report = settings.load_with_version(text, "0.8.0");
        (settings, report)
    }

    #[test]
    fn stroke_values_parse() {
        let (settings, report) =
            load("version=0.8.0\ncapstyle=1\njoinstyle=2\nwindingrule=1\npenwidth=2.5\n");
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(!report.version_mismatch);
        assert_eq!(report.applied, 5);
        assert_eq!(settings.stroke.cap, CapStyle::Round);
        assert_eq!(settings.stroke.join, JoinStyle::Bevel);
        assert_eq!(settings.stroke.winding, WindingRule::NonZero);
        assert_eq!(settings.stroke.pen_width(), Length::bp(2.5));
    }

    #[test]
    fn one_bad_line_does_not_spoil_the_rest() {
        let text = "\
version=0.8.0
showgrid=1
gridlock=1
penwidth=notanumber
capstyle=2
tool=3
rulerwidth=30
zoom=2
paper=letter
portrait=0
";
        let (settings, report) = load(text);
        assert_eq!(report.applied, 9);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 4);
        assert!(matches!(
            &report.errors[0].kind,
            FormatErrorKind::InvalidValue { key, .. } if key == "penwidth"
        ));
        assert_eq!(settings.stroke.pen_width(), Length::bp(1.0));
        assert!(settings.ui.show_grid);
        assert_eq!(settings.general.tool, Tool::OpenCurve);
        assert_eq!(settings.paper.size, PaperSize::Letter);
        assert!(!settings.paper.portrait);
    }

    #[test]
    fn enum_names_must_match_exactly() {
        let (settings, report) = load("paper=Letter\ngridtype=RADIAL\ngridunit=cm");
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].line, 1);
        assert_eq!(report.errors[1].line, 2);
        assert_eq!(settings.paper.size, PaperSize::A4);
        assert_eq!(settings.grid.kind, Settings::default().grid.kind);
        assert_eq!(settings.grid.unit, Unit::Cm);
    }

    #[test]
    fn dash_and_colors() {
        let (settings, report) = load("dash=3,1.0,2.0\nlinepaint=16711680\nfillpaint=16711680,128");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 1);
        assert_eq!(settings.stroke.dash, None);
        assert_eq!(settings.stroke.line_paint, RED);
        assert_eq!(settings.stroke.fill_paint, Some(Color::rgba(255, 0, 0, 128)));

        let (settings, report) = load("dash=2,4,2\nfillpaint=none");
        assert!(report.errors.is_empty());
        assert_eq!(
            settings.stroke.dash,
            Some(DashPattern {
                dashes: vec![4.0, 2.0]
            })
        );
        assert_eq!(settings.stroke.fill_paint, None);

        let (mut settings, _) = load("dash=2,4,2");
        settings.load_str("dash=0");
        assert_eq!(settings.stroke.dash, None);
    }

    #[test]
    fn initsettings_zero_stops_parsing() {
        let (settings, report) = load("initsettings=0\nshowgrid=1\nbogus=1\npenwidth=x");
        assert_eq!(report.stopped_at, Some(1));
        assert!(report.errors.is_empty());
        assert_eq!(settings.init, InitSettings::Default);
        assert!(!settings.ui.show_grid);
    }

    #[test]
    fn initsettings_zero_discards_earlier_lines() {
        let (settings, report) = load("showgrid=1\ninitsettings=0\nshowrulers=0");
        assert_eq!(report.stopped_at, Some(2));
        assert!(!settings.ui.show_grid);
        assert!(settings.ui.show_rulers);
    }

    #[test]
    fn unknown_keys_and_missing_separators_are_errors() {
        let (_, report) = load("# comment\n\nfoo=1\nshowgrid\nShowGrid=1");
        let lines: Vec<_> = report.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(report.errors[1].kind, FormatErrorKind::MissingSeparator);
        assert_eq!(
            report.errors[2].kind,
            FormatErrorKind::UnknownKey("ShowGrid".into())
        );
    }

    #[test]
    fn version_mismatch_is_flagged() {
        let (_, report) = load("version=0.7.2\n");
        assert!(report.version_mismatch);
        assert_eq!(report.stored_version.as_deref(), Some("0.7.2"));

        let (_, report) = load("showgrid=1\n");
        assert!(report.version_mismatch);
        assert_eq!(report.stored_version, None);
    }

    #[test]
    fn composite_markers_build_across_lines() {
        let text = "\
endarrow=2
endarrowsize=8
secondaryendarrow=3
secondaryendarrowsize=4
secondaryendarrowrepeat=2
secondaryendarrowpaint=255
endarrowreverse=1
";
        let (settings, report) = load(text);
        assert!(report.errors.is_empty(), "{:?}", report.errors);

        let marker = settings.stroke.marker(MarkerRole::End);
        assert_eq!(marker.primary.kind, MarkerKind::Triangle);
        assert_eq!(marker.primary.size, 8.0);
        assert!(marker.primary.reversed);

        let secondary = marker.secondary.as_ref().unwrap();
        assert_eq!(secondary.kind, MarkerKind::Circle);
        assert_eq!(secondary.size, 4.0);
        assert_eq!(secondary.repeat(), 2);
        assert_eq!(secondary.paint, Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn secondary_detail_without_anchor_is_orphaned() {
        let (settings, report) = load("secondarystartarrowsize=4\nsecondarystartarrow=5");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].kind,
            FormatErrorKind::OrphanedDetail {
                key: "secondarystartarrowsize".into(),
                anchor: "secondarystartarrow".into(),
            }
        );
        let secondary = settings.stroke.marker(MarkerRole::Start).secondary.as_ref();
        assert_eq!(secondary.map(|s| s.size), Some(5.0));
    }

    #[test]
    fn secondary_zero_clears_composite() {
        let mut settings = Settings::default();
        settings.stroke.marker_mut(MarkerRole::Mid).secondary =
            Some(MarkerStyle::new(MarkerKind::Star));

        let report = settings.load_with_version("secondarymidarrow=0\nsecondarymidarrowsize=3", "x");
        assert_eq!(report.errors.len(), 1);
        assert!(settings.stroke.marker(MarkerRole::Mid).secondary.is_none());
    }

    #[test]
    fn primary_kind_keeps_other_fields() {
        let (settings, _) = load("startarrowsize=9\nstartarrow=4");
        let primary = &settings.stroke.marker(MarkerRole::Start).primary;
        assert_eq!(primary.kind, MarkerKind::Diamond);
        assert_eq!(primary.size, 9.0);
    }

    #[test]
    fn marker_repeat_range() {
        let (_, report) = load("midarrowrepeat=0\nmidarrowrepeat=11\nmidarrowrepeat=10");
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.applied, 1);
    }

    #[test]
    fn diagnostic_only_surfaces_in_debug_mode() {
        let (_, report) = load("foo=1\nzoom=-1");
        let text = report.diagnostic().unwrap();
        assert!(text.starts_with("2 problems"));
        assert!(text.contains("line 1: unknown setting 'foo'"));
        assert!(text.contains("line 2: invalid value for 'zoom'"));

        let mut sink = CollectingSink::default();
        report.surface(false, &mut sink);
        assert!(sink.warnings.is_empty());
        report.surface(true, &mut sink);
        assert_eq!(sink.warnings, vec![text]);

        let (_, clean) = load("version=0.8.0");
        assert_eq!(clean.diagnostic(), None);
    }

    #[test]
    fn load_file_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        let err = settings
            .load_file(&dir.path().join("missing.conf"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read settings"));
    }
}
