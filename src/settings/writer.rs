//! Canonical settings serialization.

use super::keys::{self, MarkerField, MarkerKey};
use super::types::{MarkerRole, MarkerStyle};
use super::values::{
    format_bool, format_color, format_dash, format_optional_color, format_path,
};
use super::{APP_VERSION, Settings};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

fn put(out: &mut String, key: &str, value: impl Display) {
    out.push_str(key);
    out.push('=');
    out.push_str(&value.to_string());
    out.push('\n');
}

/// Free text as the loader will read it back: one line, trimmed.
fn one_line(key: &str, value: &str) -> String {
    let text = value.split(['\r', '\n']).collect::<Vec<_>>().join(" ");
    let text = text.trim().to_string();
    if text != value {
        warn!("Value of '{}' was normalized to fit on one line", key);
    }
    text
}

fn put_text(out: &mut String, key: &str, value: &str) {
    put(out, key, one_line(key, value));
}

fn put_path(out: &mut String, key: &str, path: &Option<PathBuf>) {
    let text = path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    put_text(out, key, &text);
}

fn put_marker(out: &mut String, secondary: bool, role: MarkerRole, style: &MarkerStyle) {
    let key = |field| MarkerKey::new(secondary, role, field).to_string();
    put(out, &key(MarkerField::Kind), style.kind.id());
    put(out, &key(MarkerField::Size), style.size);
    put(out, &key(MarkerField::Width), style.width);
    put(out, &key(MarkerField::Repeat), style.repeat());
    put(out, &key(MarkerField::Reverse), format_bool(style.reversed));
    put(out, &key(MarkerField::Orient), format_bool(style.auto_orient));
    put(out, &key(MarkerField::Angle), style.angle);
    put(
        out,
        &key(MarkerField::Paint),
        format_optional_color(style.paint, keys::LINE_PAINT_WORD),
    );
}

impl Settings {
    /// Serializes every setting in a fixed order.
    ///
    /// The output loads back into an equal `Settings`, except that free-text
    /// values and paths are stored on a single line without surrounding
    /// whitespace: line breaks become spaces and the value loads back in that
    /// normalized form.
    pub fn to_config_string(&self) -> String {
        let mut out = String::new();
        let o = &mut out;

        put(o, keys::VERSION, APP_VERSION);
        put(o, keys::INIT_SETTINGS, self.init.id());

        let general = &self.general;
        put(o, keys::TOOL, general.tool.id());
        put(o, keys::START_DIR_TYPE, general.start_dir_type.id());
        put_path(o, keys::START_DIR, &general.start_dir);
        put_text(o, keys::LOOK_AND_FEEL, &general.look_and_feel);
        put(o, keys::MAX_RECENT, general.max_recent());
        put(o, keys::ANTIALIAS, format_bool(general.antialias));
        put(o, keys::RENDER_QUALITY, format_bool(general.render_quality));

        let ui = &self.ui;
        let (width, height) = ui.window_size();
        put(o, keys::SHOW_GRID, format_bool(ui.show_grid));
        put(o, keys::GRID_LOCK, format_bool(ui.grid_lock));
        put(o, keys::SHOW_RULERS, format_bool(ui.show_rulers));
        put(o, keys::SHOW_TOOLS, format_bool(ui.show_tools));
        put(o, keys::SHOW_STATUS, format_bool(ui.show_status));
        put(o, keys::RULER_WIDTH, ui.ruler_width());
        put(o, keys::WINDOW_WIDTH, width);
        put(o, keys::WINDOW_HEIGHT, height);
        put(o, keys::WINDOW_X, ui.window_x);
        put(o, keys::WINDOW_Y, ui.window_y);
        put(o, keys::ZOOM, ui.zoom());

        put(o, keys::PAPER, self.paper.size);
        put(o, keys::PORTRAIT, format_bool(self.paper.portrait));
        put(o, keys::PAPER_WIDTH, self.paper.width);
        put(o, keys::PAPER_HEIGHT, self.paper.height);

        let grid = &self.grid;
        put(o, keys::GRID_TYPE, grid.kind);
        put(o, keys::GRID_UNIT, grid.unit);
        put(o, keys::GRID_MAJOR, grid.major);
        put(o, keys::GRID_SUBDIVISIONS, grid.subdivisions);
        put(o, keys::GRID_SPOKES, grid.spokes());
        if let Some(path) = &grid.path {
            put(o, keys::GRID_PATH, format_path(path));
        }

        let stroke = &self.stroke;
        put(o, keys::PEN_WIDTH, stroke.pen_width());
        put(o, keys::CAP_STYLE, stroke.cap.id());
        put(o, keys::JOIN_STYLE, stroke.join.id());
        put(o, keys::MITRE_LIMIT, stroke.mitre_limit());
        put(o, keys::WINDING_RULE, stroke.winding.id());
        put(o, keys::DASH, format_dash(stroke.dash.as_ref()));
        put(o, keys::LINE_PAINT, format_color(stroke.line_paint));
        put(
            o,
            keys::FILL_PAINT,
            format_optional_color(stroke.fill_paint, keys::NO_PAINT),
        );

        for role in MarkerRole::ALL {
            let marker = stroke.marker(role);
            put_marker(o, false, role, &marker.primary);
            match &marker.secondary {
                Some(secondary) => put_marker(o, true, role, secondary),
                None => put(o, &MarkerKey::new(true, role, MarkerField::Kind).to_string(), 0),
            }
        }

        let text = &self.text;
        put_text(o, keys::FONT_FAMILY, &text.font_family);
        put(o, keys::FONT_SIZE, text.font_size());
        put(o, keys::FONT_SHAPE, text.shape.id());
        put(o, keys::FONT_SERIES, text.series.id());
        put(o, keys::TEXT_PAINT, format_color(text.paint));
        put(o, keys::HALIGN, text.halign.id());
        put(o, keys::VALIGN, text.valign.id());
        put_text(o, keys::LATEX_FAMILY, &text.latex_family);
        put_text(o, keys::LATEX_SIZE, &text.latex_size);
        put_text(o, keys::LATEX_SHAPE, &text.latex_shape);
        put_text(o, keys::LATEX_SERIES, &text.latex_series);

        put(o, keys::ROTATE_INCREMENT, self.rotate_increment);

        let export = &self.export;
        put_path(o, keys::LATEX_APP, &export.latex_app);
        put_path(o, keys::PDFLATEX_APP, &export.pdflatex_app);
        put_path(o, keys::DVIPS_APP, &export.dvips_app);
        put_path(o, keys::DVISVGM_APP, &export.dvisvgm_app);
        put(o, keys::MAX_PROCESS_TIME, export.max_process_time());
        put_text(o, keys::DOC_CLASS, &export.doc_class);
        put(o, keys::NORMAL_SIZE, export.normal_size());

        out
    }

    /// Writes the settings file, creating its directory when needed.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = format!(
            "# FlowframTk settings, saved {}\n{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.to_config_string()
        );
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;

        info!("Saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::actions::Tool;
    use crate::settings::keys::{self, MarkerKey};
    use crate::settings::lines::{self, Line};
    use crate::settings::types::*;
    use crate::settings::{FormatErrorKind, Settings};
    use std::path::PathBuf;

    fn customised() -> Settings {
        let mut settings = Settings::default();
        settings.init = InitSettings::User;
        settings.general.tool = Tool::Ellipse;
        settings.general.start_dir_type = StartDirType::Named;
        settings.general.start_dir = Some(PathBuf::from("/home/user/drawings"));
        settings.general.set_max_recent(25).unwrap();
        settings.ui.show_grid = true;
        settings.ui.set_window_size(1280, 1024).unwrap();
        settings.ui.window_x = -20;
        settings.ui.set_zoom(1.5).unwrap();
        settings.paper.size = PaperSize::User;
        settings.paper.width = Length::new(12.5, Unit::Cm);
        settings.grid.kind = GridType::Path;
        settings.grid.path = Some(PathOutline {
            winding: WindingRule::EvenOdd,
            segments: vec![
                PathSegment::MoveTo(0.0, 0.0),
                PathSegment::QuadTo(5.0, 5.0, 10.0, 0.0),
                PathSegment::Close,
            ],
        });
        settings.stroke.set_pen_width(Length::new(0.75, Unit::Mm)).unwrap();
        settings.stroke.cap = CapStyle::Square;
        settings.stroke.dash = Some(DashPattern {
            dashes: vec![3.0, 1.5, 0.5, 1.5],
        });
        settings.stroke.line_paint = Color::rgba(10, 20, 30, 40);
        settings.stroke.fill_paint = Some(YELLOW);

        let end = settings.stroke.marker_mut(MarkerRole::End);
        end.primary.kind = MarkerKind::Pointed;
        end.primary.auto_orient = false;
        end.primary.angle = Angle::degrees(30.0);
        end.primary.paint = Some(BLUE);
        let mut secondary = MarkerStyle::new(MarkerKind::Bar);
        secondary.set_repeat(3).unwrap();
        end.secondary = Some(secondary);

        settings.text.font_family = "Serif".to_string();
        settings.text.set_font_size(12).unwrap();
        settings.text.valign = VAlign::Bottom;
        settings.rotate_increment = Angle::radians(0.1);
        settings.export.pdflatex_app = Some(PathBuf::from("/usr/bin/pdflatex"));
        settings.export.set_max_process_time(1000).unwrap();
        settings
    }

    #[test]
    fn free_text_cannot_break_out_of_its_line() {
        let mut settings = Settings::default();
        settings.text.font_family = "  Serif\nshowgrid=1 ".to_string();
        settings.export.doc_class = "report\r\n".to_string();

        let text = settings.to_config_string();
        assert!(text.contains("\nfontfamily=Serif showgrid=1\n"));
        assert!(text.contains("\ndocclass=report\n"));

        let mut loaded = Settings::default();
        let report = loaded.load_str(&text);
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(!loaded.ui.show_grid);
        assert_eq!(loaded.text.font_family, "Serif showgrid=1");
        assert_eq!(loaded.export.doc_class, "report");
    }

    #[test]
    fn defaults_round_trip() {
        let original = Settings::default();
        let mut loaded = Settings::default();
        let report = loaded.load_str(&original.to_config_string());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(!report.version_mismatch);
        assert_eq!(loaded, original);
    }

    #[test]
    fn customised_settings_round_trip() {
        let original = customised();
        let mut loaded = Settings::default();
        let report = loaded.load_str(&original.to_config_string());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(loaded, original);
    }

    #[test]
    fn saving_is_deterministic() {
        let settings = customised();
        assert_eq!(settings.to_config_string(), settings.to_config_string());
    }

    #[test]
    fn writer_and_loader_share_the_vocabulary() {
        let text = customised().to_config_string();
        let written: Vec<&str> = lines::split(&text)
            .filter_map(|(_, line)| match line {
                Line::Entry { key, .. } => Some(key),
                _ => None,
            })
            .collect();

        for key in keys::FIXED_KEYS {
            assert!(written.contains(key), "writer never emits '{key}'");
        }
        for key in &written {
            assert!(
                keys::FIXED_KEYS.contains(key) || MarkerKey::parse(key).is_some(),
                "loader does not know '{key}'"
            );
        }

        let mut settings = Settings::default();
        let report = settings.load_str(&text);
        assert!(
            !report
                .errors
                .iter()
                .any(|e| matches!(e.kind, FormatErrorKind::UnknownKey(_)))
        );
        assert_eq!(report.applied, written.len());
    }

    #[test]
    fn grid_path_only_written_when_set() {
        let text = Settings::default().to_config_string();
        assert!(!text.contains("gridpath="));
        assert!(text.starts_with("version="));
        assert!(text.contains("\ninitsettings=1\n"));
        assert!(text.contains("\nfillpaint=none\n"));
        assert!(text.contains("\nsecondarystartarrow=0\n"));
    }

    #[test]
    fn save_file_writes_header_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("flowframtk.conf");
        let settings = customised();
        settings.save_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# FlowframTk settings, saved "));

        let mut loaded = Settings::default();
        let report = loaded.load_file(&path).unwrap();
        assert!(report.errors.is_empty());
        assert_eq!(loaded, settings);
    }
}
