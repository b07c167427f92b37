//! Key vocabulary of the settings file, shared by the loader and the writer.

use super::types::MarkerRole;
use std::fmt;

pub const VERSION: &str = "version";
pub const INIT_SETTINGS: &str = "initsettings";

pub const TOOL: &str = "tool";
pub const START_DIR_TYPE: &str = "startdirtype";
pub const START_DIR: &str = "startdir";
pub const LOOK_AND_FEEL: &str = "lookandfeel";
pub const MAX_RECENT: &str = "maxrecent";
pub const ANTIALIAS: &str = "antialias";
pub const RENDER_QUALITY: &str = "renderquality";

pub const SHOW_GRID: &str = "showgrid";
pub const GRID_LOCK: &str = "gridlock";
pub const SHOW_RULERS: &str = "showrulers";
pub const SHOW_TOOLS: &str = "showtools";
pub const SHOW_STATUS: &str = "showstatus";
pub const RULER_WIDTH: &str = "rulerwidth";
pub const WINDOW_WIDTH: &str = "windowwidth";
pub const WINDOW_HEIGHT: &str = "windowheight";
pub const WINDOW_X: &str = "windowx";
pub const WINDOW_Y: &str = "windowy";
pub const ZOOM: &str = "zoom";

pub const PAPER: &str = "paper";
pub const PORTRAIT: &str = "portrait";
pub const PAPER_WIDTH: &str = "paperwidth";
pub const PAPER_HEIGHT: &str = "paperheight";

pub const GRID_TYPE: &str = "gridtype";
pub const GRID_UNIT: &str = "gridunit";
pub const GRID_MAJOR: &str = "gridmajor";
pub const GRID_SUBDIVISIONS: &str = "gridsubdivisions";
pub const GRID_SPOKES: &str = "gridspokes";
pub const GRID_PATH: &str = "gridpath";

pub const PEN_WIDTH: &str = "penwidth";
pub const CAP_STYLE: &str = "capstyle";
pub const JOIN_STYLE: &str = "joinstyle";
pub const MITRE_LIMIT: &str = "mitrelimit";
pub const WINDING_RULE: &str = "windingrule";
pub const DASH: &str = "dash";
pub const LINE_PAINT: &str = "linepaint";
pub const FILL_PAINT: &str = "fillpaint";

pub const FONT_FAMILY: &str = "fontfamily";
pub const FONT_SIZE: &str = "fontsize";
pub const FONT_SHAPE: &str = "fontshape";
pub const FONT_SERIES: &str = "fontseries";
pub const TEXT_PAINT: &str = "textpaint";
pub const HALIGN: &str = "halign";
pub const VALIGN: &str = "valign";
pub const LATEX_FAMILY: &str = "latexfamily";
pub const LATEX_SIZE: &str = "latexsize";
pub const LATEX_SHAPE: &str = "latexshape";
pub const LATEX_SERIES: &str = "latexseries";

pub const ROTATE_INCREMENT: &str = "rotateincrement";

pub const LATEX_APP: &str = "latexapp";
pub const PDFLATEX_APP: &str = "pdflatexapp";
pub const DVIPS_APP: &str = "dvipsapp";
pub const DVISVGM_APP: &str = "dvisvgmapp";
pub const MAX_PROCESS_TIME: &str = "maxprocesstime";
pub const DOC_CLASS: &str = "docclass";
pub const NORMAL_SIZE: &str = "normalsize";

/// Keyword for "no fill" in `fillpaint`.
pub const NO_PAINT: &str = "none";
/// Keyword for "same as the line" in marker paint keys.
pub const LINE_PAINT_WORD: &str = "line";

/// Every key other than the marker family.
pub const FIXED_KEYS: &[&str] = &[
    VERSION,
    INIT_SETTINGS,
    TOOL,
    START_DIR_TYPE,
    START_DIR,
    LOOK_AND_FEEL,
    MAX_RECENT,
    ANTIALIAS,
    RENDER_QUALITY,
    SHOW_GRID,
    GRID_LOCK,
    SHOW_RULERS,
    SHOW_TOOLS,
    SHOW_STATUS,
    RULER_WIDTH,
    WINDOW_WIDTH,
    WINDOW_HEIGHT,
    WINDOW_X,
    WINDOW_Y,
    ZOOM,
    PAPER,
    PORTRAIT,
    PAPER_WIDTH,
    PAPER_HEIGHT,
    GRID_TYPE,
    GRID_UNIT,
    GRID_MAJOR,
    GRID_SUBDIVISIONS,
    GRID_SPOKES,
    GRID_PATH,
    PEN_WIDTH,
    CAP_STYLE,
    JOIN_STYLE,
    MITRE_LIMIT,
    WINDING_RULE,
    DASH,
    LINE_PAINT,
    FILL_PAINT,
    FONT_FAMILY,
    FONT_SIZE,
    FONT_SHAPE,
    FONT_SERIES,
    TEXT_PAINT,
    HALIGN,
    VALIGN,
    LATEX_FAMILY,
    LATEX_SIZE,
    LATEX_SHAPE,
    LATEX_SERIES,
    ROTATE_INCREMENT,
    LATEX_APP,
    PDFLATEX_APP,
    DVIPS_APP,
    DVISVGM_APP,
    MAX_PROCESS_TIME,
    DOC_CLASS,
    NORMAL_SIZE,
];

const SECONDARY_PREFIX: &str = "secondary";
const ARROW: &str = "arrow";

/// Attribute of a marker addressed by a marker key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerField {
    Kind,
    Size,
    Width,
    Repeat,
    Reverse,
    Orient,
    Angle,
    Paint,
}

impl MarkerField {
    pub const ALL: [MarkerField; 8] = [
        MarkerField::Kind,
        MarkerField::Size,
        MarkerField::Width,
        MarkerField::Repeat,
        MarkerField::Reverse,
        MarkerField::Orient,
        MarkerField::Angle,
        MarkerField::Paint,
    ];

    fn suffix(self) -> &'static str {
        match self {
            MarkerField::Kind => "",
            MarkerField::Size => "size",
            MarkerField::Width => "width",
            MarkerField::Repeat => "repeat",
            MarkerField::Reverse => "reverse",
            MarkerField::Orient => "orient",
            MarkerField::Angle => "angle",
            MarkerField::Paint => "paint",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.suffix() == suffix)
    }
}

/// A parsed `[secondary]<role>arrow[<field>]` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerKey {
    pub secondary: bool,
    pub role: MarkerRole,
    pub field: MarkerField,
}

impl MarkerKey {
    pub fn new(secondary: bool, role: MarkerRole, field: MarkerField) -> Self {
        Self {
            secondary,
            role,
            field,
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let (secondary, rest) = match key.strip_prefix(SECONDARY_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, key),
        };

        let (role, rest) = MarkerRole::ALL
            .into_iter()
            .find_map(|role| rest.strip_prefix(role.prefix()).map(|rest| (role, rest)))?;
        let field = MarkerField::from_suffix(rest.strip_prefix(ARROW)?)?;

        Some(Self::new(secondary, role, field))
    }

    /// The `<role>arrow` or `secondary<role>arrow` key a detail key belongs to.
    pub fn anchor(self) -> MarkerKey {
        MarkerKey {
            field: MarkerField::Kind,
            ..self
        }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.secondary {
            f.write_str(SECONDARY_PREFIX)?;
        }
        write!(f, "{}{}{}", self.role.prefix(), ARROW, self.field.suffix())
    }
}
