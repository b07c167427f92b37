//! Tool, mode and selection flags consulted when gating commands.
//!
//! Every flag set is a thin newtype over a fixed-width integer so that the
//! masks can be combined and tested in constant time. Selection categories
//! double as indices into the per-category count array.

use serde::Serialize;
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Drawing tool selection.
///
/// Exactly one tool is active on the canvas at any time. The numeric id is
/// the bit position used in [`ToolSet`] masks and the value stored in the
/// settings file under the `tool` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    /// Pick, move and edit existing objects
    Select,
    /// Polyline left open at the end
    OpenLine,
    /// Polyline closed back to its start point
    ClosedLine,
    /// Bezier curve left open at the end
    OpenCurve,
    /// Bezier curve closed back to its start point
    ClosedCurve,
    /// Axis-aligned rectangle
    Rectangle,
    /// Ellipse/circle
    Ellipse,
    /// Plain text area
    Text,
    /// Inline maths (text rendered in LaTeX maths mode)
    Math,
}

impl Tool {
    /// All tools in id order.
    pub const ALL: [Tool; 9] = [
        Tool::Select,
        Tool::OpenLine,
        Tool::ClosedLine,
        Tool::OpenCurve,
        Tool::ClosedCurve,
        Tool::Rectangle,
        Tool::Ellipse,
        Tool::Text,
        Tool::Math,
    ];

    /// Numeric id of the tool.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Resolves a numeric tool id. Negative ids (conventionally `-1`) mean
    /// "tool unknown" and resolve to `None`, as do ids past the last tool.
    pub fn from_id(id: i32) -> Option<Tool> {
        usize::try_from(id)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Select => "select",
            Tool::OpenLine => "open-line",
            Tool::ClosedLine => "closed-line",
            Tool::OpenCurve => "open-curve",
            Tool::ClosedCurve => "closed-curve",
            Tool::Rectangle => "rectangle",
            Tool::Ellipse => "ellipse",
            Tool::Text => "text",
            Tool::Math => "math",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of tools a command is valid under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ToolSet(u32);

impl ToolSet {
    pub const EMPTY: ToolSet = ToolSet(0);
    pub const ALL: ToolSet = ToolSet((1 << Tool::ALL.len()) - 1);
    pub const SELECT: ToolSet = ToolSet(1 << Tool::Select as u32);
    /// Every tool that constructs a new path (lines, curves and shapes).
    pub const PATH_TOOLS: ToolSet = ToolSet(
        1 << Tool::OpenLine as u32
            | 1 << Tool::ClosedLine as u32
            | 1 << Tool::OpenCurve as u32
            | 1 << Tool::ClosedCurve as u32
            | 1 << Tool::Rectangle as u32
            | 1 << Tool::Ellipse as u32,
    );
    pub const TEXT_TOOLS: ToolSet = ToolSet(1 << Tool::Text as u32 | 1 << Tool::Math as u32);

    pub const fn from_bits(bits: u32) -> ToolSet {
        ToolSet(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn only(tool: Tool) -> ToolSet {
        ToolSet(1 << tool.id())
    }

    pub fn of(tools: &[Tool]) -> ToolSet {
        tools
            .iter()
            .fold(ToolSet::EMPTY, |set, tool| set | ToolSet::only(*tool))
    }

    pub fn has(self, tool: Tool) -> bool {
        self.0 & (1 << tool.id()) != 0
    }

    pub fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }
}

impl BitOr for ToolSet {
    type Output = ToolSet;

    fn bitor(self, rhs: ToolSet) -> ToolSet {
        ToolSet(self.0 | rhs.0)
    }
}

/// Canvas edit mode.
///
/// Only one mode is active at a time but it is kept as a mask so a command
/// can list every mode it tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditFlags(u8);

impl EditFlags {
    pub const NORMAL: EditFlags = EditFlags(1);
    pub const PATH_EDIT: EditFlags = EditFlags(1 << 1);
    pub const DISTORT: EditFlags = EditFlags(1 << 2);
    pub const ANY: EditFlags = EditFlags(0b111);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn intersects(self, other: EditFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for EditFlags {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl BitOr for EditFlags {
    type Output = EditFlags;

    fn bitor(self, rhs: EditFlags) -> EditFlags {
        EditFlags(self.0 | rhs.0)
    }
}

/// State of an in-progress, not yet committed object on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstructionFlags(u8);

impl ConstructionFlags {
    /// Nothing under construction.
    pub const NONE: ConstructionFlags = ConstructionFlags(1);
    /// A path or shape made from line/curve segments.
    pub const GEOMETRIC: ConstructionFlags = ConstructionFlags(1 << 1);
    /// A path that is not constructed point by point (rectangle, ellipse).
    pub const NON_GEOMETRIC: ConstructionFlags = ConstructionFlags(1 << 2);
    pub const TEXT: ConstructionFlags = ConstructionFlags(1 << 3);
    pub const ANY: ConstructionFlags = ConstructionFlags(0b1111);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn intersects(self, other: ConstructionFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for ConstructionFlags {
    fn default() -> Self {
        Self::NONE
    }
}

impl BitOr for ConstructionFlags {
    type Output = ConstructionFlags;

    fn bitor(self, rhs: ConstructionFlags) -> ConstructionFlags {
        ConstructionFlags(self.0 | rhs.0)
    }
}

/// Object category present in a selection.
///
/// The discriminant is both the bit position in [`SelectionFlags`] and the
/// index into [`Selection::counts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionCategory {
    /// Nothing is selected
    Nothing,
    /// Any object at all
    Object,
    Path,
    Text,
    TextPath,
    Bitmap,
    Group,
    Pattern,
    Distorted,
    Symmetric,
    Closed,
    Open,
    Compound,
}

/// Number of selection categories (length of the count array).
pub const CATEGORY_COUNT: usize = 13;

impl SelectionCategory {
    pub const ALL: [SelectionCategory; CATEGORY_COUNT] = [
        SelectionCategory::Nothing,
        SelectionCategory::Object,
        SelectionCategory::Path,
        SelectionCategory::Text,
        SelectionCategory::TextPath,
        SelectionCategory::Bitmap,
        SelectionCategory::Group,
        SelectionCategory::Pattern,
        SelectionCategory::Distorted,
        SelectionCategory::Symmetric,
        SelectionCategory::Closed,
        SelectionCategory::Open,
        SelectionCategory::Compound,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SelectionCategory::Nothing => "nothing",
            SelectionCategory::Object => "object",
            SelectionCategory::Path => "path",
            SelectionCategory::Text => "text",
            SelectionCategory::TextPath => "text-path",
            SelectionCategory::Bitmap => "bitmap",
            SelectionCategory::Group => "group",
            SelectionCategory::Pattern => "pattern",
            SelectionCategory::Distorted => "distorted",
            SelectionCategory::Symmetric => "symmetric",
            SelectionCategory::Closed => "closed",
            SelectionCategory::Open => "open",
            SelectionCategory::Compound => "compound",
        }
    }

    pub fn from_name(name: &str) -> Option<SelectionCategory> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|category| category.name() == name)
    }
}

/// Bitmask of object categories present in the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SelectionFlags(u16);

impl SelectionFlags {
    pub const EMPTY: SelectionFlags = SelectionFlags(0);
    pub const NOTHING: SelectionFlags = SelectionFlags(1);
    pub const ANY: SelectionFlags = SelectionFlags((1 << CATEGORY_COUNT) - 1);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn of(category: SelectionCategory) -> SelectionFlags {
        SelectionFlags(1 << category.index())
    }

    pub fn any_of(categories: &[SelectionCategory]) -> SelectionFlags {
        categories
            .iter()
            .fold(SelectionFlags::EMPTY, |flags, category| {
                flags | SelectionFlags::of(*category)
            })
    }

    pub fn has(self, category: SelectionCategory) -> bool {
        self.0 & (1 << category.index()) != 0
    }

    pub fn insert(&mut self, category: SelectionCategory) {
        self.0 |= 1 << category.index();
    }

    pub fn intersects(self, other: SelectionFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_any(self) -> bool {
        self.0 == Self::ANY.0
    }

    pub fn categories(self) -> impl Iterator<Item = SelectionCategory> {
        SelectionCategory::ALL
            .into_iter()
            .filter(move |category| self.has(*category))
    }
}

impl BitOr for SelectionFlags {
    type Output = SelectionFlags;

    fn bitor(self, rhs: SelectionFlags) -> SelectionFlags {
        SelectionFlags(self.0 | rhs.0)
    }
}

impl BitAnd for SelectionFlags {
    type Output = SelectionFlags;

    fn bitand(self, rhs: SelectionFlags) -> SelectionFlags {
        SelectionFlags(self.0 & rhs.0)
    }
}

/// Kind of a selected canvas object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Path,
    Text,
    TextPath,
    Bitmap,
    Group,
    Pattern,
}

/// Summary of one selected object, as reported by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedObject {
    pub kind: ObjectKind,
    pub closed: bool,
    pub symmetric: bool,
    pub compound: bool,
    pub distorted: bool,
}

impl SelectedObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            closed: false,
            symmetric: false,
            compound: false,
            distorted: false,
        }
    }

    pub fn open_path() -> Self {
        Self::new(ObjectKind::Path)
    }

    pub fn closed_path() -> Self {
        Self {
            closed: true,
            ..Self::new(ObjectKind::Path)
        }
    }

    fn categories(&self) -> impl Iterator<Item = SelectionCategory> {
        let kind = match self.kind {
            ObjectKind::Path => SelectionCategory::Path,
            ObjectKind::Text => SelectionCategory::Text,
            ObjectKind::TextPath => SelectionCategory::TextPath,
            ObjectKind::Bitmap => SelectionCategory::Bitmap,
            ObjectKind::Group => SelectionCategory::Group,
            ObjectKind::Pattern => SelectionCategory::Pattern,
        };

        // Open/closed only applies to objects with an outline.
        let outlined = matches!(
            self.kind,
            ObjectKind::Path | ObjectKind::TextPath | ObjectKind::Pattern
        );

        [
            Some(SelectionCategory::Object),
            Some(kind),
            (outlined && self.closed).then_some(SelectionCategory::Closed),
            (outlined && !self.closed).then_some(SelectionCategory::Open),
            self.symmetric.then_some(SelectionCategory::Symmetric),
            self.compound.then_some(SelectionCategory::Compound),
            self.distorted.then_some(SelectionCategory::Distorted),
        ]
        .into_iter()
        .flatten()
    }
}

/// Summary of the canvas selection: category flags plus optional counts.
///
/// Recomputed by the canvas whenever the selection changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    flags: SelectionFlags,
    counts: Option<[usize; CATEGORY_COUNT]>,
}

impl Selection {
    /// Selection summary with flags only; count constraints are not checked
    /// against it.
    pub fn with_flags(flags: SelectionFlags) -> Self {
        Self {
            flags,
            counts: None,
        }
    }

    /// Summary with explicit flags and per-category counts.
    pub fn with_counts(flags: SelectionFlags, counts: [usize; CATEGORY_COUNT]) -> Self {
        Self {
            flags,
            counts: Some(counts),
        }
    }

    /// Derives flags and counts from the selected objects.
    pub fn from_objects<'a, I>(objects: I) -> Self
    where
        I: IntoIterator<Item = &'a SelectedObject>,
    {
        let mut flags = SelectionFlags::EMPTY;
        let mut counts = [0usize; CATEGORY_COUNT];

        for object in objects {
            for category in object.categories() {
                flags.insert(category);
                counts[category.index()] += 1;
            }
        }

        if flags == SelectionFlags::EMPTY {
            flags = SelectionFlags::NOTHING;
        }

        Self::with_counts(flags, counts)
    }

    pub fn empty() -> Self {
        Self::from_objects(std::iter::empty())
    }

    pub fn flags(&self) -> SelectionFlags {
        self.flags
    }

    pub fn counts(&self) -> Option<&[usize; CATEGORY_COUNT]> {
        self.counts.as_ref()
    }

    pub fn count(&self, category: SelectionCategory) -> usize {
        self.counts
            .map(|counts| counts[category.index()])
            .unwrap_or(0)
    }
}
