//! Gateable editor commands and the applicability predicate.

use super::flags::{
    CATEGORY_COUNT, ConstructionFlags, EditFlags, Selection, SelectionCategory, SelectionFlags,
    Tool, ToolSet,
};
use super::keymap::KeyBinding;
use serde::Serialize;

/// Live editor state an action is evaluated against.
///
/// The production canvas fills this in from its own state; tests build it
/// by hand. [`Action::is_valid`] reads nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    /// Whether a canvas/document window is open
    pub canvas_open: bool,
    /// Whether the open document contains no objects
    pub document_empty: bool,
    /// Whether a background load/save/export is running
    pub io_in_progress: bool,
    /// Active tool, `None` when unknown
    pub tool: Option<Tool>,
    pub edit: EditFlags,
    pub construction: ConstructionFlags,
    pub selection: Option<Selection>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            canvas_open: true,
            document_empty: true,
            io_in_progress: false,
            tool: Some(Tool::Select),
            edit: EditFlags::NORMAL,
            construction: ConstructionFlags::NONE,
            selection: Some(Selection::empty()),
        }
    }
}

/// Constraint on the number of selected objects in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountConstraint {
    /// Count is irrelevant
    #[default]
    Any,
    /// Exactly this many
    Exactly(usize),
    /// This many or more
    AtLeast(usize),
}

impl CountConstraint {
    /// Decodes the integer encoding: `-1` any, below `-1` a minimum of
    /// `-raw`, zero or more an exact count.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => Self::Any,
            r if r < -1 => Self::AtLeast(r.unsigned_abs() as usize),
            r => Self::Exactly(r as usize),
        }
    }

    /// Encodes back to the integer form.
    ///
    /// Minimums below 2 have no encoding of their own and give `None`.
    pub fn to_raw(self) -> Option<i32> {
        match self {
            Self::Any => Some(-1),
            Self::Exactly(n) => i32::try_from(n).ok(),
            Self::AtLeast(n) if n >= 2 => i32::try_from(n).ok().map(|n| -n),
            Self::AtLeast(_) => None,
        }
    }
}

/// Enabled/selected state of the control (menu item, button) bound to an
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ControlState {
    pub enabled: bool,
    /// `None` for plain commands, `Some` for checkbox/radio/toggle controls
    pub selected: Option<bool>,
}

/// A named command that can be enabled or disabled depending on editor
/// state.
///
/// Built once at startup with the chained setters below and mutated
/// afterwards only through [`Action::update_enabled`] and
/// [`Action::set_selected`].
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    tools: ToolSet,
    edit: EditFlags,
    construction: ConstructionFlags,
    selection: SelectionFlags,
    counts: Option<[CountConstraint; CATEGORY_COUNT]>,
    requires_canvas: bool,
    valid_during_io: bool,
    requires_non_empty: bool,
    control: ControlState,
    accelerator: Option<KeyBinding>,
}

impl Action {
    /// Creates an action valid under any tool, mode and selection that needs
    /// an open canvas and is blocked while I/O is running.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tools: ToolSet::ALL,
            edit: EditFlags::ANY,
            construction: ConstructionFlags::ANY,
            selection: SelectionFlags::ANY,
            counts: None,
            requires_canvas: true,
            valid_during_io: false,
            requires_non_empty: false,
            control: ControlState::default(),
            accelerator: None,
        }
    }

    pub fn tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    pub fn edit(mut self, edit: EditFlags) -> Self {
        self.edit = edit;
        self
    }

    pub fn construction(mut self, construction: ConstructionFlags) -> Self {
        self.construction = construction;
        self
    }

    /// Restricts the action to the select tool with at least one of the given
    /// categories present.
    pub fn selection(mut self, selection: SelectionFlags) -> Self {
        self.selection = selection;
        self
    }

    /// Adds count constraints; categories not listed are unconstrained.
    pub fn counts(mut self, constraints: &[(SelectionCategory, CountConstraint)]) -> Self {
        let mut counts = self.counts.unwrap_or([CountConstraint::Any; CATEGORY_COUNT]);
        for (category, constraint) in constraints {
            counts[category.index()] = *constraint;
        }
        self.counts = Some(counts);
        self
    }

    /// Count constraints in the raw integer encoding, indexed by category.
    pub fn raw_counts(mut self, raw: [i32; CATEGORY_COUNT]) -> Self {
        self.counts = Some(raw.map(CountConstraint::from_raw));
        self
    }

    pub fn without_canvas(mut self) -> Self {
        self.requires_canvas = false;
        self
    }

    pub fn during_io(mut self) -> Self {
        self.valid_during_io = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.requires_non_empty = true;
        self
    }

    /// Marks the action as bound to a toggle control.
    pub fn toggle(mut self, selected: bool) -> Self {
        self.control.selected = Some(selected);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tool_set(&self) -> ToolSet {
        self.tools
    }

    pub fn selection_flags(&self) -> SelectionFlags {
        self.selection
    }

    /// Whether any category carries a count constraint other than `Any`.
    pub(crate) fn has_count_constraints(&self) -> bool {
        self.counts
            .is_some_and(|counts| counts.iter().any(|c| *c != CountConstraint::Any))
    }

    pub fn control(&self) -> ControlState {
        self.control
    }

    pub fn is_enabled(&self) -> bool {
        self.control.enabled
    }

    pub fn accelerator(&self) -> Option<&KeyBinding> {
        self.accelerator.as_ref()
    }

    pub(crate) fn set_accelerator(&mut self, binding: Option<KeyBinding>) {
        self.accelerator = binding;
    }

    /// Decides whether the action may be invoked in `state`.
    ///
    /// Checks run in a fixed order and stop at the first failure.
    pub fn is_valid(&self, state: &EditorState) -> bool {
        if self.requires_canvas && !state.canvas_open {
            return false;
        }

        if !self.valid_during_io && state.io_in_progress {
            return false;
        }

        if self.requires_non_empty && (!state.canvas_open || state.document_empty) {
            return false;
        }

        // An unknown tool never fails the tool check.
        if let Some(tool) = state.tool {
            if !self.tools.has(tool) {
                return false;
            }
        }

        if !state.construction.intersects(self.construction) {
            return false;
        }

        if state.tool != Some(Tool::Select) {
            return true;
        }

        let (flags, counts) = match &state.selection {
            Some(selection) => (selection.flags(), selection.counts()),
            None => (SelectionFlags::NOTHING, None),
        };

        if !state.edit.intersects(self.edit) {
            return false;
        }

        if !flags.intersects(self.selection) {
            return false;
        }

        let (Some(constraints), Some(counts)) = (&self.counts, counts) else {
            return true;
        };

        for category in SelectionCategory::ALL {
            let index = category.index();
            let constraint = constraints[index];

            if constraint == CountConstraint::Any {
                continue;
            }

            if !flags.has(category) {
                if constraint != CountConstraint::Exactly(0) {
                    return false;
                }
                continue;
            }

            let satisfied = match constraint {
                CountConstraint::AtLeast(min) => counts[index] >= min,
                CountConstraint::Exactly(n) => counts[index] == n,
                CountConstraint::Any => true,
            };

            if !satisfied {
                return false;
            }
        }

        true
    }

    /// Re-evaluates the action and stores the result on its control.
    /// Returns `true` if the enabled flag changed.
    pub fn update_enabled(&mut self, state: &EditorState) -> bool {
        let enabled = self.is_valid(state);
        let changed = self.control.enabled != enabled;
        self.control.enabled = enabled;
        changed
    }

    /// Sets the selected state of a toggle control. Plain commands become
    /// toggles the first time this is called.
    pub fn set_selected(&mut self, selected: bool) {
        self.control.selected = Some(selected);
    }
}
