//! Command applicability engine.
//!
//! Every menu item and toolbar button is backed by an [`Action`] that knows
//! which tools, edit modes, constructions and selections it tolerates. The
//! [`ActionRegistry`] keeps the enabled state of all actions in step with the
//! editor, re-evaluating only the groups a given [`StateChange`] can affect.

pub mod action;
pub mod catalogue;
pub mod flags;
pub mod keymap;
pub mod registry;

pub use action::{Action, ControlState, CountConstraint, EditorState};
pub use flags::{
    CATEGORY_COUNT, ConstructionFlags, EditFlags, ObjectKind, SelectedObject, Selection,
    SelectionCategory, SelectionFlags, Tool, ToolSet,
};
pub use keymap::{KeyBinding, Keymap};
pub use registry::{
    ActionError, ActionGroup, ActionId, ActionRegistry, ActionStatus, RegistryError, StateChange,
};
