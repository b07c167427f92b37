//! Registry of every action, grouped for targeted re-evaluation.

use super::action::{Action, ControlState, EditorState};
use super::keymap::{KeyBinding, Keymap};
use crate::settings::error::{FormatError, FormatErrorKind};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Group an action is filed under at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionGroup {
    /// Valid under any tool with no selection constraint
    General,
    /// Restricted to a subset of tools, no selection constraint
    ToolDependent,
    /// Depends on the selection through its mask or its count constraints
    SelectionDependent,
}

impl ActionGroup {
    pub const ALL: [ActionGroup; 3] = [
        ActionGroup::General,
        ActionGroup::ToolDependent,
        ActionGroup::SelectionDependent,
    ];

    fn classify(action: &Action) -> Self {
        if !action.selection_flags().is_any() || action.has_count_constraints() {
            ActionGroup::SelectionDependent
        } else if !action.tool_set().is_all() {
            ActionGroup::ToolDependent
        } else {
            ActionGroup::General
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// What part of the editor state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Selection,
    Tool,
    EditMode,
    Construction,
    /// Background I/O started or finished
    Io,
    /// Document opened, closed, emptied or populated
    Document,
}

impl StateChange {
    /// Groups whose enabled state may depend on this change.
    pub fn affected_groups(self) -> &'static [ActionGroup] {
        match self {
            StateChange::Selection => &[ActionGroup::SelectionDependent],
            StateChange::Tool => &[ActionGroup::ToolDependent, ActionGroup::SelectionDependent],
            StateChange::EditMode
            | StateChange::Construction
            | StateChange::Io
            | StateChange::Document => &ActionGroup::ALL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("action '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown action '{0}'")]
    Unknown(String),

    #[error("action '{0}' is not available in the current state")]
    Disabled(String),
}

/// Index of a registered action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

/// Enabled/selected state of one action, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ActionStatus {
    pub name: String,
    pub group: ActionGroup,
    #[serde(flatten)]
    pub control: ControlState,
    pub accelerator: Option<String>,
}

/// Owns every action for the lifetime of the process.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
    by_name: HashMap<String, ActionId>,
    groups: [Vec<ActionId>; 3],
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the editor's built-in commands.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for action in super::catalogue::default_actions() {
            if let Err(err) = registry.register(action) {
                warn!("Skipping built-in action: {}", err);
            }
        }
        registry
    }

    pub fn register(&mut self, action: Action) -> Result<ActionId, RegistryError> {
        if self.by_name.contains_key(action.name()) {
            return Err(RegistryError::Duplicate(action.name().to_string()));
        }

        let id = ActionId(self.actions.len());
        let group = ActionGroup::classify(&action);
        debug!("Registered action '{}' in {:?} group", action.name(), group);

        self.by_name.insert(action.name().to_string(), id);
        self.groups[group.slot()].push(id);
        self.actions.push(action);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<ActionId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.id(name).map(|id| &self.actions[id.0])
    }

    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn group_of(&self, name: &str) -> Option<ActionGroup> {
        self.get(name).map(ActionGroup::classify)
    }

    pub fn group(&self, group: ActionGroup) -> impl Iterator<Item = &Action> {
        self.groups[group.slot()]
            .iter()
            .map(|id| &self.actions[id.0])
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(Action::is_enabled)
    }

    /// Re-evaluates every action. Returns the number whose enabled state
    /// changed.
    pub fn refresh_all(&mut self, state: &EditorState) -> usize {
        self.refresh_groups(&ActionGroup::ALL, state)
    }

    /// Re-evaluates only the groups affected by `change`.
    pub fn refresh(&mut self, change: StateChange, state: &EditorState) -> usize {
        self.refresh_groups(change.affected_groups(), state)
    }

    fn refresh_groups(&mut self, groups: &[ActionGroup], state: &EditorState) -> usize {
        let mut changed = 0;
        for group in groups {
            for id in &self.groups[group.slot()] {
                if self.actions[id.0].update_enabled(state) {
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn set_selected(&mut self, name: &str, selected: bool) -> Result<(), ActionError> {
        let id = self
            .id(name)
            .ok_or_else(|| ActionError::Unknown(name.to_string()))?;
        self.actions[id.0].set_selected(selected);
        Ok(())
    }

    /// Gates execution of `name`: re-checks validity against `state`
    /// because the cached enabled flag may predate the last state change.
    pub fn invoke(&self, name: &str, state: &EditorState) -> Result<&Action, ActionError> {
        let action = self
            .get(name)
            .ok_or_else(|| ActionError::Unknown(name.to_string()))?;
        if !action.is_valid(state) {
            return Err(ActionError::Disabled(name.to_string()));
        }
        Ok(action)
    }

    /// Binds accelerators from `keymap`. Entries naming unknown actions are
    /// returned as format errors; everything else is applied.
    pub fn apply_keymap(&mut self, keymap: &Keymap) -> Vec<FormatError> {
        let mut errors = Vec::new();
        for (name, binding, line) in keymap.iter() {
            match self.id(name) {
                Some(id) => self.actions[id.0].set_accelerator(binding.cloned()),
                None => errors.push(FormatError::new(
                    line,
                    FormatErrorKind::UnknownAction(name.to_string()),
                )),
            }
        }
        errors
    }

    /// Current bindings in registration order.
    pub fn keymap(&self) -> Keymap {
        let mut keymap = Keymap::new();
        for action in &self.actions {
            if let Err(err) = keymap.bind(action.name(), action.accelerator().cloned()) {
                warn!("Dropping accelerator for '{}': {}", action.name(), err);
            }
        }
        keymap
    }

    pub fn find_by_binding(&self, binding: &KeyBinding) -> Option<&Action> {
        self.actions
            .iter()
            .find(|action| action.accelerator() == Some(binding))
    }

    pub fn statuses(&self) -> Vec<ActionStatus> {
        self.actions
            .iter()
            .map(|action| ActionStatus {
                name: action.name().to_string(),
                group: ActionGroup::classify(action),
                control: action.control(),
                accelerator: action.accelerator().map(ToString::to_string),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::flags::{
        SelectedObject, Selection, SelectionCategory, SelectionFlags, Tool, ToolSet,
    };

    fn registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        registry.register(Action::new("file.save")).unwrap();
        registry
            .register(Action::new("text.insert").tools(ToolSet::TEXT_TOOLS))
            .unwrap();
        registry
            .register(
                Action::new("edit.copy")
                    .tools(ToolSet::SELECT)
                    .selection(SelectionFlags::of(SelectionCategory::Object)),
            )
            .unwrap();
        registry
    }

    fn with_path_selected() -> EditorState {
        EditorState {
            document_empty: false,
            selection: Some(Selection::from_objects(&[SelectedObject::open_path()])),
            ..EditorState::default()
        }
    }

    #[test]
    fn actions_are_classified_into_groups() {
        let registry = registry();
        assert_eq!(registry.group_of("file.save"), Some(ActionGroup::General));
        assert_eq!(
            registry.group_of("text.insert"),
            Some(ActionGroup::ToolDependent)
        );
        assert_eq!(
            registry.group_of("edit.copy"),
            Some(ActionGroup::SelectionDependent)
        );
        assert_eq!(registry.group(ActionGroup::General).count(), 1);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry();
        assert_eq!(
            registry.register(Action::new("file.save")),
            Err(RegistryError::Duplicate("file.save".into()))
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn selection_change_only_touches_selection_group() {
        let mut registry = registry();
        let state = EditorState::default();
        registry.refresh_all(&state);
        assert!(registry.is_enabled("file.save"));
        assert!(!registry.is_enabled("edit.copy"));

        // I/O running would disable file.save, but a selection refresh never
        // looks at the general group.
        let busy = EditorState {
            io_in_progress: true,
            ..with_path_selected()
        };
        registry.refresh(StateChange::Selection, &busy);
        assert!(registry.is_enabled("file.save"));
        assert!(!registry.is_enabled("edit.copy"));

        let changed = registry.refresh(StateChange::Selection, &with_path_selected());
        assert_eq!(changed, 1);
        assert!(registry.is_enabled("edit.copy"));

        registry.refresh(StateChange::Io, &busy);
        assert!(!registry.is_enabled("file.save"));
    }

    #[test]
    fn count_constraints_make_an_action_selection_dependent() {
        use crate::actions::action::CountConstraint;

        let mut registry = ActionRegistry::new();
        registry
            .register(Action::new("transform.merge_any").tools(ToolSet::SELECT).counts(&[(
                SelectionCategory::Object,
                CountConstraint::AtLeast(2),
            )]))
            .unwrap();
        assert_eq!(
            registry.group_of("transform.merge_any"),
            Some(ActionGroup::SelectionDependent)
        );

        registry.refresh_all(&with_path_selected());
        assert!(!registry.is_enabled("transform.merge_any"));

        let two_paths = EditorState {
            document_empty: false,
            selection: Some(Selection::from_objects(&[
                SelectedObject::open_path(),
                SelectedObject::open_path(),
            ])),
            ..EditorState::default()
        };
        assert_eq!(registry.refresh(StateChange::Selection, &two_paths), 1);
        assert!(registry.is_enabled("transform.merge_any"));
    }

    #[test]
    fn tool_change_refreshes_tool_and_selection_groups() {
        let mut registry = registry();
        registry.refresh_all(&with_path_selected());
        assert!(registry.is_enabled("edit.copy"));
        assert!(!registry.is_enabled("text.insert"));

        let text_tool = EditorState {
            tool: Some(Tool::Text),
            ..with_path_selected()
        };
        assert_eq!(registry.refresh(StateChange::Tool, &text_tool), 2);
        assert!(registry.is_enabled("text.insert"));
        assert!(!registry.is_enabled("edit.copy"));
    }

    #[test]
    fn invoke_rechecks_state() {
        let registry = registry();
        assert_eq!(
            registry.invoke("edit.copy", &EditorState::default()).err(),
            Some(ActionError::Disabled("edit.copy".into()))
        );
        assert!(registry.invoke("edit.copy", &with_path_selected()).is_ok());
        assert_eq!(
            registry.invoke("edit.frobnicate", &EditorState::default()).err(),
            Some(ActionError::Unknown("edit.frobnicate".into()))
        );
    }

    #[test]
    fn keymap_binds_accelerators_and_reports_unknown_actions() {
        let mut registry = registry();
        let (keymap, errors) = Keymap::parse("edit.copy=Ctrl+C\nedit.nope=Ctrl+N\n");
        assert!(errors.is_empty());

        let errors = registry.apply_keymap(&keymap);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);

        let chord = KeyBinding::parse("ctrl+c").unwrap();
        assert_eq!(
            registry.find_by_binding(&chord).map(Action::name),
            Some("edit.copy")
        );
        assert_eq!(
            registry.keymap().get("edit.copy").flatten(),
            Some(&chord)
        );
    }

    #[test]
    fn set_selected_on_unknown_action_fails() {
        let mut registry = registry();
        assert!(registry.set_selected("file.save", true).is_ok());
        assert_eq!(
            registry.get("file.save").unwrap().control().selected,
            Some(true)
        );
        assert!(registry.set_selected("missing", true).is_err());
    }
}
