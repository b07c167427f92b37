//! Built-in editor commands.

use super::action::{Action, CountConstraint};
use super::flags::{ConstructionFlags, EditFlags, SelectionCategory, SelectionFlags, Tool, ToolSet};
use super::keymap::{KeyBinding, Keymap};
use log::warn;
use SelectionCategory::*;

fn exactly(category: SelectionCategory, n: usize) -> (SelectionCategory, CountConstraint) {
    (category, CountConstraint::Exactly(n))
}

fn at_least(category: SelectionCategory, n: usize) -> (SelectionCategory, CountConstraint) {
    (category, CountConstraint::AtLeast(n))
}

/// Command that needs the select tool and some objects of `categories`.
fn on_selection(name: &str, categories: &[SelectionCategory]) -> Action {
    Action::new(name)
        .tools(ToolSet::SELECT)
        .selection(SelectionFlags::any_of(categories))
}

/// Path editing commands, only available in path-edit mode.
fn path_edit(name: &str) -> Action {
    on_selection(name, &[Path])
        .edit(EditFlags::PATH_EDIT)
        .counts(&[exactly(Object, 1)])
}

/// Every command the editor registers at startup.
pub fn default_actions() -> Vec<Action> {
    let mut actions = vec![
        // File
        Action::new("file.new").without_canvas(),
        Action::new("file.open").without_canvas(),
        Action::new("file.save").construction(ConstructionFlags::NONE),
        Action::new("file.save_as").construction(ConstructionFlags::NONE),
        Action::new("file.export")
            .non_empty()
            .construction(ConstructionFlags::NONE),
        Action::new("file.print").non_empty(),
        Action::new("file.close"),
        Action::new("file.quit").without_canvas().during_io(),
        Action::new("help.about").without_canvas().during_io(),
        Action::new("settings.preferences").without_canvas(),
        // Edit
        Action::new("edit.undo").construction(ConstructionFlags::NONE),
        Action::new("edit.redo").construction(ConstructionFlags::NONE),
        Action::new("edit.select_all").tools(ToolSet::SELECT).non_empty(),
        Action::new("edit.paste").tools(ToolSet::SELECT),
        on_selection("edit.deselect_all", &[Object]),
        on_selection("edit.cut", &[Object]),
        on_selection("edit.copy", &[Object]),
        on_selection("edit.delete", &[Object]),
        on_selection("edit.move_to_front", &[Object]),
        on_selection("edit.move_to_back", &[Object]),
        on_selection("edit.text", &[Text, TextPath]).counts(&[exactly(Object, 1)]),
        on_selection("edit.path", &[Path, TextPath])
            .edit(EditFlags::NORMAL | EditFlags::PATH_EDIT)
            .counts(&[exactly(Object, 1)])
            .toggle(false),
        on_selection("edit.distort", &[Object])
            .edit(EditFlags::NORMAL | EditFlags::DISTORT)
            .counts(&[exactly(Bitmap, 0), exactly(Group, 0)])
            .toggle(false),
        // Path edit mode
        path_edit("path.add_point"),
        path_edit("path.delete_point"),
        path_edit("path.convert_to_line"),
        path_edit("path.convert_to_curve"),
        path_edit("path.convert_to_move"),
        // Transform
        on_selection("transform.rotate", &[Object]),
        on_selection("transform.scale", &[Object]),
        on_selection("transform.shear", &[Object]),
        on_selection("transform.align", &[Object]).counts(&[at_least(Object, 2)]),
        on_selection("transform.distribute", &[Object]).counts(&[at_least(Object, 3)]),
        on_selection("transform.group", &[Object]).counts(&[at_least(Object, 2)]),
        on_selection("transform.ungroup", &[Group]),
        on_selection("transform.reverse_path", &[Path, TextPath]),
        on_selection("transform.merge_paths", &[Path]).counts(&[
            at_least(Path, 2),
            exactly(Text, 0),
            exactly(TextPath, 0),
            exactly(Bitmap, 0),
            exactly(Group, 0),
        ]),
        on_selection("transform.union", &[Closed]).counts(&[
            at_least(Closed, 2),
            exactly(Open, 0),
        ]),
        on_selection("transform.subtract", &[Closed]).counts(&[
            at_least(Closed, 2),
            exactly(Open, 0),
        ]),
        on_selection("transform.split_compound", &[Compound]),
        on_selection("transform.close_path", &[Open]),
        on_selection("transform.open_path", &[Closed]),
        on_selection("transform.split_text", &[Text]),
        on_selection("transform.convert_to_path", &[Text, TextPath]),
        on_selection("transform.text_on_path", &[Text]).counts(&[
            exactly(Object, 2),
            exactly(Text, 1),
            exactly(Path, 1),
        ]),
        on_selection("transform.separate", &[TextPath]),
        on_selection("transform.pattern.create", &[Path, Text, Group])
            .counts(&[exactly(Object, 1)]),
        on_selection("transform.pattern.remove", &[Pattern]),
        on_selection("transform.symmetry.add", &[Path]).counts(&[exactly(Symmetric, 0)]),
        on_selection("transform.symmetry.remove", &[Symmetric]),
        on_selection("transform.distortion.remove", &[Distorted]),
        // Construction in progress
        Action::new("construct.finish")
            .tools(ToolSet::PATH_TOOLS)
            .construction(ConstructionFlags::GEOMETRIC | ConstructionFlags::NON_GEOMETRIC),
        Action::new("construct.gap")
            .tools(ToolSet::PATH_TOOLS)
            .construction(ConstructionFlags::GEOMETRIC),
        Action::new("construct.abandon")
            .tools(ToolSet::PATH_TOOLS | ToolSet::TEXT_TOOLS)
            .construction(
                ConstructionFlags::GEOMETRIC
                    | ConstructionFlags::NON_GEOMETRIC
                    | ConstructionFlags::TEXT,
            ),
        Action::new("text.insert_symbol")
            .tools(ToolSet::TEXT_TOOLS)
            .construction(ConstructionFlags::TEXT),
        // View
        Action::new("view.show_grid").toggle(false),
        Action::new("view.lock_grid").toggle(false),
        Action::new("view.show_rulers").toggle(true),
        Action::new("view.zoom_in"),
        Action::new("view.zoom_out"),
    ];

    actions.extend(
        Tool::ALL
            .into_iter()
            .map(|tool| {
                Action::new(format!("tool.{}", tool.name().replace('-', "_")))
                    .toggle(tool == Tool::Select)
            }),
    );

    actions
}

const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("file.new", "Ctrl+N"),
    ("file.open", "Ctrl+O"),
    ("file.save", "Ctrl+S"),
    ("file.save_as", "Ctrl+Shift+S"),
    ("file.export", "Ctrl+E"),
    ("file.print", "Ctrl+P"),
    ("file.close", "Ctrl+W"),
    ("file.quit", "Ctrl+Q"),
    ("edit.undo", "Ctrl+Z"),
    ("edit.redo", "Ctrl+Y"),
    ("edit.select_all", "Ctrl+A"),
    ("edit.deselect_all", "Ctrl+Shift+A"),
    ("edit.cut", "Ctrl+X"),
    ("edit.copy", "Ctrl+C"),
    ("edit.paste", "Ctrl+V"),
    ("edit.delete", "Delete"),
    ("edit.path", "Ctrl+Shift+P"),
    ("transform.group", "Ctrl+G"),
    ("transform.ungroup", "Ctrl+U"),
    ("construct.finish", "Enter"),
    ("construct.gap", "M"),
    ("construct.abandon", "Escape"),
    ("view.show_grid", "Ctrl+Shift+G"),
    ("view.zoom_in", "Ctrl++"),
    ("view.zoom_out", "Ctrl+-"),
    ("tool.select", "F1"),
    ("tool.open_line", "F2"),
    ("tool.closed_line", "F3"),
    ("tool.open_curve", "F4"),
    ("tool.closed_curve", "F5"),
    ("tool.rectangle", "F6"),
    ("tool.ellipse", "F7"),
    ("tool.text", "F8"),
    ("tool.math", "F9"),
];

/// Accelerators used when the user has no bindings file.
pub fn default_keymap() -> Keymap {
    let mut keymap = Keymap::new();
    for (action, binding) in DEFAULT_BINDINGS {
        let bound = KeyBinding::parse(binding)
            .map_err(|err| err.to_string())
            .and_then(|binding| keymap.bind(*action, Some(binding)).map_err(|err| err.to_string()));
        if let Err(err) = bound {
            warn!("Skipping built-in binding for '{}': {}", action, err);
        }
    }
    keymap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::action::EditorState;
    use crate::actions::flags::{ObjectKind, SelectedObject, Selection};
    use crate::actions::registry::{ActionGroup, ActionRegistry};

    fn state_with(objects: &[SelectedObject]) -> EditorState {
        EditorState {
            document_empty: objects.is_empty(),
            selection: Some(Selection::from_objects(objects)),
            ..EditorState::default()
        }
    }

    #[test]
    fn defaults_register_without_duplicates() {
        let registry = ActionRegistry::with_defaults();
        assert_eq!(registry.len(), default_actions().len());
        for group in ActionGroup::ALL {
            assert!(registry.group(group).count() > 0, "{group:?} is empty");
        }
    }

    #[test]
    fn default_bindings_name_real_actions() {
        let mut registry = ActionRegistry::with_defaults();
        let keymap = default_keymap();
        assert_eq!(keymap.len(), DEFAULT_BINDINGS.len());
        assert!(registry.apply_keymap(&keymap).is_empty());

        let zoom = KeyBinding::parse("Ctrl++").unwrap();
        assert_eq!(
            registry.find_by_binding(&zoom).map(|a| a.name()),
            Some("view.zoom_in")
        );
    }

    #[test]
    fn merge_requires_two_plain_paths() {
        let registry = ActionRegistry::with_defaults();
        let text = SelectedObject::new(ObjectKind::Text);
        let path = SelectedObject::open_path();

        assert!(registry.invoke("transform.merge_paths", &state_with(&[path])).is_err());
        assert!(registry.invoke("transform.merge_paths", &state_with(&[path, path])).is_ok());
        assert!(
            registry
                .invoke("transform.merge_paths", &state_with(&[path, path, text]))
                .is_err()
        );
    }

    #[test]
    fn text_on_path_needs_one_of_each() {
        let registry = ActionRegistry::with_defaults();
        let text = SelectedObject::new(ObjectKind::Text);
        let path = SelectedObject::closed_path();

        assert!(registry.invoke("transform.text_on_path", &state_with(&[text, path])).is_ok());
        assert!(
            registry
                .invoke("transform.text_on_path", &state_with(&[text, text]))
                .is_err()
        );
    }

    #[test]
    fn path_edit_commands_follow_edit_mode() {
        let registry = ActionRegistry::with_defaults();
        let mut state = state_with(&[SelectedObject::open_path()]);
        assert!(registry.invoke("path.add_point", &state).is_err());
        state.edit = EditFlags::PATH_EDIT;
        assert!(registry.invoke("path.add_point", &state).is_ok());
        // Commands without an edit restriction stay available.
        assert!(registry.invoke("edit.copy", &state).is_ok());
        assert!(registry.invoke("edit.distort", &state).is_err());
    }

    #[test]
    fn finishing_a_shape_needs_a_construction() {
        let registry = ActionRegistry::with_defaults();
        let mut state = EditorState {
            tool: Some(Tool::OpenCurve),
            ..EditorState::default()
        };
        assert!(registry.invoke("construct.finish", &state).is_err());
        state.construction = ConstructionFlags::GEOMETRIC;
        assert!(registry.invoke("construct.finish", &state).is_ok());
        assert!(registry.invoke("file.save", &state).is_err());
    }
}
