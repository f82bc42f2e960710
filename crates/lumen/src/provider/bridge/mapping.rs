/*!
Mappings from bridge role and state vocabularies to canonical types.

The bridge reports roles and states as English strings; states arrive as one
comma-separated list.
*/

use super::binding::{BridgeContextInfo, BridgeEventKind};
use crate::a11y::{Role, StateSet};
use crate::object::AccessibleObject;
use crate::types::{Bounds, EventKind};

/// Canonical role for a bridge role string. Total: unknown strings become `Container`.
pub(crate) fn role_from_name(name: &str) -> Role {
  match name.trim() {
    "alert" => Role::Alert,
    "column header" => Role::ColumnHeader,
    "row header" => Role::RowHeader,
    "canvas" => Role::Canvas,
    "combo box" => Role::ComboBox,
    "desktop icon" | "icon" => Role::Icon,
    "internal frame" => Role::InternalFrame,
    "desktop pane" => Role::Desktop,
    "option pane" | "dialog" => Role::Dialog,
    "window" => Role::Window,
    "frame" => Role::Frame,
    "color chooser" => Role::ColorChooser,
    "directory pane" | "file chooser" => Role::FileChooser,
    "hyperlink" => Role::Link,
    "label" => Role::Label,
    "list" => Role::List,
    "list item" => Role::ListItem,
    "menu bar" => Role::MenuBar,
    "popup menu" | "menu" => Role::Menu,
    "menu item" => Role::MenuItem,
    "separator" => Role::Separator,
    "page tab list" => Role::TabList,
    "page tab" => Role::Tab,
    "panel" => Role::Pane,
    "progress bar" => Role::ProgressBar,
    "password text" => Role::PasswordEdit,
    "push button" => Role::Button,
    "toggle button" => Role::ToggleButton,
    "check box" => Role::CheckBox,
    "radio button" => Role::RadioButton,
    "scroll pane" | "viewport" => Role::ScrollPane,
    "scroll bar" => Role::ScrollBar,
    "slider" => Role::Slider,
    "split pane" => Role::SplitPane,
    "table" => Role::Table,
    "text" => Role::Edit,
    "tree" => Role::Tree,
    "tool bar" => Role::Toolbar,
    "tool tip" => Role::Tooltip,
    "status bar" => Role::StatusBar,
    "date editor" => Role::DateEditor,
    "spin box" => Role::SpinButton,
    "font chooser" => Role::ColorChooser,
    "group box" => Role::Group,
    "header" => Role::Header,
    "footer" => Role::Footer,
    "paragraph" => Role::Paragraph,
    "ruler" => Role::Ruler,
    "edit bar" => Role::Edit,
    "heading" => Role::Heading,
    // root pane, glass pane, layered pane, filler, awt/swing component, unknown, ...
    _ => Role::Container,
  }
}

/// Canonical states for a comma-separated state list.
///
/// Capability states are reported by presence, so their absence is meaningful:
/// no `enabled` means disabled, no `showing` means off screen. An empty list
/// is treated as unknown rather than as "everything absent".
pub(crate) fn states_from_list(list: &str) -> StateSet {
  let mut states = StateSet::empty();
  let mut enabled = false;
  let mut showing = false;
  let mut any = false;

  for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
    any = true;
    match token {
      "enabled" => enabled = true,
      "showing" => showing = true,
      "focused" => states.insert(StateSet::FOCUSED),
      "focusable" => states.insert(StateSet::FOCUSABLE),
      "selected" => states.insert(StateSet::SELECTED),
      "selectable" => states.insert(StateSet::SELECTABLE),
      "multiselectable" | "multi_selectable" => states.insert(StateSet::MULTISELECTABLE),
      "checked" => states.insert(StateSet::CHECKED),
      "indeterminate" => states.insert(StateSet::MIXED),
      "pressed" => states.insert(StateSet::PRESSED),
      "expanded" => states.insert(StateSet::EXPANDED),
      "collapsed" => states.insert(StateSet::COLLAPSED),
      "expandable" => states.insert(StateSet::EXPANDABLE),
      "busy" => states.insert(StateSet::BUSY),
      "editable" => states.insert(StateSet::EDITABLE),
      "modal" => states.insert(StateSet::MODAL),
      "multi_line" => states.insert(StateSet::MULTILINE),
      "single_line" => states.insert(StateSet::SINGLE_LINE),
      "horizontal" => states.insert(StateSet::HORIZONTAL),
      "vertical" => states.insert(StateSet::VERTICAL),
      other => log::trace!("ignoring bridge state {other:?}"),
    }
  }

  if any {
    states.set(StateSet::DISABLED, !enabled);
    states.set(StateSet::OFFSCREEN, !showing);
  }
  states
}

/// Role after refining the role string with states.
pub(crate) fn role(info: &BridgeContextInfo, states: StateSet) -> Role {
  match role_from_name(&info.role_en_us) {
    Role::Edit if !states.contains(StateSet::EDITABLE) => Role::StaticText,
    other => other,
  }
}

/// Fill a fresh object from one context-info call.
pub(crate) fn apply(obj: &mut AccessibleObject, info: &BridgeContextInfo) {
  let mut states = states_from_list(&info.states_en_us);
  let role = role(info, states);
  if role.is_checkable() {
    states.insert(StateSet::CHECKABLE);
  }
  if role == Role::PasswordEdit {
    states.insert(StateSet::PROTECTED);
  }
  obj.role = role;
  obj.states = states;
  obj.name = info.name.clone();
  obj.description = info.description.clone();
  obj.localized_role = Some(info.role.clone()).filter(|r| !r.is_empty());
  obj.bounds = Some(Bounds::from_location(info.x, info.y, info.width, info.height));
}

pub(crate) const fn event_kind(kind: BridgeEventKind) -> EventKind {
  match kind {
    BridgeEventKind::FocusGained => EventKind::FocusChanged,
    BridgeEventKind::NameChange => EventKind::NameChanged,
    BridgeEventKind::ValueChange => EventKind::ValueChanged,
    BridgeEventKind::StateChange => EventKind::StateChanged,
    BridgeEventKind::ChildChange => EventKind::StructureChanged,
  }
}
