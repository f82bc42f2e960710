/*!
Mappings from tree-based API ids and properties to canonical types.
*/

use std::collections::BTreeMap;

use super::binding::{ExpandState, ToggleState, TreePatterns, TreeProperties};
use crate::a11y::{Landmark, Role, StateSet};
use crate::object::{AccessibleObject, SetPosition};
use crate::provider::aria::{parse_attribute_string, role_from_aria};
use crate::types::EventKind;

/// Control type ids.
pub(crate) mod control_type {
  pub(crate) const BUTTON: i32 = 50000;
  pub(crate) const CALENDAR: i32 = 50001;
  pub(crate) const CHECK_BOX: i32 = 50002;
  pub(crate) const COMBO_BOX: i32 = 50003;
  pub(crate) const EDIT: i32 = 50004;
  pub(crate) const HYPERLINK: i32 = 50005;
  pub(crate) const IMAGE: i32 = 50006;
  pub(crate) const LIST_ITEM: i32 = 50007;
  pub(crate) const LIST: i32 = 50008;
  pub(crate) const MENU: i32 = 50009;
  pub(crate) const MENU_BAR: i32 = 50010;
  pub(crate) const MENU_ITEM: i32 = 50011;
  pub(crate) const PROGRESS_BAR: i32 = 50012;
  pub(crate) const RADIO_BUTTON: i32 = 50013;
  pub(crate) const SCROLL_BAR: i32 = 50014;
  pub(crate) const SLIDER: i32 = 50015;
  pub(crate) const SPINNER: i32 = 50016;
  pub(crate) const STATUS_BAR: i32 = 50017;
  pub(crate) const TAB: i32 = 50018;
  pub(crate) const TAB_ITEM: i32 = 50019;
  pub(crate) const TEXT: i32 = 50020;
  pub(crate) const TOOL_BAR: i32 = 50021;
  pub(crate) const TOOL_TIP: i32 = 50022;
  pub(crate) const TREE: i32 = 50023;
  pub(crate) const TREE_ITEM: i32 = 50024;
  pub(crate) const CUSTOM: i32 = 50025;
  pub(crate) const GROUP: i32 = 50026;
  pub(crate) const THUMB: i32 = 50027;
  pub(crate) const DATA_GRID: i32 = 50028;
  pub(crate) const DATA_ITEM: i32 = 50029;
  pub(crate) const DOCUMENT: i32 = 50030;
  pub(crate) const SPLIT_BUTTON: i32 = 50031;
  pub(crate) const WINDOW: i32 = 50032;
  pub(crate) const PANE: i32 = 50033;
  pub(crate) const HEADER: i32 = 50034;
  pub(crate) const HEADER_ITEM: i32 = 50035;
  pub(crate) const TABLE: i32 = 50036;
  pub(crate) const TITLE_BAR: i32 = 50037;
  pub(crate) const SEPARATOR: i32 = 50038;
  #[cfg(test)]
  pub(crate) const SEMANTIC_ZOOM: i32 = 50039;
  pub(crate) const APP_BAR: i32 = 50040;
}

/// Heading-level property values.
pub(crate) mod heading_level {
  pub(crate) const NONE: i32 = 80050;
  pub(crate) const LEVEL_1: i32 = 80051;
  pub(crate) const LEVEL_9: i32 = 80059;
}

/// Landmark-type property values.
pub(crate) mod landmark_type {
  pub(crate) const CUSTOM: i32 = 80000;
  pub(crate) const FORM: i32 = 80001;
  pub(crate) const MAIN: i32 = 80002;
  pub(crate) const NAVIGATION: i32 = 80003;
  pub(crate) const SEARCH: i32 = 80004;
}

/// Event ids.
pub(crate) mod event_id {
  pub(crate) const STRUCTURE_CHANGED: i32 = 20002;
  pub(crate) const PROPERTY_CHANGED: i32 = 20004;
  pub(crate) const FOCUS_CHANGED: i32 = 20005;
  pub(crate) const ASYNC_CONTENT_LOADED: i32 = 20006;
}

/// Property ids carried by property-changed events.
pub(crate) mod property_id {
  pub(crate) const NAME: i32 = 30005;
  pub(crate) const IS_ENABLED: i32 = 30010;
  pub(crate) const VALUE: i32 = 30045;
  pub(crate) const EXPAND_COLLAPSE_STATE: i32 = 30070;
  pub(crate) const IS_SELECTED: i32 = 30079;
  pub(crate) const TOGGLE_STATE: i32 = 30086;
}

/// Canonical role for a bare control type id. Total: unknown ids become `Container`.
pub(super) const fn role_from_control_type(id: i32) -> Role {
  match id {
    control_type::BUTTON => Role::Button,
    control_type::CALENDAR => Role::Calendar,
    control_type::CHECK_BOX => Role::CheckBox,
    control_type::COMBO_BOX => Role::ComboBox,
    control_type::EDIT => Role::Edit,
    control_type::HYPERLINK => Role::Link,
    control_type::IMAGE => Role::Image,
    control_type::LIST_ITEM | control_type::DATA_ITEM => Role::ListItem,
    control_type::LIST => Role::List,
    control_type::MENU => Role::Menu,
    control_type::MENU_BAR => Role::MenuBar,
    control_type::MENU_ITEM => Role::MenuItem,
    control_type::PROGRESS_BAR => Role::ProgressBar,
    control_type::RADIO_BUTTON => Role::RadioButton,
    control_type::SCROLL_BAR => Role::ScrollBar,
    control_type::SLIDER => Role::Slider,
    control_type::SPINNER => Role::SpinButton,
    control_type::STATUS_BAR => Role::StatusBar,
    control_type::TAB => Role::TabList,
    control_type::TAB_ITEM => Role::Tab,
    control_type::TEXT => Role::StaticText,
    control_type::TOOL_BAR | control_type::APP_BAR => Role::Toolbar,
    control_type::TOOL_TIP => Role::Tooltip,
    control_type::TREE => Role::Tree,
    control_type::TREE_ITEM => Role::TreeItem,
    control_type::GROUP => Role::Group,
    control_type::THUMB => Role::Grip,
    control_type::DATA_GRID => Role::DataGrid,
    control_type::DOCUMENT => Role::Document,
    control_type::SPLIT_BUTTON => Role::SplitButton,
    control_type::WINDOW => Role::Window,
    control_type::PANE => Role::Pane,
    control_type::HEADER => Role::Header,
    control_type::HEADER_ITEM => Role::ColumnHeader,
    control_type::TABLE => Role::Table,
    control_type::TITLE_BAR => Role::TitleBar,
    control_type::SEPARATOR => Role::Separator,
    // Custom and semantic zoom carry no semantics of their own.
    _ => Role::Container,
  }
}

/// Structured heading level, when the element reports one.
pub(super) fn structured_heading_level(raw: i32) -> Option<u8> {
  if (heading_level::LEVEL_1..=heading_level::LEVEL_9).contains(&raw) {
    u8::try_from(raw - heading_level::NONE).ok()
  } else {
    None
  }
}

/// Landmark from the landmark-type property. Custom landmarks are named regions.
pub(super) const fn landmark_from_type(raw: i32) -> Option<Landmark> {
  match raw {
    landmark_type::CUSTOM => Some(Landmark::Region),
    landmark_type::FORM => Some(Landmark::Form),
    landmark_type::MAIN => Some(Landmark::Main),
    landmark_type::NAVIGATION => Some(Landmark::Navigation),
    landmark_type::SEARCH => Some(Landmark::Search),
    _ => None,
  }
}

/// Role after refining the control type with the other properties.
pub(super) fn role(props: &TreeProperties) -> Role {
  let base = role_from_control_type(props.control_type);

  if structured_heading_level(props.heading_level).is_some() {
    return Role::Heading;
  }
  if props.landmark_type != 0 {
    return Role::Landmark;
  }

  match base {
    Role::Edit if props.is_password => Role::PasswordEdit,
    Role::Button if props.patterns.contains(TreePatterns::TOGGLE) => Role::ToggleButton,
    Role::MenuItem if props.patterns.contains(TreePatterns::TOGGLE) => Role::CheckMenuItem,
    Role::Group | Role::Container | Role::StaticText | Role::List => props
      .aria_role
      .as_deref()
      .and_then(role_from_aria)
      .unwrap_or(base),
    other => other,
  }
}

/// Canonical states from the cached properties.
pub(super) fn states(props: &TreeProperties, role: Role) -> StateSet {
  let mut states = StateSet::empty();
  states.set(StateSet::FOCUSED, props.has_keyboard_focus);
  states.set(StateSet::FOCUSABLE, props.is_keyboard_focusable);
  states.set(StateSet::DISABLED, !props.is_enabled);
  states.set(StateSet::OFFSCREEN, props.is_offscreen);
  states.set(StateSet::PROTECTED, props.is_password);
  states.set(StateSet::REQUIRED, props.is_required_for_form);
  states.set(StateSet::INVALID, props.is_data_valid_for_form == Some(false));
  states.set(StateSet::MULTISELECTABLE, props.can_select_multiple);
  states.set(StateSet::LINKED, props.control_type == control_type::HYPERLINK);

  match props.is_value_read_only {
    Some(true) => states.insert(StateSet::READ_ONLY),
    Some(false) if role.is_text_input() => states.insert(StateSet::EDITABLE),
    Some(false) | None => {}
  }

  if let Some(toggle) = props.toggle_state {
    let on_flag = if role == Role::ToggleButton {
      StateSet::PRESSED
    } else {
      StateSet::CHECKABLE | StateSet::CHECKED
    };
    match toggle {
      ToggleState::On => states.insert(on_flag),
      ToggleState::Indeterminate => states.insert(StateSet::CHECKABLE | StateSet::MIXED),
      ToggleState::Off if role != Role::ToggleButton => states.insert(StateSet::CHECKABLE),
      ToggleState::Off => {}
    }
  }

  match props.expand_state {
    Some(ExpandState::Expanded | ExpandState::PartiallyExpanded) => {
      states.insert(StateSet::EXPANDABLE | StateSet::EXPANDED);
    }
    Some(ExpandState::Collapsed) => states.insert(StateSet::EXPANDABLE | StateSet::COLLAPSED),
    Some(ExpandState::LeafNode) | None => {}
  }

  if let Some(selected) = props.is_selected {
    states.insert(StateSet::SELECTABLE);
    states.set(StateSet::SELECTED, selected);
  }

  states
}

/// Fill a fresh object from cached properties.
pub(super) fn apply(obj: &mut AccessibleObject, props: &TreeProperties) {
  let role = role(props);
  obj.role = role;
  obj.localized_role = props.localized_control_type.clone();
  obj.states = states(props, role);
  obj.name = props.name.clone();
  obj.value = props.value.clone();
  obj.help = props.help_text.clone();
  obj.description = props.full_description.clone();
  obj.bounds = props.bounds;
  obj.landmark = landmark_from_type(props.landmark_type);
  obj.structured_heading_level = structured_heading_level(props.heading_level);
  obj.position = match (u32::try_from(props.position_in_set), u32::try_from(props.size_of_set)) {
    (Ok(index), Ok(size)) => SetPosition::new(index, size),
    _ => None,
  };
  obj.level = u32::try_from(props.level).ok().filter(|l| *l > 0);
  obj.attributes = aria_attribute_map(props);
}

/// ARIA properties plus the explicit ARIA role, as one map.
pub(super) fn aria_attribute_map(props: &TreeProperties) -> BTreeMap<String, String> {
  let mut map = props
    .aria_properties
    .as_deref()
    .map(|s| parse_attribute_string(s, '='))
    .unwrap_or_default();
  if let Some(role) = props.aria_role.as_deref().filter(|r| !r.is_empty()) {
    map.entry("role".to_owned()).or_insert_with(|| role.to_owned());
  }
  map
}

/// Canonical event kind for a native event. `None` for events nobody consumes.
pub(super) const fn event_kind(event: i32, property: Option<i32>) -> Option<EventKind> {
  match (event, property) {
    (event_id::FOCUS_CHANGED, _) => Some(EventKind::FocusChanged),
    (event_id::STRUCTURE_CHANGED, _) => Some(EventKind::StructureChanged),
    (event_id::ASYNC_CONTENT_LOADED, _) => Some(EventKind::DocumentLoaded),
    (event_id::PROPERTY_CHANGED, Some(property_id::NAME)) => Some(EventKind::NameChanged),
    (event_id::PROPERTY_CHANGED, Some(property_id::VALUE)) => Some(EventKind::ValueChanged),
    (
      event_id::PROPERTY_CHANGED,
      Some(
        property_id::TOGGLE_STATE
        | property_id::EXPAND_COLLAPSE_STATE
        | property_id::IS_ENABLED
        | property_id::IS_SELECTED,
      ),
    ) => Some(EventKind::StateChanged),
    _ => None,
  }
}
