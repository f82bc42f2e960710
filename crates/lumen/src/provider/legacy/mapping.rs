/*!
Mappings from handle-based API role numbers, state bits and window events to
canonical types. The extension provider builds on these: its roles and states
extend the same numeric spaces.
*/

use crate::a11y::{Role, StateSet};
use crate::object::AccessibleObject;
use crate::types::{Bounds, EventKind};

use super::binding::LegacyProperties;

/// Role numbers.
pub(crate) mod role {
  pub(crate) const TITLEBAR: u32 = 1;
  pub(crate) const MENUBAR: u32 = 2;
  pub(crate) const SCROLLBAR: u32 = 3;
  pub(crate) const GRIP: u32 = 4;
  #[cfg(test)]
  pub(crate) const SOUND: u32 = 5;
  pub(crate) const CURSOR: u32 = 6;
  pub(crate) const CARET: u32 = 7;
  pub(crate) const ALERT: u32 = 8;
  pub(crate) const WINDOW: u32 = 9;
  #[cfg(test)]
  pub(crate) const CLIENT: u32 = 10;
  pub(crate) const MENUPOPUP: u32 = 11;
  pub(crate) const MENUITEM: u32 = 12;
  pub(crate) const TOOLTIP: u32 = 13;
  pub(crate) const APPLICATION: u32 = 14;
  pub(crate) const DOCUMENT: u32 = 15;
  pub(crate) const PANE: u32 = 16;
  pub(crate) const CHART: u32 = 17;
  pub(crate) const DIALOG: u32 = 18;
  #[cfg(test)]
  pub(crate) const BORDER: u32 = 19;
  pub(crate) const GROUPING: u32 = 20;
  pub(crate) const SEPARATOR: u32 = 21;
  pub(crate) const TOOLBAR: u32 = 22;
  pub(crate) const STATUSBAR: u32 = 23;
  pub(crate) const TABLE: u32 = 24;
  pub(crate) const COLUMNHEADER: u32 = 25;
  pub(crate) const ROWHEADER: u32 = 26;
  pub(crate) const COLUMN: u32 = 27;
  pub(crate) const ROW: u32 = 28;
  pub(crate) const CELL: u32 = 29;
  pub(crate) const LINK: u32 = 30;
  pub(crate) const HELPBALLOON: u32 = 31;
  pub(crate) const CHARACTER: u32 = 32;
  pub(crate) const LIST: u32 = 33;
  pub(crate) const LISTITEM: u32 = 34;
  pub(crate) const OUTLINE: u32 = 35;
  pub(crate) const OUTLINEITEM: u32 = 36;
  pub(crate) const PAGETAB: u32 = 37;
  pub(crate) const PROPERTYPAGE: u32 = 38;
  pub(crate) const INDICATOR: u32 = 39;
  pub(crate) const GRAPHIC: u32 = 40;
  pub(crate) const STATICTEXT: u32 = 41;
  pub(crate) const TEXT: u32 = 42;
  pub(crate) const PUSHBUTTON: u32 = 43;
  pub(crate) const CHECKBUTTON: u32 = 44;
  pub(crate) const RADIOBUTTON: u32 = 45;
  pub(crate) const COMBOBOX: u32 = 46;
  pub(crate) const DROPLIST: u32 = 47;
  pub(crate) const PROGRESSBAR: u32 = 48;
  pub(crate) const DIAL: u32 = 49;
  pub(crate) const HOTKEYFIELD: u32 = 50;
  pub(crate) const SLIDER: u32 = 51;
  pub(crate) const SPINBUTTON: u32 = 52;
  pub(crate) const DIAGRAM: u32 = 53;
  pub(crate) const ANIMATION: u32 = 54;
  pub(crate) const EQUATION: u32 = 55;
  pub(crate) const BUTTONDROPDOWN: u32 = 56;
  pub(crate) const BUTTONMENU: u32 = 57;
  pub(crate) const BUTTONDROPDOWNGRID: u32 = 58;
  #[cfg(test)]
  pub(crate) const WHITESPACE: u32 = 59;
  pub(crate) const PAGETABLIST: u32 = 60;
  pub(crate) const CLOCK: u32 = 61;
  pub(crate) const SPLITBUTTON: u32 = 62;
  pub(crate) const IPADDRESS: u32 = 63;
  pub(crate) const OUTLINEBUTTON: u32 = 64;
}

/// State bits.
pub(crate) mod state {
  pub(crate) const UNAVAILABLE: u32 = 0x1;
  pub(crate) const SELECTED: u32 = 0x2;
  pub(crate) const FOCUSED: u32 = 0x4;
  pub(crate) const PRESSED: u32 = 0x8;
  pub(crate) const CHECKED: u32 = 0x10;
  pub(crate) const MIXED: u32 = 0x20;
  pub(crate) const READONLY: u32 = 0x40;
  pub(crate) const HOTTRACKED: u32 = 0x80;
  pub(crate) const DEFAULT: u32 = 0x100;
  pub(crate) const EXPANDED: u32 = 0x200;
  pub(crate) const COLLAPSED: u32 = 0x400;
  pub(crate) const BUSY: u32 = 0x800;
  pub(crate) const ANIMATED: u32 = 0x4000;
  pub(crate) const INVISIBLE: u32 = 0x8000;
  pub(crate) const OFFSCREEN: u32 = 0x1_0000;
  pub(crate) const FOCUSABLE: u32 = 0x10_0000;
  pub(crate) const SELECTABLE: u32 = 0x20_0000;
  pub(crate) const LINKED: u32 = 0x40_0000;
  pub(crate) const TRAVERSED: u32 = 0x80_0000;
  pub(crate) const MULTISELECTABLE: u32 = 0x100_0000;
  pub(crate) const EXTSELECTABLE: u32 = 0x200_0000;
  pub(crate) const PROTECTED: u32 = 0x2000_0000;
  pub(crate) const HASPOPUP: u32 = 0x4000_0000;
}

/// Window event ids.
pub(crate) mod event {
  pub(crate) const SYSTEM_FOREGROUND: u32 = 0x0003;
  pub(crate) const OBJECT_CREATE: u32 = 0x8000;
  #[cfg(test)]
  pub(crate) const OBJECT_DESTROY: u32 = 0x8001;
  pub(crate) const OBJECT_REORDER: u32 = 0x8004;
  pub(crate) const OBJECT_FOCUS: u32 = 0x8005;
  pub(crate) const OBJECT_STATECHANGE: u32 = 0x800A;
  pub(crate) const OBJECT_NAMECHANGE: u32 = 0x800C;
  pub(crate) const OBJECT_VALUECHANGE: u32 = 0x800E;
}

/// Selection flags.
pub(crate) mod selflag {
  pub(crate) const TAKEFOCUS: u32 = 0x1;
  pub(crate) const TAKESELECTION: u32 = 0x2;
}

/// Canonical role for a role number. Total: unknown numbers become `Container`.
pub(crate) const fn role_from_number(number: u32) -> Role {
  match number {
    role::TITLEBAR => Role::TitleBar,
    role::MENUBAR => Role::MenuBar,
    role::SCROLLBAR => Role::ScrollBar,
    role::GRIP => Role::Grip,
    role::CURSOR => Role::Cursor,
    role::CARET => Role::Caret,
    role::ALERT | role::HELPBALLOON => Role::Alert,
    role::WINDOW => Role::Window,
    role::MENUPOPUP => Role::Menu,
    role::MENUITEM => Role::MenuItem,
    role::TOOLTIP => Role::Tooltip,
    role::APPLICATION => Role::Application,
    role::DOCUMENT => Role::Document,
    role::PANE | role::PROPERTYPAGE => Role::Pane,
    role::CHART | role::DIAGRAM => Role::Chart,
    role::DIALOG => Role::Dialog,
    role::GROUPING => Role::Group,
    role::SEPARATOR => Role::Separator,
    role::TOOLBAR => Role::Toolbar,
    role::STATUSBAR => Role::StatusBar,
    role::TABLE => Role::Table,
    role::COLUMNHEADER => Role::ColumnHeader,
    role::ROWHEADER => Role::RowHeader,
    role::COLUMN => Role::Column,
    role::ROW => Role::Row,
    role::CELL => Role::Cell,
    role::LINK => Role::Link,
    role::LIST => Role::List,
    role::LISTITEM => Role::ListItem,
    role::OUTLINE => Role::Tree,
    role::OUTLINEITEM => Role::TreeItem,
    role::PAGETAB => Role::Tab,
    role::INDICATOR => Role::Indicator,
    role::GRAPHIC => Role::Image,
    role::STATICTEXT | role::CHARACTER => Role::StaticText,
    role::TEXT | role::HOTKEYFIELD | role::IPADDRESS => Role::Edit,
    role::PUSHBUTTON => Role::Button,
    role::CHECKBUTTON => Role::CheckBox,
    role::RADIOBUTTON => Role::RadioButton,
    role::COMBOBOX => Role::ComboBox,
    role::DROPLIST | role::BUTTONDROPDOWN | role::BUTTONDROPDOWNGRID => Role::DropDownButton,
    role::PROGRESSBAR => Role::ProgressBar,
    role::DIAL | role::SLIDER => Role::Slider,
    role::SPINBUTTON => Role::SpinButton,
    role::ANIMATION => Role::Animation,
    role::EQUATION => Role::Equation,
    role::BUTTONMENU => Role::MenuButton,
    role::PAGETABLIST => Role::TabList,
    role::CLOCK => Role::Timer,
    role::SPLITBUTTON => Role::SplitButton,
    role::OUTLINEBUTTON => Role::ToggleButton,
    // Sound, client, border, whitespace and string roles carry no semantics.
    _ => Role::Container,
  }
}

/// Canonical states for a state bit mask.
pub(crate) fn states_from_bits(bits: u32) -> StateSet {
  const TABLE: &[(u32, StateSet)] = &[
    (state::UNAVAILABLE, StateSet::DISABLED),
    (state::SELECTED, StateSet::SELECTED),
    (state::FOCUSED, StateSet::FOCUSED),
    (state::PRESSED, StateSet::PRESSED),
    (state::CHECKED, StateSet::CHECKED),
    (state::MIXED, StateSet::MIXED),
    (state::READONLY, StateSet::READ_ONLY),
    (state::HOTTRACKED, StateSet::HOT_TRACKED),
    (state::DEFAULT, StateSet::DEFAULT),
    (state::EXPANDED, StateSet::EXPANDED),
    (state::COLLAPSED, StateSet::COLLAPSED),
    (state::BUSY, StateSet::BUSY),
    (state::ANIMATED, StateSet::ANIMATED),
    (state::INVISIBLE, StateSet::INVISIBLE),
    (state::OFFSCREEN, StateSet::OFFSCREEN),
    (state::FOCUSABLE, StateSet::FOCUSABLE),
    (state::SELECTABLE, StateSet::SELECTABLE),
    (state::LINKED, StateSet::LINKED),
    (state::TRAVERSED, StateSet::TRAVERSED),
    (state::MULTISELECTABLE, StateSet::MULTISELECTABLE),
    (state::EXTSELECTABLE, StateSet::MULTISELECTABLE),
    (state::PROTECTED, StateSet::PROTECTED),
    (state::HASPOPUP, StateSet::HAS_POPUP),
  ];

  let mut states = StateSet::empty();
  for (bit, flag) in TABLE {
    if bits & bit != 0 {
      states.insert(*flag);
    }
  }
  if states.intersects(StateSet::EXPANDED | StateSet::COLLAPSED) {
    states.insert(StateSet::EXPANDABLE);
  }
  states
}

/// Role after refining the number with state bits.
pub(crate) fn role(number: u32, bits: u32) -> Role {
  match role_from_number(number) {
    Role::Edit if bits & state::PROTECTED != 0 => Role::PasswordEdit,
    // Read-only, unfocusable text fields are labels in practice.
    Role::Edit if bits & state::READONLY != 0 && bits & state::FOCUSABLE == 0 => Role::StaticText,
    other => other,
  }
}

/// Canonical states, refined by role.
pub(crate) fn states(bits: u32, role: Role) -> StateSet {
  let mut states = states_from_bits(bits);
  if role.is_checkable() {
    states.insert(StateSet::CHECKABLE);
  }
  if role == Role::Link && states.contains(StateSet::TRAVERSED) {
    states.insert(StateSet::VISITED);
  }
  if role.is_text_input() && !states.contains(StateSet::READ_ONLY) {
    states.insert(StateSet::EDITABLE);
  }
  states
}

/// Attributes shared by both handle-based providers.
#[derive(Debug, Clone, Default)]
pub(crate) struct CommonAttributes {
  pub(crate) role: Role,
  pub(crate) states: StateSet,
  pub(crate) value: Option<String>,
  pub(crate) level: Option<u32>,
  pub(crate) bounds: Option<Bounds>,
}

/// Interpret one property fetch.
///
/// Tree-view items report their nesting level as their value; it becomes the
/// level and the value is dropped.
pub(crate) fn common(props: &LegacyProperties) -> CommonAttributes {
  let role = role(props.role, props.state);
  let states = states(props.state, role);
  let (value, level) = match (role, props.value.as_deref()) {
    (Role::TreeItem, Some(v)) => match v.trim().parse::<u32>() {
      Ok(level) => (None, Some(level + 1)),
      Err(_) => (props.value.clone(), None),
    },
    _ => (props.value.clone(), None),
  };
  CommonAttributes {
    role,
    states,
    value,
    level,
    bounds: props
      .location
      .map(|(left, top, width, height)| Bounds::from_location(left, top, width, height)),
  }
}

/// Fill a fresh object from one property fetch.
pub(crate) fn apply(obj: &mut AccessibleObject, props: &LegacyProperties) {
  let common = common(props);
  obj.role = common.role;
  obj.states = common.states;
  obj.value = common.value;
  obj.level = common.level;
  obj.bounds = common.bounds;
  obj.name = props.name.clone();
  obj.description = props.description.clone();
  obj.help = props.help.clone();
  obj.localized_role = props.role_text.clone();
}

/// Canonical event kind for a window event id.
pub(crate) const fn event_kind(id: u32) -> Option<EventKind> {
  match id {
    event::OBJECT_FOCUS | event::SYSTEM_FOREGROUND => Some(EventKind::FocusChanged),
    event::OBJECT_REORDER | event::OBJECT_CREATE => Some(EventKind::StructureChanged),
    event::OBJECT_NAMECHANGE => Some(EventKind::NameChanged),
    event::OBJECT_VALUECHANGE => Some(EventKind::ValueChanged),
    event::OBJECT_STATECHANGE => Some(EventKind::StateChanged),
    // The source of a destroy event can no longer be resolved.
    _ => None,
  }
}
