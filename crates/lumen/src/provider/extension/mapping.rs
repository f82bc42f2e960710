/*!
Mappings from extended roles, extended states and extension events to
canonical types. Plain role numbers fall through to the handle-based tables.
*/

use super::binding::ExtensionProperties;
use crate::a11y::{Role, StateSet};
use crate::object::{AccessibleObject, SetPosition};
use crate::provider::aria::{role_from_aria, ExtendedAttributes};
use crate::provider::legacy::mapping as legacy;
use crate::types::EventKind;

/// Extended role numbers.
pub(crate) mod role {
  pub(crate) const CANVAS: i32 = 0x401;
  pub(crate) const CAPTION: i32 = 0x402;
  pub(crate) const CHECK_MENU_ITEM: i32 = 0x403;
  pub(crate) const COLOR_CHOOSER: i32 = 0x404;
  pub(crate) const DATE_EDITOR: i32 = 0x405;
  pub(crate) const DESKTOP_ICON: i32 = 0x406;
  pub(crate) const DESKTOP_PANE: i32 = 0x407;
  pub(crate) const DIRECTORY_PANE: i32 = 0x408;
  pub(crate) const EDITBAR: i32 = 0x409;
  pub(crate) const EMBEDDED_OBJECT: i32 = 0x40A;
  pub(crate) const ENDNOTE: i32 = 0x40B;
  pub(crate) const FILE_CHOOSER: i32 = 0x40C;
  pub(crate) const FONT_CHOOSER: i32 = 0x40D;
  pub(crate) const FOOTER: i32 = 0x40E;
  pub(crate) const FOOTNOTE: i32 = 0x40F;
  pub(crate) const FORM: i32 = 0x410;
  pub(crate) const FRAME: i32 = 0x411;
  pub(crate) const HEADER: i32 = 0x413;
  pub(crate) const HEADING: i32 = 0x414;
  pub(crate) const ICON: i32 = 0x415;
  pub(crate) const IMAGE_MAP: i32 = 0x416;
  pub(crate) const INTERNAL_FRAME: i32 = 0x418;
  pub(crate) const LABEL: i32 = 0x419;
  pub(crate) const NOTE: i32 = 0x41B;
  pub(crate) const OPTION_PANE: i32 = 0x41C;
  pub(crate) const PAGE: i32 = 0x41D;
  pub(crate) const PARAGRAPH: i32 = 0x41E;
  pub(crate) const RADIO_MENU_ITEM: i32 = 0x41F;
  #[cfg(test)]
  pub(crate) const ROOT_PANE: i32 = 0x421;
  pub(crate) const RULER: i32 = 0x422;
  pub(crate) const SCROLL_PANE: i32 = 0x423;
  pub(crate) const SECTION: i32 = 0x424;
  pub(crate) const SHAPE: i32 = 0x425;
  pub(crate) const SPLIT_PANE: i32 = 0x426;
  pub(crate) const TEAR_OFF_MENU: i32 = 0x427;
  pub(crate) const TERMINAL: i32 = 0x428;
  pub(crate) const TEXT_FRAME: i32 = 0x429;
  pub(crate) const TOGGLE_BUTTON: i32 = 0x42A;
  pub(crate) const VIEW_PORT: i32 = 0x42B;
  pub(crate) const COMPLEMENTARY_CONTENT: i32 = 0x42C;
  pub(crate) const LANDMARK: i32 = 0x42D;
  pub(crate) const LEVEL_BAR: i32 = 0x42E;
  pub(crate) const BLOCK_QUOTE: i32 = 0x431;
  pub(crate) const MARK: i32 = 0x432;
  pub(crate) const SUGGESTION: i32 = 0x433;
  pub(crate) const COMMENT: i32 = 0x434;
}

/// Extended state bits.
pub(crate) mod state {
  pub(crate) const DEFUNCT: u32 = 0x4;
  pub(crate) const EDITABLE: u32 = 0x8;
  pub(crate) const HORIZONTAL: u32 = 0x10;
  pub(crate) const INVALID_ENTRY: u32 = 0x40;
  pub(crate) const MODAL: u32 = 0x100;
  pub(crate) const MULTI_LINE: u32 = 0x200;
  pub(crate) const REQUIRED: u32 = 0x800;
  pub(crate) const SINGLE_LINE: u32 = 0x2000;
  pub(crate) const STALE: u32 = 0x4000;
  pub(crate) const VERTICAL: u32 = 0x2_0000;
  pub(crate) const CHECKABLE: u32 = 0x4_0000;
}

/// Extension event ids.
pub(crate) mod event {
  pub(crate) const DOCUMENT_CONTENT_CHANGED: u32 = 0x104;
  pub(crate) const DOCUMENT_LOAD_COMPLETE: u32 = 0x105;
}

/// First extended role number; lower values are plain role numbers.
const EXTENDED_ROLE_BASE: i32 = 0x400;

/// Canonical role for an extended role number. Total: unknown numbers become `Container`.
pub(crate) const fn role_from_extended(number: i32) -> Role {
  match number {
    role::CANVAS => Role::Canvas,
    role::CAPTION => Role::Caption,
    role::CHECK_MENU_ITEM => Role::CheckMenuItem,
    role::COLOR_CHOOSER | role::FONT_CHOOSER => Role::ColorChooser,
    role::DATE_EDITOR => Role::DateEditor,
    role::DESKTOP_ICON | role::ICON => Role::Icon,
    role::DESKTOP_PANE => Role::Desktop,
    role::DIRECTORY_PANE | role::FILE_CHOOSER => Role::FileChooser,
    role::EDITBAR => Role::Edit,
    role::EMBEDDED_OBJECT => Role::EmbeddedObject,
    role::ENDNOTE | role::FOOTNOTE | role::NOTE | role::COMMENT => Role::Note,
    role::FOOTER => Role::Footer,
    role::FORM => Role::Form,
    role::FRAME => Role::Frame,
    role::HEADER => Role::Header,
    role::HEADING => Role::Heading,
    role::IMAGE_MAP | role::SHAPE => Role::Image,
    role::INTERNAL_FRAME => Role::InternalFrame,
    role::LABEL => Role::Label,
    role::OPTION_PANE => Role::Dialog,
    role::PAGE => Role::Page,
    role::PARAGRAPH => Role::Paragraph,
    role::RADIO_MENU_ITEM => Role::RadioMenuItem,
    role::RULER => Role::Ruler,
    role::SCROLL_PANE | role::VIEW_PORT => Role::ScrollPane,
    role::SECTION | role::TEXT_FRAME | role::MARK | role::SUGGESTION => Role::Section,
    role::SPLIT_PANE => Role::SplitPane,
    role::TEAR_OFF_MENU => Role::Menu,
    role::TERMINAL => Role::Terminal,
    role::TOGGLE_BUTTON => Role::ToggleButton,
    role::COMPLEMENTARY_CONTENT | role::LANDMARK => Role::Landmark,
    role::LEVEL_BAR => Role::Meter,
    role::BLOCK_QUOTE => Role::BlockQuote,
    // Glass/layered/root panes, redundant objects, input method windows and
    // content edits are layout plumbing.
    _ => Role::Container,
  }
}

/// Role for the extended role field, falling back to the plain tables below the base.
pub(crate) fn role(ext: &ExtensionProperties, legacy_state: u32) -> Role {
  if ext.role >= EXTENDED_ROLE_BASE {
    role_from_extended(ext.role)
  } else {
    legacy::role(u32::try_from(ext.role).unwrap_or(0), legacy_state)
  }
}

/// Canonical flags for the extended state bits.
pub(crate) fn states_from_bits(bits: u32) -> StateSet {
  const TABLE: &[(u32, StateSet)] = &[
    (state::EDITABLE, StateSet::EDITABLE),
    (state::HORIZONTAL, StateSet::HORIZONTAL),
    (state::INVALID_ENTRY, StateSet::INVALID),
    (state::MODAL, StateSet::MODAL),
    (state::MULTI_LINE, StateSet::MULTILINE),
    (state::REQUIRED, StateSet::REQUIRED),
    (state::SINGLE_LINE, StateSet::SINGLE_LINE),
    (state::VERTICAL, StateSet::VERTICAL),
    (state::CHECKABLE, StateSet::CHECKABLE),
  ];
  TABLE
    .iter()
    .filter(|(bit, _)| bits & bit != 0)
    .fold(StateSet::empty(), |acc, (_, flag)| acc | *flag)
}

/// Whether the object reports itself dead.
pub(crate) const fn is_defunct(bits: u32) -> bool {
  bits & (state::DEFUNCT | state::STALE) != 0
}

/// Layer extension data over an object already filled from the plain property fetch.
pub(crate) fn apply(obj: &mut AccessibleObject, ext: &ExtensionProperties, legacy_state: u32) {
  let attrs = ExtendedAttributes::parse(ext.attributes.as_deref().unwrap_or_default(), ':');

  let mut role = role(ext, legacy_state);
  if matches!(role, Role::Container | Role::Group | Role::Section) {
    if let Some(aria) = attrs.aria_role.as_deref().and_then(role_from_aria) {
      role = aria;
    }
  }
  obj.role = role;
  obj.states |= states_from_bits(ext.states);
  if role.is_checkable() {
    obj.states.insert(StateSet::CHECKABLE);
  }
  obj.landmark = attrs.landmark;
  if let Some(level) = u32::try_from(ext.group_level).ok().filter(|l| *l > 0) {
    obj.level = Some(level);
  }
  obj.position = match (
    u32::try_from(ext.position_in_group),
    u32::try_from(ext.similar_items_in_group),
  ) {
    (Ok(index), Ok(size)) => SetPosition::new(index, size),
    _ => None,
  };
  obj.attributes = attrs.raw;
}

/// Canonical event kind: extension document events, then the plain window events.
pub(crate) const fn event_kind(id: u32) -> Option<EventKind> {
  match id {
    event::DOCUMENT_LOAD_COMPLETE => Some(EventKind::DocumentLoaded),
    event::DOCUMENT_CONTENT_CHANGED => Some(EventKind::StructureChanged),
    other => legacy::event_kind(other),
  }
}
