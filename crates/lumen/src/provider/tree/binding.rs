/*!
Native binding for the tree-based API.

The host implements [`TreeBinding`] over the real automation client. Elements
are opaque [`NativeToken`]s; properties arrive in one bulk fetch so a provider
query costs a single cross-process round trip.
*/

#![allow(missing_docs)]

use std::sync::Arc;

use bitflags::bitflags;

use crate::types::{Bounds, NativeResult, NativeToken, Point, WindowHandle};

bitflags! {
  /// Control patterns an element supports.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct TreePatterns: u16 {
    const INVOKE = 1 << 0;
    const TOGGLE = 1 << 1;
    const SELECTION_ITEM = 1 << 2;
    const EXPAND_COLLAPSE = 1 << 3;
    const VALUE = 1 << 4;
    const TEXT = 1 << 5;
    const LEGACY = 1 << 6;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
  Off,
  On,
  Indeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandState {
  Collapsed,
  Expanded,
  PartiallyExpanded,
  LeafNode,
}

/// Cached properties of one element.
#[derive(Debug, Clone, Default)]
pub struct TreeProperties {
  pub control_type: i32,
  pub localized_control_type: Option<String>,
  pub name: Option<String>,
  pub help_text: Option<String>,
  pub full_description: Option<String>,
  pub value: Option<String>,
  pub framework_id: Option<String>,
  pub class_name: Option<String>,
  pub process_id: u32,
  pub bounds: Option<Bounds>,
  pub has_keyboard_focus: bool,
  pub is_keyboard_focusable: bool,
  pub is_enabled: bool,
  pub is_offscreen: bool,
  pub is_password: bool,
  /// `None` when the element has no value capability.
  pub is_value_read_only: Option<bool>,
  pub is_required_for_form: bool,
  /// `None` when the element does not report validity.
  pub is_data_valid_for_form: Option<bool>,
  pub toggle_state: Option<ToggleState>,
  pub expand_state: Option<ExpandState>,
  pub is_selected: Option<bool>,
  pub can_select_multiple: bool,
  /// Raw heading-level property (`80050` = none, `80051..=80059` = levels 1-9).
  pub heading_level: i32,
  /// Raw landmark-type property (`0` = none).
  pub landmark_type: i32,
  pub localized_landmark_type: Option<String>,
  pub aria_role: Option<String>,
  /// `key=value;` pairs as the browser reports them.
  pub aria_properties: Option<String>,
  pub position_in_set: i32,
  pub size_of_set: i32,
  pub level: i32,
  pub patterns: TreePatterns,
}

/// A native notification: event id, the changed property for property events, and the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEvent {
  pub event_id: i32,
  pub property_id: Option<i32>,
  pub element: NativeToken,
}

/// Callback the binding invokes from its own event threads.
pub type TreeEventHandler = Arc<dyn Fn(TreeEvent) + Send + Sync>;

/// Host implementation of the tree-based automation client.
pub trait TreeBinding: Send + Sync {
  /// Is the automation client present on this system?
  fn is_present(&self) -> bool;

  fn focused_element(&self) -> NativeResult<Option<NativeToken>>;
  fn element_from_point(&self, point: Point) -> NativeResult<Option<NativeToken>>;
  fn element_from_window(&self, window: WindowHandle) -> NativeResult<Option<NativeToken>>;

  // Control-view tree walker.
  fn parent(&self, element: NativeToken) -> NativeResult<Option<NativeToken>>;
  fn first_child(&self, element: NativeToken) -> NativeResult<Option<NativeToken>>;
  fn next_sibling(&self, element: NativeToken) -> NativeResult<Option<NativeToken>>;
  fn previous_sibling(&self, element: NativeToken) -> NativeResult<Option<NativeToken>>;

  fn properties(&self, element: NativeToken) -> NativeResult<TreeProperties>;

  // Patterns.
  fn invoke(&self, element: NativeToken) -> NativeResult<()>;
  fn toggle(&self, element: NativeToken) -> NativeResult<()>;
  fn select(&self, element: NativeToken) -> NativeResult<()>;
  fn expand_collapse(&self, element: NativeToken, expand: bool) -> NativeResult<()>;
  fn legacy_default_action(&self, element: NativeToken) -> NativeResult<()>;
  fn set_value(&self, element: NativeToken, value: &str) -> NativeResult<()>;
  /// Whole-document text of the text pattern.
  fn document_text(&self, element: NativeToken) -> NativeResult<Option<String>>;

  fn set_focus(&self, element: NativeToken) -> NativeResult<()>;

  fn add_event_handler(&self, handler: TreeEventHandler) -> NativeResult<()>;
  fn remove_event_handlers(&self) -> NativeResult<()>;
}
