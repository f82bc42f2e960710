/*!
Native binding for the handle-based API.

Objects are addressed as a full object plus a child id. Child id `0` means the
object itself; any other id names a simple element that only exists relative
to its parent object.
*/

#![allow(missing_docs)]

use std::sync::Arc;

use crate::object::CHILD_ID_SELF;
use crate::types::{NativeResult, NativeToken, Point, WindowHandle};

/// A full object plus child id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyRef {
  pub token: NativeToken,
  pub child_id: i32,
}

impl LegacyRef {
  pub const fn object(token: NativeToken) -> Self {
    Self {
      token,
      child_id: CHILD_ID_SELF,
    }
  }

  pub const fn element(token: NativeToken, child_id: i32) -> Self {
    Self { token, child_id }
  }

  pub const fn is_simple(&self) -> bool {
    self.child_id != CHILD_ID_SELF
  }
}

/// One entry returned by a child enumeration or navigation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyChild {
  /// A full object in its own right.
  Object(NativeToken),
  /// A simple element, relative to the object that was asked.
  Element(i32),
}

/// Navigation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
  Next,
  Previous,
}

/// Everything one property round trip returns.
#[derive(Debug, Clone, Default)]
pub struct LegacyProperties {
  pub name: Option<String>,
  pub value: Option<String>,
  pub description: Option<String>,
  pub help: Option<String>,
  pub default_action: Option<String>,
  /// Numeric role; `0` when the server reports a string role instead.
  pub role: u32,
  /// Localized role text, or the server's own string role.
  pub role_text: Option<String>,
  pub state: u32,
  /// `(left, top, width, height)`.
  pub location: Option<(i32, i32, i32, i32)>,
}

/// A window event as the hook reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyEvent {
  pub event: u32,
  pub window: WindowHandle,
  pub object_id: i32,
  pub child_id: i32,
}

pub type LegacyEventHandler = Arc<dyn Fn(LegacyEvent) + Send + Sync>;

/// Host implementation of the handle-based API.
pub trait LegacyBinding: Send + Sync {
  fn is_present(&self) -> bool;

  /// Client-area object of a window.
  fn object_from_window(&self, window: WindowHandle) -> NativeResult<Option<NativeToken>>;
  fn object_from_point(&self, point: Point) -> NativeResult<Option<(WindowHandle, LegacyRef)>>;
  /// Resolve the source of a window event.
  fn object_from_event(
    &self,
    window: WindowHandle,
    object_id: i32,
    child_id: i32,
  ) -> NativeResult<Option<LegacyRef>>;
  fn window_from_object(&self, token: NativeToken) -> NativeResult<Option<WindowHandle>>;

  /// The focused child of an object, if any.
  fn focus(&self, token: NativeToken) -> NativeResult<Option<LegacyChild>>;
  fn parent(&self, token: NativeToken) -> NativeResult<Option<NativeToken>>;
  fn children(&self, token: NativeToken) -> NativeResult<Vec<LegacyChild>>;
  /// Spatial/logical navigation. Many servers report "not implemented".
  fn navigate(&self, from: LegacyRef, direction: NavDirection) -> NativeResult<Option<LegacyChild>>;

  fn properties(&self, target: LegacyRef) -> NativeResult<LegacyProperties>;

  fn do_default_action(&self, target: LegacyRef) -> NativeResult<()>;
  fn select(&self, target: LegacyRef, flags: u32) -> NativeResult<()>;
  fn set_value(&self, target: LegacyRef, value: &str) -> NativeResult<()>;

  fn set_event_hook(&self, handler: LegacyEventHandler) -> NativeResult<()>;
  fn remove_event_hook(&self) -> NativeResult<()>;
}
