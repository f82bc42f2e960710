/*!
Native binding for the managed-runtime bridge.

Every [`BridgeObject`] the binding hands out is a reference held on behalf of
this process inside the remote VM and must be released exactly once. The
provider wraps each one in a `BridgeContext` immediately; nothing else in the
crate sees raw objects.
*/

#![allow(missing_docs)]

use std::sync::Arc;

use crate::types::{NativeResult, Point, WindowHandle};

/// A VM id plus an object reference inside that VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BridgeObject {
  pub vm_id: i32,
  pub context: i64,
}

/// Everything one context-info call returns.
#[derive(Debug, Clone, Default)]
pub struct BridgeContextInfo {
  pub name: Option<String>,
  pub description: Option<String>,
  /// Localized role text.
  pub role: String,
  /// Role in the fixed English vocabulary.
  pub role_en_us: String,
  /// Comma-separated states in the fixed English vocabulary.
  pub states_en_us: String,
  pub index_in_parent: i32,
  pub children_count: i32,
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
  pub accessible_text: bool,
  pub accessible_value: bool,
  pub accessible_action: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEventKind {
  FocusGained,
  NameChange,
  ValueChange,
  StateChange,
  ChildChange,
}

/// A bridge notification. The binding transfers ownership of `source` to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeEvent {
  pub kind: BridgeEventKind,
  pub window: Option<WindowHandle>,
  pub source: BridgeObject,
}

pub type BridgeEventHandler = Arc<dyn Fn(BridgeEvent) + Send + Sync>;

/// Host implementation of the bridge.
pub trait BridgeBinding: Send + Sync {
  /// Is the bridge library installed? May block; callers time-box it.
  fn is_installed(&self) -> bool;
  /// Load the library and resolve its entry points.
  fn load(&self) -> NativeResult<()>;
  fn unload(&self);

  fn is_java_window(&self, window: WindowHandle) -> bool;

  fn context_from_window(&self, window: WindowHandle) -> NativeResult<Option<BridgeObject>>;
  fn context_with_focus(&self, window: WindowHandle) -> NativeResult<Option<BridgeObject>>;
  fn context_at(&self, parent: BridgeObject, point: Point) -> NativeResult<Option<BridgeObject>>;

  fn context_info(&self, object: BridgeObject) -> NativeResult<BridgeContextInfo>;
  fn child(&self, object: BridgeObject, index: i32) -> NativeResult<Option<BridgeObject>>;
  fn parent(&self, object: BridgeObject) -> NativeResult<Option<BridgeObject>>;

  fn text(&self, object: BridgeObject) -> NativeResult<Option<String>>;
  fn current_value(&self, object: BridgeObject) -> NativeResult<Option<String>>;
  fn actions(&self, object: BridgeObject) -> NativeResult<Vec<String>>;
  fn do_action(&self, object: BridgeObject, action: &str) -> NativeResult<()>;
  fn request_focus(&self, object: BridgeObject) -> NativeResult<()>;
  fn set_text_contents(&self, object: BridgeObject, text: &str) -> NativeResult<()>;

  /// Release a VM-side reference.
  fn release(&self, object: BridgeObject);

  fn set_event_handler(&self, handler: BridgeEventHandler) -> NativeResult<()>;
  fn clear_event_handler(&self);
}
