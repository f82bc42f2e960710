/*!
Provider abstraction.

One [`Provider`] per native accessibility API family. A provider checks its own
availability, binds to the native layer, decides cheaply whether it owns a
window or handle, and turns native references into [`AccessibleObject`]s.

Providers never let a native failure escape: every binding call returns a
`NativeResult`, and the provider boundary logs the failure (with the call and
status) and turns it into `None`/`false`/empty. A failing provider must not stop
the dispatcher from trying the next one.

# Module Structure

- `mod.rs` - `Provider` trait, `EventSink`, init-once helper
- `aria.rs` - ARIA-equivalent extended attributes
- `window.rs` - `WindowSystem`, the window-manager seam
- `tree/` - tree-based API (UI Automation shape)
- `legacy/` - handle/child-id API (MSAA shape)
- `extension/` - extension API (IAccessible2 shape)
- `bridge/` - managed-runtime bridge (Java Access Bridge shape)
*/

mod aria;
pub mod bridge;
pub mod extension;
pub mod legacy;
pub mod tree;
mod window;

use async_broadcast::Sender;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::dispatch::FilterChain;
use crate::object::{AccessibleObject, NativeHandle};
use crate::types::{log_native, ApiKind, NativeResult, Point, ProviderEvent, WindowHandle};

pub use aria::{parse_attribute_string, role_from_aria, ExtendedAttributes};
pub use bridge::{BridgeBinding, BridgeContext, BridgeProvider};
pub use extension::{ExtensionBinding, ExtensionProvider};
pub use legacy::{LegacyBinding, LegacyProvider};
pub use tree::{TreeBinding, TreeProvider};
pub use window::WindowSystem;

/// Contract every accessibility API family implements.
///
/// All methods are infallible: absence of a capability, a stale
/// handle and a native failure all come back as `None`/`false`/empty.
pub trait Provider: Send + Sync {
  /// The API family this provider speaks.
  fn kind(&self) -> ApiKind;

  /// Cheap, side-effect-free check. Unknown or ambiguous state is `false`.
  fn is_available(&self) -> bool;

  /// Bind to the native entry points. Idempotent: after the first success
  /// later calls return `true` without re-binding.
  fn initialize(&self) -> bool;

  /// Whether `initialize()` has succeeded.
  fn is_initialized(&self) -> bool;

  /// Fast compatibility check: does this provider own the given window?
  fn owns_window(&self, window: WindowHandle) -> bool;

  /// Whether the handle belongs to this provider, without resolving it.
  fn supports_node(&self, handle: &NativeHandle) -> bool {
    handle.api() == self.kind()
  }

  /// The OS-reported focused element, if it lies in this provider's domain.
  fn resolve_focused(&self) -> Option<AccessibleObject>;

  /// Hit test at a screen point.
  fn resolve_at_point(&self, point: Point) -> Option<AccessibleObject>;

  /// The root object of a window.
  fn resolve_at_window(&self, window: WindowHandle) -> Option<AccessibleObject>;

  // === Lazy navigation (re-queried on every call) ===

  fn parent(&self, handle: &NativeHandle) -> Option<AccessibleObject>;

  fn children(&self, handle: &NativeHandle) -> Vec<AccessibleObject>;

  fn next_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject>;

  fn previous_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject>;

  // === Capabilities ===

  /// Move focus. Returns whether anything was attempted.
  fn set_focus(&self, handle: &NativeHandle) -> bool;

  /// Activate via the most specific capability available. Returns whether anything was attempted.
  fn invoke(&self, handle: &NativeHandle) -> bool;

  /// Structured text content.
  fn text(&self, handle: &NativeHandle) -> Option<String>;

  /// Replace text/value. Returns whether anything was attempted.
  fn set_text(&self, handle: &NativeHandle, text: &str) -> bool;

  /// Whether the handle lives in a browser-class document.
  fn is_browser_document(&self, _handle: &NativeHandle) -> bool {
    false
  }

  /// ARIA-equivalent attributes. Only browser-class providers return anything.
  fn extended_attributes(&self, _handle: &NativeHandle) -> Option<ExtendedAttributes> {
    None
  }

  // === Events ===

  /// Subscribe to native focus/structure notifications; canonical events go to `sink`.
  fn start_listening(&self, sink: EventSink) -> bool;

  fn stop_listening(&self);

  /// Release native bindings. Only called on explicit shutdown.
  fn shutdown(&self) {}
}

/// Destination for canonical events. Cheap to clone; safe to use from any thread.
#[derive(Clone)]
pub struct EventSink {
  tx: Sender<ProviderEvent>,
  filters: FilterChain,
}

impl std::fmt::Debug for EventSink {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("EventSink").finish_non_exhaustive()
  }
}

impl EventSink {
  pub(crate) const fn new(tx: Sender<ProviderEvent>, filters: FilterChain) -> Self {
    Self { tx, filters }
  }

  /// Emit an event after running the object through the filter chain.
  pub fn emit(&self, mut event: ProviderEvent) {
    event.object = self.filters.apply(event.object);
    match self.tx.try_broadcast(event) {
      Ok(None) => {}
      Ok(Some(dropped)) => log::error!(
        "Event channel overflow - dropped oldest {:?} event. \
         Consider increasing the event capacity or processing events faster.",
        dropped.kind
      ),
      Err(e) if e.is_full() => log::error!("Event channel full - event dropped"),
      Err(e) => log::trace!("Event not delivered: {e}"),
    }
  }
}

/// Load-once guard for native bindings.
///
/// Successful initialization is cached until [`reset`](Self::reset); a failed
/// attempt may be retried. Concurrent callers are serialized so the binding
/// step never runs twice at once.
#[derive(Debug, Default)]
pub(crate) struct InitOnce {
  done: AtomicBool,
  lock: Mutex<()>,
}

impl InitOnce {
  pub(crate) fn run(&self, bind: impl FnOnce() -> bool) -> bool {
    if self.is_done() {
      return true;
    }
    let _guard = self.lock.lock();
    if self.is_done() {
      return true;
    }
    let bound = bind();
    self.done.store(bound, Ordering::Release);
    bound
  }

  pub(crate) fn is_done(&self) -> bool {
    self.done.load(Ordering::Acquire)
  }

  /// Forget a successful initialization. Returns whether there was one to forget.
  pub(crate) fn reset(&self) -> bool {
    let _guard = self.lock.lock();
    self.done.swap(false, Ordering::AcqRel)
  }
}

/// Boundary conversion: log a native failure and drop it.
pub(crate) trait NativeResultExt<T> {
  fn or_log(self, provider: ApiKind) -> Option<T>;
}

impl<T> NativeResultExt<T> for NativeResult<T> {
  fn or_log(self, provider: ApiKind) -> Option<T> {
    match self {
      Ok(value) => Some(value),
      Err(err) => {
        log_native(&provider.to_string(), &err);
        None
      }
    }
  }
}
