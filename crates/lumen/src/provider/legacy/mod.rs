/*!
Handle-based provider (MSAA shape).

The universal fallback: every window with a class name has a client object, so
this provider owns any live window. Simple elements (non-self child ids) exist
only relative to their parent object and have no children of their own.
*/

mod binding;
pub(crate) mod mapping;
pub(crate) mod walk;

pub use binding::{
  LegacyBinding, LegacyChild, LegacyEvent, LegacyEventHandler, LegacyProperties, LegacyRef,
  NavDirection,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::{EventSink, InitOnce, NativeResultExt, Provider, WindowSystem};
use crate::a11y::StateSet;
use crate::object::{AccessibleObject, NativeHandle, ObjectId};
use crate::types::{ApiKind, Point, ProcessId, ProviderEvent, WindowHandle};
use walk::{Located, Walker};

const KIND: ApiKind = ApiKind::Legacy;

/// Provider over a [`LegacyBinding`].
pub struct LegacyProvider {
  me: Weak<LegacyProvider>,
  binding: Arc<dyn LegacyBinding>,
  windows: Arc<dyn WindowSystem>,
  init: InitOnce,
  listening: AtomicBool,
}

impl std::fmt::Debug for LegacyProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LegacyProvider")
      .field("initialized", &self.init.is_done())
      .field("listening", &self.listening.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}

impl LegacyProvider {
  pub fn new(binding: Arc<dyn LegacyBinding>, windows: Arc<dyn WindowSystem>) -> Arc<Self> {
    Arc::new_cyclic(|me| Self {
      me: me.clone(),
      binding,
      windows,
      init: InitOnce::default(),
      listening: AtomicBool::new(false),
    })
  }

  /// Canonical object for a located reference. `None` if it no longer resolves.
  pub(crate) fn object_at(&self, at: Located) -> Option<AccessibleObject> {
    let props = self.binding.properties(at.target).or_log(KIND)?;
    let provider: Arc<dyn Provider> = self.me.upgrade()?;
    let pid = self.windows.process_id(at.window).unwrap_or(ProcessId(0));
    let handle = NativeHandle::Legacy {
      window: at.window,
      child_id: at.target.child_id,
      token: at.target.token,
    };
    let mut obj = AccessibleObject::new(ObjectId::new(handle, pid), provider);
    mapping::apply(&mut obj, &props);
    Some(obj)
  }

  fn walker(&self) -> Walker<'_, dyn LegacyBinding> {
    Walker::new(&*self.binding, KIND)
  }

  const fn located(handle: &NativeHandle) -> Option<Located> {
    match handle {
      NativeHandle::Legacy {
        window,
        child_id,
        token,
      } => Some(Located::new(*window, LegacyRef::element(*token, *child_id))),
      NativeHandle::Tree(_) | NativeHandle::Extension { .. } | NativeHandle::Bridge(_) => None,
    }
  }

  fn on_native_event(&self, event: LegacyEvent, sink: &EventSink) {
    let Some(kind) = mapping::event_kind(event.event) else {
      return;
    };
    let target = self
      .binding
      .object_from_event(event.window, event.object_id, event.child_id)
      .or_log(KIND)
      .flatten();
    if let Some(object) = target.and_then(|t| self.object_at(Located::new(event.window, t))) {
      sink.emit(ProviderEvent::new(kind, object));
    }
  }
}

impl Provider for LegacyProvider {
  fn kind(&self) -> ApiKind {
    KIND
  }

  fn is_available(&self) -> bool {
    self.binding.is_present()
  }

  fn initialize(&self) -> bool {
    self.init.run(|| true)
  }

  fn is_initialized(&self) -> bool {
    self.init.is_done()
  }

  fn owns_window(&self, window: WindowHandle) -> bool {
    self.windows.class_name(window).is_some()
  }

  fn resolve_focused(&self) -> Option<AccessibleObject> {
    let window = self.windows.foreground_window()?;
    let at = self.walker().focus_within(window)?;
    self.object_at(at)
  }

  fn resolve_at_point(&self, point: Point) -> Option<AccessibleObject> {
    let (window, target) = self.binding.object_from_point(point).or_log(KIND).flatten()?;
    self.object_at(Located::new(window, target))
  }

  fn resolve_at_window(&self, window: WindowHandle) -> Option<AccessibleObject> {
    let token = self.binding.object_from_window(window).or_log(KIND).flatten()?;
    self.object_at(Located::new(window, LegacyRef::object(token)))
  }

  fn parent(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    let at = Self::located(handle)?;
    self.object_at(self.walker().parent(at)?)
  }

  fn children(&self, handle: &NativeHandle) -> Vec<AccessibleObject> {
    let Some(at) = Self::located(handle) else {
      return Vec::new();
    };
    self
      .walker()
      .children(at)
      .into_iter()
      .filter_map(|child| self.object_at(child))
      .collect()
  }

  fn next_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    let at = Self::located(handle)?;
    self.object_at(self.walker().sibling(at, NavDirection::Next)?)
  }

  fn previous_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    let at = Self::located(handle)?;
    self.object_at(self.walker().sibling(at, NavDirection::Previous)?)
  }

  fn set_focus(&self, handle: &NativeHandle) -> bool {
    Self::located(handle).is_some_and(|at| {
      self
        .binding
        .select(at.target, mapping::selflag::TAKEFOCUS)
        .or_log(KIND)
        .is_some()
    })
  }

  fn invoke(&self, handle: &NativeHandle) -> bool {
    let Some(at) = Self::located(handle) else {
      return false;
    };
    let Some(props) = self.binding.properties(at.target).or_log(KIND) else {
      return false;
    };
    let result = if props.default_action.as_deref().is_some_and(|a| !a.is_empty()) {
      self.binding.do_default_action(at.target)
    } else if mapping::states_from_bits(props.state).contains(StateSet::SELECTABLE) {
      self
        .binding
        .select(at.target, mapping::selflag::TAKEFOCUS | mapping::selflag::TAKESELECTION)
    } else {
      return false;
    };
    result.or_log(KIND).is_some()
  }

  fn text(&self, _handle: &NativeHandle) -> Option<String> {
    None
  }

  fn set_text(&self, handle: &NativeHandle, text: &str) -> bool {
    let Some(at) = Self::located(handle) else {
      return false;
    };
    let Some(props) = self.binding.properties(at.target).or_log(KIND) else {
      return false;
    };
    let role = mapping::role(props.role, props.state);
    if !role.is_text_input() || props.state & mapping::state::READONLY != 0 {
      return false;
    }
    self.binding.set_value(at.target, text).or_log(KIND).is_some()
  }

  fn start_listening(&self, sink: EventSink) -> bool {
    if self.listening.swap(true, Ordering::SeqCst) {
      return true;
    }
    let me = self.me.clone();
    let handler: LegacyEventHandler = Arc::new(move |event| {
      if let Some(provider) = me.upgrade() {
        provider.on_native_event(event, &sink);
      }
    });
    if self.binding.set_event_hook(handler).or_log(KIND).is_some() {
      true
    } else {
      self.listening.store(false, Ordering::SeqCst);
      false
    }
  }

  fn stop_listening(&self) {
    if self.listening.swap(false, Ordering::SeqCst) {
      self.binding.remove_event_hook().or_log(KIND);
    }
  }

  fn shutdown(&self) {
    self.stop_listening();
  }
}
