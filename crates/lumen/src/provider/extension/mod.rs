/*!
Extension provider (IAccessible2 shape).

Serves applications that register the extension proxy: browsers and office
suites. Navigation is the handle-based walk; each object is then enriched with
extended role, states, group position and object attributes. Objects that
lack the extension interface still resolve with their plain data.
*/

mod binding;
pub(crate) mod mapping;

pub use binding::{ExtensionBinding, ExtensionProperties};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::legacy::mapping as legacy_mapping;
use super::legacy::walk::{Located, Walker};
use super::legacy::{LegacyEvent, LegacyEventHandler, LegacyRef, NavDirection};
use super::window::is_browser_class;
use super::{EventSink, ExtendedAttributes, InitOnce, NativeResultExt, Provider, WindowSystem};
use crate::object::{AccessibleObject, NativeHandle, ObjectId};
use crate::types::{log_native, ApiKind, Point, ProcessId, ProviderEvent, WindowHandle};

const KIND: ApiKind = ApiKind::Extension;

/// Non-browser window classes whose applications implement the extension API.
const EXTENSION_WINDOW_CLASSES: &[&str] = &["SALFRAME", "SALTMPSUBFRAME", "SALSUBFRAME"];

/// Provider over an [`ExtensionBinding`].
pub struct ExtensionProvider {
  me: Weak<ExtensionProvider>,
  binding: Arc<dyn ExtensionBinding>,
  windows: Arc<dyn WindowSystem>,
  init: InitOnce,
  listening: AtomicBool,
}

impl std::fmt::Debug for ExtensionProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ExtensionProvider")
      .field("initialized", &self.init.is_done())
      .field("listening", &self.listening.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}

impl ExtensionProvider {
  pub fn new(binding: Arc<dyn ExtensionBinding>, windows: Arc<dyn WindowSystem>) -> Arc<Self> {
    Arc::new_cyclic(|me| Self {
      me: me.clone(),
      binding,
      windows,
      init: InitOnce::default(),
      listening: AtomicBool::new(false),
    })
  }

  fn walker(&self) -> Walker<'_, dyn ExtensionBinding> {
    Walker::new(&*self.binding, KIND)
  }

  const fn located(handle: &NativeHandle) -> Option<Located> {
    match handle {
      NativeHandle::Extension {
        window,
        child_id,
        token,
        ..
      } => Some(Located::new(*window, LegacyRef::element(*token, *child_id))),
      NativeHandle::Tree(_) | NativeHandle::Legacy { .. } | NativeHandle::Bridge(_) => None,
    }
  }

  /// Canonical object for a located reference. `None` when it is gone or defunct.
  pub(crate) fn object_at(&self, at: Located) -> Option<AccessibleObject> {
    let props = self.binding.properties(at.target).or_log(KIND)?;
    let ext = match self.binding.extension_properties(at.target) {
      Ok(ext) if mapping::is_defunct(ext.states) => {
        log::debug!("[{KIND}] {} is defunct", at.target.token);
        return None;
      }
      Ok(ext) => Some(ext),
      Err(err) if err.is_unsupported() => None,
      Err(err) => {
        log_native(&KIND.to_string(), &err);
        return None;
      }
    };

    let provider: Arc<dyn Provider> = self.me.upgrade()?;
    let pid = self.windows.process_id(at.window).unwrap_or(ProcessId(0));
    let handle = NativeHandle::Extension {
      window: at.window,
      unique_id: ext.as_ref().map_or(0, |e| e.unique_id),
      child_id: at.target.child_id,
      token: at.target.token,
    };
    let mut obj = AccessibleObject::new(ObjectId::new(handle, pid), provider);
    legacy_mapping::apply(&mut obj, &props);
    if let Some(ext) = &ext {
      mapping::apply(&mut obj, ext, props.state);
    }
    Some(obj)
  }

  fn in_browser(&self, window: WindowHandle) -> bool {
    self.windows.class_name(window).is_some_and(|c| is_browser_class(&c))
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

impl Provider for ExtensionProvider {
  fn kind(&self) -> ApiKind {
    KIND
  }

  fn is_available(&self) -> bool {
    self.binding.is_registered()
  }

  fn initialize(&self) -> bool {
    self.init.run(|| self.binding.activate().or_log(KIND).is_some())
  }

  fn is_initialized(&self) -> bool {
    self.init.is_done()
  }

  fn owns_window(&self, window: WindowHandle) -> bool {
    self.windows.class_name(window).is_some_and(|class| {
      is_browser_class(&class) || EXTENSION_WINDOW_CLASSES.contains(&class.as_str())
    })
  }

  fn resolve_focused(&self) -> Option<AccessibleObject> {
    let window = self.windows.foreground_window()?;
    if !self.owns_window(window) {
      return None;
    }
    let at = self.walker().focus_within(window)?;
    self.object_at(at)
  }

  fn resolve_at_point(&self, point: Point) -> Option<AccessibleObject> {
    let (window, target) = self.binding.object_from_point(point).or_log(KIND).flatten()?;
    if !self.owns_window(window) {
      return None;
    }
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
        .select(at.target, legacy_mapping::selflag::TAKEFOCUS)
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
    if props.default_action.as_deref().is_some_and(|a| !a.is_empty()) {
      self.binding.do_default_action(at.target).or_log(KIND).is_some()
    } else {
      false
    }
  }

  fn text(&self, handle: &NativeHandle) -> Option<String> {
    let at = Self::located(handle)?;
    match self.binding.text(at.target) {
      Ok(text) => text,
      Err(err) => {
        log_native(&KIND.to_string(), &err);
        None
      }
    }
  }

  fn set_text(&self, handle: &NativeHandle, text: &str) -> bool {
    Self::located(handle).is_some_and(|at| self.binding.replace_text(at.target, text).or_log(KIND).is_some())
  }

  fn is_browser_document(&self, handle: &NativeHandle) -> bool {
    Self::located(handle).is_some_and(|at| self.in_browser(at.window))
  }

  fn extended_attributes(&self, handle: &NativeHandle) -> Option<ExtendedAttributes> {
    let at = Self::located(handle)?;
    if !self.in_browser(at.window) {
      return None;
    }
    let ext = self.binding.extension_properties(at.target).or_log(KIND)?;
    let mut attrs = ExtendedAttributes::parse(ext.attributes.as_deref().unwrap_or_default(), ':');
    if attrs.position.is_none() {
      attrs.position = match (
        u32::try_from(ext.position_in_group),
        u32::try_from(ext.similar_items_in_group),
      ) {
        (Ok(index), Ok(size)) => crate::object::SetPosition::new(index, size),
        _ => None,
      };
    }
    Some(attrs)
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
