/*!
Tree-based provider (UI Automation shape).

The automation client walks a control-view tree of elements, each with a bulk
property fetch and optional control patterns. This is the default provider for
modern native applications; it declines window classes whose tree-based proxy
is known to be worse than the handle-based API.
*/

mod binding;
pub(crate) mod mapping;

pub use binding::{
  ExpandState, ToggleState, TreeBinding, TreeEvent, TreeEventHandler, TreePatterns, TreeProperties,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::window::is_browser_class;
use super::{EventSink, ExtendedAttributes, InitOnce, NativeResultExt, Provider, WindowSystem};
use crate::object::{AccessibleObject, NativeHandle, ObjectId};
use crate::types::{ApiKind, NativeToken, Point, ProcessId, ProviderEvent, WindowHandle};

const KIND: ApiKind = ApiKind::Tree;

/// Upper bound on children read from one parent; buggy walkers can cycle.
const MAX_CHILDREN: usize = 10_000;

/// Window classes better served by the handle-based API.
const LEGACY_PREFERRED_CLASSES: &[&str] = &[
  "SysTreeView32",
  "SysListView32",
  "ComboBox",
  "msctls_progress32",
  "Edit",
  "RichEdit20W",
  "RICHEDIT50W",
  "SysMonthCal32",
  "Button",
];

/// Frameworks that render browser documents.
const BROWSER_FRAMEWORKS: &[&str] = &["Chrome", "Gecko"];

/// Provider over a [`TreeBinding`].
pub struct TreeProvider {
  me: Weak<TreeProvider>,
  binding: Arc<dyn TreeBinding>,
  windows: Arc<dyn WindowSystem>,
  init: InitOnce,
  listening: AtomicBool,
}

impl std::fmt::Debug for TreeProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TreeProvider")
      .field("initialized", &self.init.is_done())
      .field("listening", &self.listening.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}

impl TreeProvider {
  pub fn new(binding: Arc<dyn TreeBinding>, windows: Arc<dyn WindowSystem>) -> Arc<Self> {
    Arc::new_cyclic(|me| Self {
      me: me.clone(),
      binding,
      windows,
      init: InitOnce::default(),
      listening: AtomicBool::new(false),
    })
  }

  /// Build a canonical object for a native element. `None` if the element is gone.
  pub fn object_for_token(&self, token: NativeToken) -> Option<AccessibleObject> {
    let props = self.binding.properties(token).or_log(KIND)?;
    let provider: Arc<dyn Provider> = self.me.upgrade()?;
    let id = ObjectId::new(NativeHandle::Tree(token), ProcessId(props.process_id));
    let mut obj = AccessibleObject::new(id, provider);
    mapping::apply(&mut obj, &props);
    Some(obj)
  }

  const fn token(handle: &NativeHandle) -> Option<NativeToken> {
    match handle {
      NativeHandle::Tree(token) => Some(*token),
      NativeHandle::Legacy { .. } | NativeHandle::Extension { .. } | NativeHandle::Bridge(_) => None,
    }
  }

  fn walk(
    &self,
    handle: &NativeHandle,
    step: impl FnOnce(NativeToken) -> crate::types::NativeResult<Option<NativeToken>>,
  ) -> Option<AccessibleObject> {
    let token = Self::token(handle)?;
    let next = step(token).or_log(KIND).flatten()?;
    self.object_for_token(next)
  }

  fn properties(&self, handle: &NativeHandle) -> Option<(NativeToken, TreeProperties)> {
    let token = Self::token(handle)?;
    let props = self.binding.properties(token).or_log(KIND)?;
    Some((token, props))
  }

  fn on_native_event(&self, event: TreeEvent, sink: &EventSink) {
    let Some(kind) = mapping::event_kind(event.event_id, event.property_id) else {
      return;
    };
    if let Some(object) = self.object_for_token(event.element) {
      sink.emit(ProviderEvent::new(kind, object));
    }
  }
}

impl Provider for TreeProvider {
  fn kind(&self) -> ApiKind {
    KIND
  }

  fn is_available(&self) -> bool {
    self.binding.is_present()
  }

  fn initialize(&self) -> bool {
    self.init.run(|| self.binding.is_present())
  }

  fn is_initialized(&self) -> bool {
    self.init.is_done()
  }

  fn owns_window(&self, window: WindowHandle) -> bool {
    self
      .windows
      .class_name(window)
      .is_some_and(|class| !LEGACY_PREFERRED_CLASSES.contains(&class.as_str()))
  }

  fn resolve_focused(&self) -> Option<AccessibleObject> {
    let token = self.binding.focused_element().or_log(KIND).flatten()?;
    self.object_for_token(token)
  }

  fn resolve_at_point(&self, point: Point) -> Option<AccessibleObject> {
    let token = self.binding.element_from_point(point).or_log(KIND).flatten()?;
    self.object_for_token(token)
  }

  fn resolve_at_window(&self, window: WindowHandle) -> Option<AccessibleObject> {
    let token = self.binding.element_from_window(window).or_log(KIND).flatten()?;
    self.object_for_token(token)
  }

  fn parent(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    self.walk(handle, |t| self.binding.parent(t))
  }

  fn children(&self, handle: &NativeHandle) -> Vec<AccessibleObject> {
    let Some(token) = Self::token(handle) else {
      return Vec::new();
    };
    let mut children = Vec::new();
    let mut next = self.binding.first_child(token).or_log(KIND).flatten();
    while let Some(child) = next {
      if children.len() >= MAX_CHILDREN {
        log::warn!("[{KIND}] child walk of {token} exceeded {MAX_CHILDREN} children, truncating");
        break;
      }
      // A child that died mid-walk is skipped; its siblings are still reachable.
      if let Some(obj) = self.object_for_token(child) {
        children.push(obj);
      }
      next = self.binding.next_sibling(child).or_log(KIND).flatten();
    }
    children
  }

  fn next_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    self.walk(handle, |t| self.binding.next_sibling(t))
  }

  fn previous_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    self.walk(handle, |t| self.binding.previous_sibling(t))
  }

  fn set_focus(&self, handle: &NativeHandle) -> bool {
    Self::token(handle).is_some_and(|t| self.binding.set_focus(t).or_log(KIND).is_some())
  }

  fn invoke(&self, handle: &NativeHandle) -> bool {
    let Some((token, props)) = self.properties(handle) else {
      return false;
    };
    let patterns = props.patterns;
    let result = if patterns.contains(TreePatterns::INVOKE) {
      self.binding.invoke(token)
    } else if patterns.contains(TreePatterns::TOGGLE) {
      self.binding.toggle(token)
    } else if patterns.contains(TreePatterns::SELECTION_ITEM) {
      self.binding.select(token)
    } else if patterns.contains(TreePatterns::EXPAND_COLLAPSE) {
      let expand = props.expand_state != Some(ExpandState::Expanded);
      self.binding.expand_collapse(token, expand)
    } else if patterns.contains(TreePatterns::LEGACY) {
      self.binding.legacy_default_action(token)
    } else {
      log::debug!("[{KIND}] {token} has no activation pattern");
      return false;
    };
    result.or_log(KIND).is_some()
  }

  fn text(&self, handle: &NativeHandle) -> Option<String> {
    let (token, props) = self.properties(handle)?;
    if !props.patterns.contains(TreePatterns::TEXT) {
      return None;
    }
    self.binding.document_text(token).or_log(KIND).flatten()
  }

  fn set_text(&self, handle: &NativeHandle, text: &str) -> bool {
    let Some((token, props)) = self.properties(handle) else {
      return false;
    };
    if !props.patterns.contains(TreePatterns::VALUE) || props.is_value_read_only == Some(true) {
      return false;
    }
    self.binding.set_value(token, text).or_log(KIND).is_some()
  }

  fn is_browser_document(&self, handle: &NativeHandle) -> bool {
    self.properties(handle).is_some_and(|(_, props)| {
      props
        .framework_id
        .as_deref()
        .is_some_and(|f| BROWSER_FRAMEWORKS.contains(&f))
        || props.class_name.as_deref().is_some_and(is_browser_class)
    })
  }

  fn extended_attributes(&self, handle: &NativeHandle) -> Option<ExtendedAttributes> {
    if !self.is_browser_document(handle) {
      return None;
    }
    let (_, props) = self.properties(handle)?;
    Some(ExtendedAttributes::from_map(mapping::aria_attribute_map(&props)))
  }

  fn start_listening(&self, sink: EventSink) -> bool {
    if self.listening.swap(true, Ordering::SeqCst) {
      return true;
    }
    let me = self.me.clone();
    let handler: TreeEventHandler = Arc::new(move |event| {
      if let Some(provider) = me.upgrade() {
        provider.on_native_event(event, &sink);
      }
    });
    if self.binding.add_event_handler(handler).or_log(KIND).is_some() {
      true
    } else {
      self.listening.store(false, Ordering::SeqCst);
      false
    }
  }

  fn stop_listening(&self) {
    if self.listening.swap(false, Ordering::SeqCst) {
      self.binding.remove_event_handlers().or_log(KIND);
    }
  }

  fn shutdown(&self) {
    self.stop_listening();
  }
}
