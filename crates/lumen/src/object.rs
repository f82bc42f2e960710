/*!
The canonical accessible object.

An [`AccessibleObject`] is a point-in-time, provider-agnostic view of one UI
element. It is cheap to clone and never cached by identity: the OS gives no
stable cross-call identity, so every query builds a fresh one.

Relationships are not stored. `parent()`, `children()` and the sibling
accessors ask the owning provider again each time, because the native tree can
change (or the element can die) between any two calls. A dead element yields
`None`/empty rather than an error.
*/

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::a11y::{Landmark, Role, StateSet};
use crate::provider::{BridgeContext, ExtendedAttributes, Provider};
use crate::types::{ApiKind, Bounds, NativeToken, ProcessId, WindowHandle};

/// Child id meaning "the object itself" in the handle/child-id API.
pub const CHILD_ID_SELF: i32 = 0;

/// A native reference, one shape per API family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeHandle {
  /// Element of the tree-based API.
  Tree(NativeToken),
  /// `(window, child id)` pair of the handle-based API; `token` names the
  /// parent object the child id is relative to.
  Legacy {
    window: WindowHandle,
    child_id: i32,
    token: NativeToken,
  },
  /// Extension API object, addressable by its unique id within the window.
  /// Simple elements that are not full objects carry a non-self `child_id`
  /// relative to `token`, exactly like the handle-based shape.
  Extension {
    window: WindowHandle,
    unique_id: i32,
    child_id: i32,
    token: NativeToken,
  },
  /// Managed-bridge context. Released once, when the last clone drops.
  Bridge(BridgeContext),
}

impl NativeHandle {
  /// The API family this handle belongs to.
  pub const fn api(&self) -> ApiKind {
    match self {
      Self::Tree(_) => ApiKind::Tree,
      Self::Legacy { .. } => ApiKind::Legacy,
      Self::Extension { .. } => ApiKind::Extension,
      Self::Bridge(_) => ApiKind::Bridge,
    }
  }
}

/// Identity of a canonical object. Only meaningful while the native handle is alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectId {
  pub api: ApiKind,
  pub handle: NativeHandle,
  pub pid: ProcessId,
  /// Child id for objects that are not full objects themselves.
  pub child_id: Option<i32>,
}

impl ObjectId {
  pub fn new(handle: NativeHandle, pid: ProcessId) -> Self {
    let child_id = match &handle {
      NativeHandle::Legacy { child_id, .. } | NativeHandle::Extension { child_id, .. }
        if *child_id != CHILD_ID_SELF =>
      {
        Some(*child_id)
      }
      NativeHandle::Legacy { .. }
      | NativeHandle::Extension { .. }
      | NativeHandle::Tree(_)
      | NativeHandle::Bridge(_) => None,
    };
    Self {
      api: handle.api(),
      handle,
      pid,
      child_id,
    }
  }
}

/// Position of an item within its set (1-based index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetPosition {
  pub index: u32,
  pub size: u32,
}

impl SetPosition {
  /// Build a position, rejecting the zero/out-of-range values native APIs use for "unknown".
  pub const fn new(index: u32, size: u32) -> Option<Self> {
    if index == 0 || size == 0 || index > size {
      None
    } else {
      Some(Self { index, size })
    }
  }
}

impl fmt::Display for SetPosition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} of {}", self.index, self.size)
  }
}

/// One UI element in provider-agnostic shape.
#[derive(Clone)]
pub struct AccessibleObject {
  id: ObjectId,
  provider: Arc<dyn Provider>,

  // === Text properties ===
  pub name: Option<String>,
  pub description: Option<String>,
  pub value: Option<String>,
  pub help: Option<String>,

  // === Semantics ===
  pub role: Role,
  /// Role text as the native API spells it (localized), when it reports one.
  pub localized_role: Option<String>,
  pub states: StateSet,
  pub landmark: Option<Landmark>,

  // === Geometry ===
  pub bounds: Option<Bounds>,

  // === Grouping ===
  pub position: Option<SetPosition>,
  /// Nesting level (tree items, nested lists). 1-based.
  pub level: Option<u32>,
  /// Heading level the API reports as structured data rather than text.
  pub structured_heading_level: Option<u8>,

  /// Free-form extension metadata (object attributes, ARIA properties).
  pub attributes: BTreeMap<String, String>,
}

impl fmt::Debug for AccessibleObject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AccessibleObject")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("role", &self.role)
      .field("states", &self.states)
      .finish_non_exhaustive()
  }
}

impl AccessibleObject {
  /// Create an object with empty attributes. Providers fill in the rest.
  pub fn new(id: ObjectId, provider: Arc<dyn Provider>) -> Self {
    Self {
      id,
      provider,
      name: None,
      description: None,
      value: None,
      help: None,
      role: Role::Unknown,
      localized_role: None,
      states: StateSet::empty(),
      landmark: None,
      bounds: None,
      position: None,
      level: None,
      structured_heading_level: None,
      attributes: BTreeMap::new(),
    }
  }

  pub const fn id(&self) -> &ObjectId {
    &self.id
  }

  pub const fn api(&self) -> ApiKind {
    self.id.api
  }

  pub const fn handle(&self) -> &NativeHandle {
    &self.id.handle
  }

  pub const fn pid(&self) -> ProcessId {
    self.id.pid
  }

  /// The provider that produced this object and answers its lazy queries.
  pub fn provider(&self) -> &Arc<dyn Provider> {
    &self.provider
  }

  /// Whether `other` refers to the same native element (same provider, same handle).
  pub fn same_element(&self, other: &AccessibleObject) -> bool {
    self.id == other.id
  }

  // === Lazy hierarchy ===

  pub fn parent(&self) -> Option<AccessibleObject> {
    self.provider.parent(self.handle())
  }

  pub fn children(&self) -> Vec<AccessibleObject> {
    self.provider.children(self.handle())
  }

  pub fn next_sibling(&self) -> Option<AccessibleObject> {
    self.provider.next_sibling(self.handle())
  }

  pub fn previous_sibling(&self) -> Option<AccessibleObject> {
    self.provider.previous_sibling(self.handle())
  }

  // === Capabilities ===

  /// Move keyboard focus here. Returns whether anything was attempted.
  pub fn set_focus(&self) -> bool {
    self.provider.set_focus(self.handle())
  }

  /// Activate the element via the most specific capability it has
  /// (invoke, toggle, selection, default action). Returns whether anything was attempted.
  pub fn invoke(&self) -> bool {
    self.provider.invoke(self.handle())
  }

  /// Structured text content, when the element exposes a text capability.
  pub fn text(&self) -> Option<String> {
    self.provider.text(self.handle())
  }

  /// Replace the element's text/value. Returns whether anything was attempted.
  pub fn set_text(&self, text: &str) -> bool {
    self.provider.set_text(self.handle(), text)
  }

  /// Whether this object sits in a browser-class document, where extended
  /// (ARIA-equivalent) attributes are worth their cross-process cost.
  pub fn is_browser_document(&self) -> bool {
    self.provider.is_browser_document(self.handle())
  }

  /// ARIA-equivalent attributes. `None` outside browser-class documents.
  pub fn extended_attributes(&self) -> Option<ExtendedAttributes> {
    self.provider.extended_attributes(self.handle())
  }

  // === Narration ===

  /// Spoken role text.
  pub fn role_text(&self) -> Cow<'static, str> {
    self.role.text()
  }

  /// Spoken state text for the current state snapshot.
  pub fn state_text(&self) -> String {
    self.states.announcement_parts(self.role).join(" ")
  }

  /// Heading level, or the nesting level for tree items. `None` when neither applies.
  fn level_part(&self) -> Option<u32> {
    match self.role {
      Role::Heading => {
        let level = crate::buffer::resolve_heading_level(self, None);
        (level > 0).then_some(u32::from(level))
      }
      Role::TreeItem => self.level,
      _ => None,
    }
  }

  /// Full announcement: name, role/landmark, heading level, set position, state, value.
  pub fn announcement(&self) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(name) = non_empty(self.name.as_deref()) {
      parts.push(name.to_owned());
    }

    if let Some(landmark) = self.landmark {
      parts.push(landmark.text().to_owned());
    } else if let Some(localized) = non_empty(self.localized_role.as_deref()) {
      parts.push(localized.to_owned());
    } else if !self.role.is_silent() {
      parts.push(self.role_text().into_owned());
    }

    if let Some(level) = self.level_part() {
      parts.push(format!("level {level}"));
    }

    if let Some(position) = self.position {
      parts.push(position.to_string());
    }

    let states = self.state_text();
    if !states.is_empty() {
      parts.push(states);
    }

    if let Some(value) = non_empty(self.value.as_deref()) {
      if self.name.as_deref() != Some(value) {
        parts.push(value.to_owned());
      }
    }

    parts.join(", ")
  }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}
