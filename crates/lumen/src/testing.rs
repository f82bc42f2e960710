/*!
In-memory native layer for tests.

[`FakeTree`] implements all four binding traits over one shared node tree, so
the same fixture can be viewed through any provider. [`FakeWindows`] plays the
window manager.
*/

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, missing_docs)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::object::CHILD_ID_SELF;
use crate::provider::bridge::{
  BridgeBinding, BridgeContextInfo, BridgeEvent, BridgeEventHandler, BridgeEventKind, BridgeObject,
  BridgeProvider,
};
use crate::provider::extension::{ExtensionBinding, ExtensionProperties, ExtensionProvider};
use crate::provider::legacy::mapping::selflag;
use crate::provider::legacy::{
  LegacyBinding, LegacyChild, LegacyEvent, LegacyEventHandler, LegacyProperties, LegacyRef,
  LegacyProvider, NavDirection,
};
use crate::provider::tree::mapping::{control_type, heading_level};
use crate::provider::tree::{
  TreeBinding, TreeEvent, TreeEventHandler, TreePatterns, TreeProperties, TreeProvider,
};
use crate::provider::WindowSystem;
use crate::types::{status, Bounds, NativeError, NativeResult, NativeToken, Point, ProcessId, WindowHandle};

const JAVA_WINDOW_CLASSES: &[&str] = &["SunAwtFrame", "SunAwtDialog", "SunAwtWindow"];
const VM_ID: i32 = 1;

// ============================================================================
// Nodes
// ============================================================================

/// One element, with a field for every API's view of it.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeNode {
  id: u64,
  name: Option<String>,
  value: Option<String>,
  text: Option<String>,
  window: Option<u64>,
  bounds: Option<(i32, i32, i32, i32)>,
  // tree
  control_type: i32,
  localized_type: Option<String>,
  framework: Option<String>,
  aria_role: Option<String>,
  aria_properties: Option<String>,
  heading: i32,
  landmark_type: i32,
  offscreen: bool,
  // legacy
  legacy_role: u32,
  legacy_state: u32,
  simple: bool,
  default_action: Option<String>,
  // extension
  unique_id: Option<i32>,
  ia2_role: Option<i32>,
  ia2_states: u32,
  object_attributes: Option<String>,
  // bridge
  java_role: String,
  java_states: String,
  actions: Vec<String>,
}

impl FakeNode {
  pub(crate) fn new(id: u64, name: &str) -> Self {
    Self {
      id,
      name: (!name.is_empty()).then(|| name.to_owned()),
      ..Self::default()
    }
  }

  #[must_use]
  pub(crate) fn value(mut self, value: &str) -> Self {
    self.value = Some(value.to_owned());
    self
  }

  /// Text content; also gives the element a text capability.
  #[must_use]
  pub(crate) fn text(mut self, text: &str) -> Self {
    self.text = Some(text.to_owned());
    self
  }

  #[must_use]
  pub(crate) const fn window(mut self, window: u64) -> Self {
    self.window = Some(window);
    self
  }

  #[must_use]
  pub(crate) const fn bounds(mut self, x: i32, y: i32, w: i32, h: i32) -> Self {
    self.bounds = Some((x, y, w, h));
    self
  }

  #[must_use]
  pub(crate) const fn control_type(mut self, id: i32) -> Self {
    self.control_type = id;
    self
  }

  #[must_use]
  pub(crate) fn localized_type(mut self, text: &str) -> Self {
    self.localized_type = Some(text.to_owned());
    self
  }

  #[must_use]
  pub(crate) fn framework(mut self, framework: &str) -> Self {
    self.framework = Some(framework.to_owned());
    self
  }

  #[must_use]
  pub(crate) fn aria(mut self, role: &str, properties: &str) -> Self {
    self.aria_role = Some(role.to_owned());
    self.aria_properties = Some(properties.to_owned());
    self
  }

  /// Structured heading level.
  #[must_use]
  pub(crate) fn heading(mut self, level: u8) -> Self {
    self.heading = heading_level::NONE + i32::from(level);
    self
  }

  #[must_use]
  pub(crate) const fn landmark_type(mut self, raw: i32) -> Self {
    self.landmark_type = raw;
    self
  }

  #[must_use]
  pub(crate) const fn offscreen(mut self) -> Self {
    self.offscreen = true;
    self
  }

  #[must_use]
  pub(crate) const fn legacy_role(mut self, role: u32) -> Self {
    self.legacy_role = role;
    self
  }

  #[must_use]
  pub(crate) const fn legacy_state(mut self, state: u32) -> Self {
    self.legacy_state = state;
    self
  }

  /// A simple element addressed by child id relative to its parent.
  #[must_use]
  pub(crate) const fn simple(mut self) -> Self {
    self.simple = true;
    self
  }

  #[must_use]
  pub(crate) fn default_action(mut self, action: &str) -> Self {
    self.default_action = Some(action.to_owned());
    self
  }

  #[must_use]
  pub(crate) const fn unique_id(mut self, id: i32) -> Self {
    self.unique_id = Some(id);
    self
  }

  #[must_use]
  pub(crate) const fn ia2_role(mut self, role: i32) -> Self {
    self.ia2_role = Some(role);
    self
  }

  #[must_use]
  pub(crate) const fn ia2_states(mut self, states: u32) -> Self {
    self.ia2_states = states;
    self
  }

  #[must_use]
  pub(crate) fn object_attributes(mut self, attributes: &str) -> Self {
    self.object_attributes = Some(attributes.to_owned());
    self
  }

  #[must_use]
  pub(crate) fn java_role(mut self, role: &str) -> Self {
    self.java_role = role.to_owned();
    self
  }

  #[must_use]
  pub(crate) fn java_states(mut self, states: &str) -> Self {
    self.java_states = states.to_owned();
    self
  }

  #[must_use]
  pub(crate) fn actions(mut self, actions: &[&str]) -> Self {
    self.actions = actions.iter().map(|a| (*a).to_owned()).collect();
    self
  }

  fn has_extension(&self) -> bool {
    self.unique_id.is_some()
      || self.ia2_role.is_some()
      || self.ia2_states != 0
      || self.object_attributes.is_some()
  }

  fn contains(&self, point: Point) -> bool {
    self
      .bounds
      .is_some_and(|(x, y, w, h)| Bounds::from_location(x, y, w, h).contains(point))
  }
}

// ============================================================================
// Windows
// ============================================================================

#[derive(Debug, Default)]
struct WindowState {
  windows: HashMap<u64, (String, u32)>,
  foreground: Option<u64>,
  at_point: Option<u64>,
  processes: HashSet<String>,
}

/// Shared, clonable fake window manager.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeWindows {
  state: Arc<Mutex<WindowState>>,
}

impl FakeWindows {
  pub(crate) fn add_window(&self, id: u64, class: &str, pid: u32) {
    self.state.lock().windows.insert(id, (class.to_owned(), pid));
  }

  pub(crate) fn set_foreground(&self, window: Option<u64>) {
    self.state.lock().foreground = window;
  }

  pub(crate) fn set_window_at_point(&self, window: Option<u64>) {
    self.state.lock().at_point = window;
  }

  pub(crate) fn add_process(&self, image_name: &str) {
    self.state.lock().processes.insert(image_name.to_lowercase());
  }
}

impl WindowSystem for FakeWindows {
  fn foreground_window(&self) -> Option<WindowHandle> {
    self.state.lock().foreground.map(WindowHandle)
  }

  fn window_at_point(&self, _point: Point) -> Option<WindowHandle> {
    self.state.lock().at_point.map(WindowHandle)
  }

  fn class_name(&self, window: WindowHandle) -> Option<String> {
    self.state.lock().windows.get(&window.0).map(|(class, _)| class.clone())
  }

  fn process_id(&self, window: WindowHandle) -> Option<ProcessId> {
    self.state.lock().windows.get(&window.0).map(|(_, pid)| ProcessId(*pid))
  }

  fn is_process_running(&self, image_name: &str) -> bool {
    self.state.lock().processes.contains(&image_name.to_lowercase())
  }
}

// ============================================================================
// Tree
// ============================================================================

#[derive(Default)]
struct TreeState {
  nodes: HashMap<u64, FakeNode>,
  children: HashMap<u64, Vec<u64>>,
  parents: HashMap<u64, u64>,
  roots: Vec<u64>,
  dead: HashSet<u64>,
  focused: Option<u64>,
  navigate_unsupported: bool,
  extension_registered: bool,
  invocations: Vec<(u64, &'static str)>,
  activations: usize,
  property_delay: Option<Duration>,
  property_fetches: usize,
  tree_handler: Option<TreeEventHandler>,
  legacy_handler: Option<LegacyEventHandler>,
  bridge_handler: Option<BridgeEventHandler>,
  bridge_installed: bool,
  bridge_check_delay: Option<Duration>,
  bridge_handed_out: usize,
  bridge_loaded: bool,
  bridge_unloads: usize,
  released: Vec<BridgeObject>,
  released_after_unload: usize,
}

impl TreeState {
  fn live(&self, id: u64, status: i32) -> NativeResult<&FakeNode> {
    if self.dead.contains(&id) {
      return Err(NativeError::new("fake", status));
    }
    self.nodes.get(&id).ok_or(NativeError::new("fake", status))
  }

  fn siblings(&self, id: u64) -> &[u64] {
    self
      .parents
      .get(&id)
      .and_then(|p| self.children.get(p))
      .map_or(&self.roots[..], Vec::as_slice)
  }

  fn sibling_at(&self, id: u64, offset: isize) -> Option<u64> {
    let siblings = self.siblings(id);
    let index = siblings.iter().position(|s| *s == id)?;
    siblings.get(index.checked_add_signed(offset)?).copied()
  }

  fn window_of(&self, id: u64) -> Option<u64> {
    let mut current = Some(id);
    while let Some(node) = current {
      if let Some(window) = self.nodes.get(&node).and_then(|n| n.window) {
        return Some(window);
      }
      current = self.parents.get(&node).copied();
    }
    None
  }

  fn root_for_window(&self, window: u64) -> Option<u64> {
    self
      .roots
      .iter()
      .chain(self.nodes.keys())
      .copied()
      .find(|id| !self.dead.contains(id) && self.nodes.get(id).and_then(|n| n.window) == Some(window))
  }

  /// Deepest live node under `from` whose bounds contain the point.
  fn deepest_at(&self, from: u64, point: Point) -> Option<u64> {
    let children = self.children.get(&from).cloned().unwrap_or_default();
    for child in children {
      if self.dead.contains(&child) {
        continue;
      }
      if let Some(hit) = self.deepest_at(child, point) {
        return Some(hit);
      }
    }
    self.nodes.get(&from).filter(|n| n.contains(point)).map(|n| n.id)
  }

  fn hit_test(&self, point: Point) -> Option<u64> {
    self.roots.iter().find_map(|root| self.deepest_at(*root, point))
  }

  fn is_ancestor(&self, ancestor: u64, of: u64) -> bool {
    let mut current = self.parents.get(&of).copied();
    while let Some(node) = current {
      if node == ancestor {
        return true;
      }
      current = self.parents.get(&node).copied();
    }
    false
  }

  // --- handle-based addressing ---

  fn node_of(&self, target: LegacyRef) -> NativeResult<u64> {
    let id = if target.child_id == CHILD_ID_SELF {
      target.token.0
    } else {
      let child = u64::try_from(target.child_id).map_err(|_| NativeError::new("fake", status::INVALID_ARG))?;
      if self.parents.get(&child) != Some(&target.token.0) {
        return Err(NativeError::new("fake", status::INVALID_ARG));
      }
      child
    };
    self.live(id, status::OBJECT_NOT_CONNECTED)?;
    Ok(id)
  }

  fn legacy_child(&self, id: u64) -> LegacyChild {
    if self.nodes.get(&id).is_some_and(|n| n.simple) {
      LegacyChild::Element(i32::try_from(id).unwrap_or(CHILD_ID_SELF))
    } else {
      LegacyChild::Object(NativeToken(id))
    }
  }

  fn legacy_ref(&self, id: u64) -> LegacyRef {
    match (self.legacy_child(id), self.parents.get(&id)) {
      (LegacyChild::Element(child_id), Some(parent)) => LegacyRef::element(NativeToken(*parent), child_id),
      (LegacyChild::Element(_) | LegacyChild::Object(_), _) => LegacyRef::object(NativeToken(id)),
    }
  }

  // --- bridge addressing ---

  fn hand_out(&mut self, id: Option<u64>) -> Option<BridgeObject> {
    let id = id?;
    self.bridge_handed_out += 1;
    Some(BridgeObject {
      vm_id: VM_ID,
      context: i64::try_from(id).unwrap_or_default(),
    })
  }

  fn bridge_node(&self, object: BridgeObject) -> NativeResult<u64> {
    let id = u64::try_from(object.context).map_err(|_| NativeError::new("fake", status::BRIDGE_INVALID_CONTEXT))?;
    self.live(id, status::BRIDGE_INVALID_CONTEXT)?;
    Ok(id)
  }
}

/// Shared, clonable fake native layer.
#[derive(Clone)]
pub(crate) struct FakeTree {
  state: Arc<Mutex<TreeState>>,
  windows: FakeWindows,
}

impl std::fmt::Debug for FakeTree {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FakeTree").finish_non_exhaustive()
  }
}

/// Route `log` output through the test harness; `RUST_LOG` picks the level.
pub(crate) fn init_logging() {
  if env_logger::builder().is_test(true).try_init().is_err() {
    log::trace!("Test logger already installed");
  }
}

impl FakeTree {
  pub(crate) fn new() -> Self {
    init_logging();
    Self {
      state: Arc::new(Mutex::new(TreeState {
        extension_registered: true,
        bridge_installed: true,
        ..TreeState::default()
      })),
      windows: FakeWindows::default(),
    }
  }

  pub(crate) fn windows(&self) -> FakeWindows {
    self.windows.clone()
  }

  pub(crate) fn add_root(&self, node: FakeNode) {
    let mut state = self.state.lock();
    state.roots.push(node.id);
    state.children.entry(node.id).or_default();
    state.nodes.insert(node.id, node);
  }

  pub(crate) fn add_child(&self, parent: u64, node: FakeNode) {
    let mut state = self.state.lock();
    state.children.entry(parent).or_default().push(node.id);
    state.children.entry(node.id).or_default();
    state.parents.insert(node.id, parent);
    state.nodes.insert(node.id, node);
  }

  /// Detach a node (and so its subtree) and make every reference to it stale.
  pub(crate) fn kill(&self, id: u64) {
    let mut state = self.state.lock();
    if let Some(parent) = state.parents.get(&id).copied() {
      if let Some(siblings) = state.children.get_mut(&parent) {
        siblings.retain(|s| *s != id);
      }
    }
    state.roots.retain(|r| *r != id);
    state.dead.insert(id);
  }

  pub(crate) fn rename(&self, id: u64, name: &str) {
    if let Some(node) = self.state.lock().nodes.get_mut(&id) {
      node.name = Some(name.to_owned());
    }
  }

  pub(crate) fn focus(&self, id: u64) {
    self.state.lock().focused = Some(id);
  }

  pub(crate) fn set_navigate_unsupported(&self, unsupported: bool) {
    self.state.lock().navigate_unsupported = unsupported;
  }

  pub(crate) fn set_extension_registered(&self, registered: bool) {
    self.state.lock().extension_registered = registered;
  }

  pub(crate) fn set_bridge_installed(&self, installed: bool) {
    self.state.lock().bridge_installed = installed;
  }

  pub(crate) fn set_bridge_check_delay(&self, delay: Duration) {
    self.state.lock().bridge_check_delay = Some(delay);
  }

  /// Slow down every tree property fetch.
  pub(crate) fn set_property_delay(&self, delay: Duration) {
    self.state.lock().property_delay = Some(delay);
  }

  pub(crate) fn invocations(&self) -> Vec<(u64, &'static str)> {
    self.state.lock().invocations.clone()
  }

  pub(crate) fn activations(&self) -> usize {
    self.state.lock().activations
  }

  pub(crate) fn property_fetches(&self) -> usize {
    self.state.lock().property_fetches
  }

  pub(crate) fn released(&self) -> Vec<BridgeObject> {
    self.state.lock().released.clone()
  }

  /// Bridge references handed out and not yet released.
  pub(crate) fn outstanding_bridge_refs(&self) -> usize {
    let state = self.state.lock();
    state.bridge_handed_out - state.released.len()
  }

  pub(crate) fn bridge_unloads(&self) -> usize {
    self.state.lock().bridge_unloads
  }

  /// Releases that arrived after the bridge library was unloaded.
  pub(crate) fn releases_while_unloaded(&self) -> usize {
    self.state.lock().released_after_unload
  }

  pub(crate) fn tree_provider(&self) -> Arc<TreeProvider> {
    TreeProvider::new(Arc::new(self.clone()), Arc::new(self.windows()))
  }

  pub(crate) fn legacy_provider(&self) -> Arc<LegacyProvider> {
    LegacyProvider::new(Arc::new(self.clone()), Arc::new(self.windows()))
  }

  pub(crate) fn extension_provider(&self) -> Arc<ExtensionProvider> {
    ExtensionProvider::new(Arc::new(self.clone()), Arc::new(self.windows()))
  }

  pub(crate) fn bridge_provider(&self) -> Arc<BridgeProvider> {
    BridgeProvider::new(Arc::new(self.clone()), Arc::new(self.windows()), Duration::from_secs(1))
  }

  pub(crate) fn fire_tree_event(&self, event_id: i32, property_id: Option<i32>, element: u64) {
    let handler = self.state.lock().tree_handler.clone();
    if let Some(handler) = handler {
      handler(TreeEvent {
        event_id,
        property_id,
        element: NativeToken(element),
      });
    }
  }

  pub(crate) fn fire_legacy_event(&self, event: u32, window: u64, id: u64) {
    let handler = self.state.lock().legacy_handler.clone();
    if let Some(handler) = handler {
      handler(LegacyEvent {
        event,
        window: WindowHandle(window),
        object_id: i32::try_from(id).unwrap_or_default(),
        child_id: CHILD_ID_SELF,
      });
    }
  }

  pub(crate) fn fire_bridge_event(&self, kind: BridgeEventKind, window: u64, id: u64) {
    let (handler, source) = {
      let mut state = self.state.lock();
      let handler = state.bridge_handler.clone();
      let source = handler.as_ref().and_then(|_| state.hand_out(Some(id)));
      (handler, source)
    };
    if let (Some(handler), Some(source)) = (handler, source) {
      handler(BridgeEvent {
        kind,
        window: Some(WindowHandle(window)),
        source,
      });
    }
  }

  fn record(&self, id: u64, what: &'static str) {
    self.state.lock().invocations.push((id, what));
  }

  fn update(&self, id: u64, f: impl FnOnce(&mut FakeNode)) {
    if let Some(node) = self.state.lock().nodes.get_mut(&id) {
      f(node);
    }
  }
}

impl TreeBinding for FakeTree {
  fn is_present(&self) -> bool {
    true
  }

  fn focused_element(&self) -> NativeResult<Option<NativeToken>> {
    Ok(self.state.lock().focused.map(NativeToken))
  }

  fn element_from_point(&self, point: Point) -> NativeResult<Option<NativeToken>> {
    Ok(self.state.lock().hit_test(point).map(NativeToken))
  }

  fn element_from_window(&self, window: WindowHandle) -> NativeResult<Option<NativeToken>> {
    Ok(self.state.lock().root_for_window(window.0).map(NativeToken))
  }

  fn parent(&self, element: NativeToken) -> NativeResult<Option<NativeToken>> {
    let state = self.state.lock();
    state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    Ok(state.parents.get(&element.0).copied().map(NativeToken))
  }

  fn first_child(&self, element: NativeToken) -> NativeResult<Option<NativeToken>> {
    let state = self.state.lock();
    state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    Ok(state.children.get(&element.0).and_then(|c| c.first()).copied().map(NativeToken))
  }

  fn next_sibling(&self, element: NativeToken) -> NativeResult<Option<NativeToken>> {
    let state = self.state.lock();
    state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    Ok(state.sibling_at(element.0, 1).map(NativeToken))
  }

  fn previous_sibling(&self, element: NativeToken) -> NativeResult<Option<NativeToken>> {
    let state = self.state.lock();
    state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    Ok(state.sibling_at(element.0, -1).map(NativeToken))
  }

  fn properties(&self, element: NativeToken) -> NativeResult<TreeProperties> {
    let delay = {
      let mut state = self.state.lock();
      state.property_fetches += 1;
      state.property_delay
    };
    if let Some(delay) = delay {
      thread::sleep(delay);
    }
    let state = self.state.lock();
    let node = state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?;

    let mut patterns = TreePatterns::empty();
    match node.control_type {
      control_type::BUTTON | control_type::HYPERLINK | control_type::MENU_ITEM => {
        patterns |= TreePatterns::INVOKE;
      }
      control_type::CHECK_BOX => patterns |= TreePatterns::TOGGLE,
      control_type::EDIT | control_type::COMBO_BOX => patterns |= TreePatterns::VALUE,
      _ => {}
    }
    patterns.set(TreePatterns::TEXT, node.text.is_some());
    patterns.set(TreePatterns::LEGACY, node.default_action.is_some());

    let pid = state
      .window_of(node.id)
      .and_then(|w| self.windows.process_id(WindowHandle(w)))
      .map_or(0, |p| p.0);

    Ok(TreeProperties {
      control_type: node.control_type,
      localized_control_type: node.localized_type.clone(),
      name: node.name.clone(),
      value: node.value.clone(),
      framework_id: node.framework.clone(),
      process_id: pid,
      bounds: node.bounds.map(|(x, y, w, h)| Bounds::from_location(x, y, w, h)),
      has_keyboard_focus: state.focused == Some(node.id),
      is_keyboard_focusable: patterns.intersects(TreePatterns::INVOKE | TreePatterns::VALUE | TreePatterns::TOGGLE),
      is_enabled: true,
      is_offscreen: node.offscreen,
      is_value_read_only: patterns.contains(TreePatterns::VALUE).then_some(false),
      heading_level: node.heading,
      landmark_type: node.landmark_type,
      aria_role: node.aria_role.clone(),
      aria_properties: node.aria_properties.clone(),
      patterns,
      ..TreeProperties::default()
    })
  }

  fn invoke(&self, element: NativeToken) -> NativeResult<()> {
    self.state.lock().live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    self.record(element.0, "invoke");
    Ok(())
  }

  fn toggle(&self, element: NativeToken) -> NativeResult<()> {
    self.state.lock().live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    self.record(element.0, "toggle");
    Ok(())
  }

  fn select(&self, element: NativeToken) -> NativeResult<()> {
    self.state.lock().live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    self.record(element.0, "select");
    Ok(())
  }

  fn expand_collapse(&self, element: NativeToken, _expand: bool) -> NativeResult<()> {
    self.state.lock().live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    self.record(element.0, "expand_collapse");
    Ok(())
  }

  fn legacy_default_action(&self, element: NativeToken) -> NativeResult<()> {
    self.state.lock().live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    self.record(element.0, "default_action");
    Ok(())
  }

  fn set_value(&self, element: NativeToken, value: &str) -> NativeResult<()> {
    self.state.lock().live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    self.update(element.0, |n| n.value = Some(value.to_owned()));
    Ok(())
  }

  fn document_text(&self, element: NativeToken) -> NativeResult<Option<String>> {
    let state = self.state.lock();
    Ok(state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?.text.clone())
  }

  fn set_focus(&self, element: NativeToken) -> NativeResult<()> {
    let mut state = self.state.lock();
    state.live(element.0, status::ELEMENT_NOT_AVAILABLE)?;
    state.focused = Some(element.0);
    Ok(())
  }

  fn add_event_handler(&self, handler: TreeEventHandler) -> NativeResult<()> {
    self.state.lock().tree_handler = Some(handler);
    Ok(())
  }

  fn remove_event_handlers(&self) -> NativeResult<()> {
    self.state.lock().tree_handler = None;
    Ok(())
  }
}

impl LegacyBinding for FakeTree {
  fn is_present(&self) -> bool {
    true
  }

  fn object_from_window(&self, window: WindowHandle) -> NativeResult<Option<NativeToken>> {
    Ok(self.state.lock().root_for_window(window.0).map(NativeToken))
  }

  fn object_from_point(&self, point: Point) -> NativeResult<Option<(WindowHandle, LegacyRef)>> {
    let state = self.state.lock();
    Ok(state.hit_test(point).and_then(|id| {
      let window = state.window_of(id)?;
      Some((WindowHandle(window), state.legacy_ref(id)))
    }))
  }

  fn object_from_event(
    &self,
    _window: WindowHandle,
    object_id: i32,
    child_id: i32,
  ) -> NativeResult<Option<LegacyRef>> {
    let state = self.state.lock();
    let raw = if child_id == CHILD_ID_SELF { object_id } else { child_id };
    let Ok(id) = u64::try_from(raw) else {
      return Ok(None);
    };
    if state.live(id, status::OBJECT_NOT_CONNECTED).is_err() {
      return Ok(None);
    }
    Ok(Some(state.legacy_ref(id)))
  }

  fn window_from_object(&self, token: NativeToken) -> NativeResult<Option<WindowHandle>> {
    let state = self.state.lock();
    state.live(token.0, status::OBJECT_NOT_CONNECTED)?;
    Ok(state.window_of(token.0).map(WindowHandle))
  }

  fn focus(&self, token: NativeToken) -> NativeResult<Option<LegacyChild>> {
    let state = self.state.lock();
    state.live(token.0, status::OBJECT_NOT_CONNECTED)?;
    let Some(focused) = state.focused else {
      return Ok(None);
    };
    if focused == token.0 || !state.is_ancestor(token.0, focused) {
      return Ok(None);
    }
    let mut step = focused;
    while let Some(parent) = state.parents.get(&step).copied() {
      if parent == token.0 {
        break;
      }
      step = parent;
    }
    Ok(Some(state.legacy_child(step)))
  }

  fn parent(&self, token: NativeToken) -> NativeResult<Option<NativeToken>> {
    let state = self.state.lock();
    state.live(token.0, status::OBJECT_NOT_CONNECTED)?;
    Ok(state.parents.get(&token.0).copied().map(NativeToken))
  }

  fn children(&self, token: NativeToken) -> NativeResult<Vec<LegacyChild>> {
    let state = self.state.lock();
    state.live(token.0, status::OBJECT_NOT_CONNECTED)?;
    Ok(
      state
        .children
        .get(&token.0)
        .map(|c| c.iter().map(|id| state.legacy_child(*id)).collect())
        .unwrap_or_default(),
    )
  }

  fn navigate(&self, from: LegacyRef, direction: NavDirection) -> NativeResult<Option<LegacyChild>> {
    let state = self.state.lock();
    if state.navigate_unsupported {
      return Err(NativeError::new("accNavigate", status::NOT_IMPLEMENTED));
    }
    let id = state.node_of(from)?;
    let offset = match direction {
      NavDirection::Next => 1,
      NavDirection::Previous => -1,
    };
    let Some(sibling) = state.sibling_at(id, offset) else {
      return Ok(None);
    };
    match state.legacy_child(sibling) {
      // Simple siblings can only be named relative to a simple starting point.
      LegacyChild::Element(_) if !from.is_simple() => {
        Err(NativeError::new("accNavigate", status::NOT_IMPLEMENTED))
      }
      child @ (LegacyChild::Element(_) | LegacyChild::Object(_)) => Ok(Some(child)),
    }
  }

  fn properties(&self, target: LegacyRef) -> NativeResult<LegacyProperties> {
    let state = self.state.lock();
    let id = state.node_of(target)?;
    let node = state.live(id, status::OBJECT_NOT_CONNECTED)?;
    Ok(LegacyProperties {
      name: node.name.clone(),
      value: node.value.clone(),
      default_action: node.default_action.clone(),
      role: node.legacy_role,
      state: node.legacy_state,
      location: node.bounds,
      ..LegacyProperties::default()
    })
  }

  fn do_default_action(&self, target: LegacyRef) -> NativeResult<()> {
    let id = self.state.lock().node_of(target)?;
    self.record(id, "default_action");
    Ok(())
  }

  fn select(&self, target: LegacyRef, flags: u32) -> NativeResult<()> {
    let id = self.state.lock().node_of(target)?;
    if flags & selflag::TAKESELECTION != 0 {
      self.record(id, "select");
    }
    if flags & selflag::TAKEFOCUS != 0 {
      self.state.lock().focused = Some(id);
    }
    Ok(())
  }

  fn set_value(&self, target: LegacyRef, value: &str) -> NativeResult<()> {
    let id = self.state.lock().node_of(target)?;
    self.update(id, |n| n.value = Some(value.to_owned()));
    Ok(())
  }

  fn set_event_hook(&self, handler: LegacyEventHandler) -> NativeResult<()> {
    self.state.lock().legacy_handler = Some(handler);
    Ok(())
  }

  fn remove_event_hook(&self) -> NativeResult<()> {
    self.state.lock().legacy_handler = None;
    Ok(())
  }
}

impl ExtensionBinding for FakeTree {
  fn is_registered(&self) -> bool {
    self.state.lock().extension_registered
  }

  fn activate(&self) -> NativeResult<()> {
    self.state.lock().activations += 1;
    Ok(())
  }

  fn extension_properties(&self, target: LegacyRef) -> NativeResult<ExtensionProperties> {
    let state = self.state.lock();
    let id = state.node_of(target)?;
    let node = state.live(id, status::OBJECT_NOT_CONNECTED)?;
    if !node.has_extension() {
      return Err(NativeError::new("QueryService", status::NO_INTERFACE));
    }
    Ok(ExtensionProperties {
      unique_id: node.unique_id.unwrap_or_default(),
      role: node
        .ia2_role
        .unwrap_or_else(|| i32::try_from(node.legacy_role).unwrap_or_default()),
      states: node.ia2_states,
      attributes: node.object_attributes.clone(),
      ..ExtensionProperties::default()
    })
  }

  fn text(&self, target: LegacyRef) -> NativeResult<Option<String>> {
    let state = self.state.lock();
    let id = state.node_of(target)?;
    Ok(state.live(id, status::OBJECT_NOT_CONNECTED)?.text.clone())
  }

  fn replace_text(&self, target: LegacyRef, text: &str) -> NativeResult<()> {
    let id = self.state.lock().node_of(target)?;
    self.update(id, |n| n.text = Some(text.to_owned()));
    Ok(())
  }
}

impl BridgeBinding for FakeTree {
  fn is_installed(&self) -> bool {
    let (delay, installed) = {
      let state = self.state.lock();
      (state.bridge_check_delay, state.bridge_installed)
    };
    if let Some(delay) = delay {
      thread::sleep(delay);
    }
    installed
  }

  fn load(&self) -> NativeResult<()> {
    self.state.lock().bridge_loaded = true;
    Ok(())
  }

  fn unload(&self) {
    let mut state = self.state.lock();
    state.bridge_loaded = false;
    state.bridge_unloads += 1;
  }

  fn is_java_window(&self, window: WindowHandle) -> bool {
    self
      .windows
      .class_name(window)
      .is_some_and(|c| JAVA_WINDOW_CLASSES.contains(&c.as_str()))
  }

  fn context_from_window(&self, window: WindowHandle) -> NativeResult<Option<BridgeObject>> {
    let mut state = self.state.lock();
    let root = state.root_for_window(window.0);
    Ok(state.hand_out(root))
  }

  fn context_with_focus(&self, window: WindowHandle) -> NativeResult<Option<BridgeObject>> {
    let mut state = self.state.lock();
    let focused = state
      .focused
      .filter(|id| state.window_of(*id) == Some(window.0) && !state.dead.contains(id));
    Ok(state.hand_out(focused))
  }

  fn context_at(&self, parent: BridgeObject, point: Point) -> NativeResult<Option<BridgeObject>> {
    let mut state = self.state.lock();
    let id = state.bridge_node(parent)?;
    let hit = state.deepest_at(id, point).unwrap_or(id);
    Ok(state.hand_out(Some(hit)))
  }

  fn context_info(&self, object: BridgeObject) -> NativeResult<BridgeContextInfo> {
    let state = self.state.lock();
    let id = state.bridge_node(object)?;
    let node = state.live(id, status::BRIDGE_INVALID_CONTEXT)?;
    let (x, y, width, height) = node.bounds.unwrap_or_default();
    let index = state.siblings(id).iter().position(|s| *s == id).unwrap_or_default();
    Ok(BridgeContextInfo {
      name: node.name.clone(),
      description: None,
      role: node.java_role.clone(),
      role_en_us: node.java_role.clone(),
      states_en_us: node.java_states.clone(),
      index_in_parent: i32::try_from(index).unwrap_or_default(),
      children_count: i32::try_from(state.children.get(&id).map_or(0, Vec::len)).unwrap_or_default(),
      x,
      y,
      width,
      height,
      accessible_text: node.text.is_some(),
      accessible_value: node.value.is_some(),
      accessible_action: !node.actions.is_empty(),
    })
  }

  fn child(&self, object: BridgeObject, index: i32) -> NativeResult<Option<BridgeObject>> {
    let mut state = self.state.lock();
    let id = state.bridge_node(object)?;
    let child = usize::try_from(index)
      .ok()
      .and_then(|i| state.children.get(&id).and_then(|c| c.get(i)).copied());
    Ok(state.hand_out(child))
  }

  fn parent(&self, object: BridgeObject) -> NativeResult<Option<BridgeObject>> {
    let mut state = self.state.lock();
    let id = state.bridge_node(object)?;
    let parent = state.parents.get(&id).copied();
    Ok(state.hand_out(parent))
  }

  fn text(&self, object: BridgeObject) -> NativeResult<Option<String>> {
    let state = self.state.lock();
    let id = state.bridge_node(object)?;
    Ok(state.live(id, status::BRIDGE_INVALID_CONTEXT)?.text.clone())
  }

  fn current_value(&self, object: BridgeObject) -> NativeResult<Option<String>> {
    let state = self.state.lock();
    let id = state.bridge_node(object)?;
    Ok(state.live(id, status::BRIDGE_INVALID_CONTEXT)?.value.clone())
  }

  fn actions(&self, object: BridgeObject) -> NativeResult<Vec<String>> {
    let state = self.state.lock();
    let id = state.bridge_node(object)?;
    Ok(state.live(id, status::BRIDGE_INVALID_CONTEXT)?.actions.clone())
  }

  fn do_action(&self, object: BridgeObject, _action: &str) -> NativeResult<()> {
    let id = self.state.lock().bridge_node(object)?;
    self.record(id, "do_action");
    Ok(())
  }

  fn request_focus(&self, object: BridgeObject) -> NativeResult<()> {
    let mut state = self.state.lock();
    let id = state.bridge_node(object)?;
    state.focused = Some(id);
    Ok(())
  }

  fn set_text_contents(&self, object: BridgeObject, text: &str) -> NativeResult<()> {
    let id = self.state.lock().bridge_node(object)?;
    self.update(id, |n| n.text = Some(text.to_owned()));
    Ok(())
  }

  fn release(&self, object: BridgeObject) {
    let mut state = self.state.lock();
    if !state.bridge_loaded && state.bridge_unloads > 0 {
      state.released_after_unload += 1;
    }
    state.released.push(object);
  }

  fn set_event_handler(&self, handler: BridgeEventHandler) -> NativeResult<()> {
    self.state.lock().bridge_handler = Some(handler);
    Ok(())
  }

  fn clear_event_handler(&self) {
    self.state.lock().bridge_handler = None;
  }
}
