/*!
Virtual buffers.

A [`VirtualBuffer`] flattens the tree under a document root into one text
string plus an ordered list of [`BufferNode`]s, and answers offset and
type-directed queries against it.

# Publishing

A build runs to completion in private state and is then swapped in as an
immutable [`BufferSnapshot`] behind an `Arc`. Readers see either the previous
snapshot or the complete new one, never a partial build.

# Concurrent loads

Only one build per buffer runs at a time. Every load request takes a ticket
and records its root as the latest request. A build always walks the latest
requested root, so a request that was already covered by a build that started
after it was made returns that build's result instead of walking again.

```ignore
let buffer = VirtualBuffer::new(BufferConfig::default())?;
let handle = buffer.load_document_async(document_root);
let snapshot = handle.wait()?;
if let Some(node) = buffer.find_next_by_type(NavType::Heading, buffer.caret_offset()) {
    buffer.move_to_node(node.id)?;
    println!("{}", node.object.announcement());
}
```

# Module Structure

- `mod.rs` - `VirtualBuffer`, `BufferSnapshot`, `LoadHandle`
- `node.rs` - `BufferNode`, `NavType` classification and tokens
- `builder.rs` - tree walk and heading level resolution
- `quicknav.rs` - next/previous by type with one-directional widening
*/

mod builder;
mod node;
pub mod quicknav;

pub use builder::resolve_heading_level;
pub use node::{BufferNode, NavType};

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use parking_lot::{Mutex, RwLock};

use crate::config::BufferConfig;
use crate::object::AccessibleObject;
use crate::types::{LumenError, LumenResult, NodeId, TextRange};

/// One complete, immutable build.
#[derive(Debug)]
pub struct BufferSnapshot {
  text: String,
  /// Byte offset of every char, plus one past the end.
  char_starts: Vec<usize>,
  nodes: Vec<BufferNode>,
}

impl BufferSnapshot {
  fn new(text: String, nodes: Vec<BufferNode>) -> Self {
    let char_starts = text
      .char_indices()
      .map(|(i, _)| i)
      .chain(std::iter::once(text.len()))
      .collect();
    Self {
      text,
      char_starts,
      nodes,
    }
  }

  /// The flattened document text.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Length in chars. All offsets in this module are char offsets.
  pub fn len(&self) -> usize {
    self.char_starts.len().saturating_sub(1)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Nodes in document order, indexed by [`NodeId`].
  pub fn nodes(&self) -> &[BufferNode] {
    &self.nodes
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  pub fn node(&self, id: NodeId) -> Option<&BufferNode> {
    self.nodes.get(id.0)
  }

  /// The node whose own text contains `offset`. Separators and line breaks
  /// belong to no node.
  pub fn node_at_offset(&self, offset: usize) -> Option<&BufferNode> {
    let candidates = self.nodes.partition_point(|n| n.range.start <= offset);
    self
      .nodes
      .iter()
      .take(candidates)
      .rev()
      .find(|n| !n.range.is_empty())
      .filter(|n| n.range.contains(offset))
  }

  /// Text between two char offsets, clamped to the buffer.
  pub fn text_range(&self, start: usize, end: usize) -> &str {
    let len = self.len();
    let (start, end) = (start.min(len), end.min(len));
    if start >= end {
      return "";
    }
    match (self.char_starts.get(start), self.char_starts.get(end)) {
      (Some(&from), Some(&to)) => self.text.get(from..to).unwrap_or_default(),
      _ => "",
    }
  }

  /// Range of the line containing `offset`, without its line break.
  pub fn line_at(&self, offset: usize) -> TextRange {
    let len = self.len();
    let offset = offset.min(len);
    let Some(&byte) = self.char_starts.get(offset) else {
      return TextRange::new(len, len);
    };
    let (before, after) = self.text.split_at(byte);
    let start = match before.rfind('\n') {
      Some(newline) => before.get(..=newline).map_or(0, |s| s.chars().count()),
      None => 0,
    };
    let rest = after.find('\n').and_then(|newline| after.get(..newline)).unwrap_or(after);
    TextRange::new(start, offset + rest.chars().count())
  }

  pub fn find_next_by_type(&self, query: NavType, from: usize) -> Option<&BufferNode> {
    quicknav::find_next(&self.nodes, query, from)
  }

  pub fn find_previous_by_type(&self, query: NavType, from: usize) -> Option<&BufferNode> {
    quicknav::find_previous(&self.nodes, query, from)
  }
}

/// Pending result of [`VirtualBuffer::load_document_async`].
#[derive(Debug)]
#[must_use = "dropping the handle discards the load result"]
pub struct LoadHandle {
  rx: Receiver<LumenResult<Arc<BufferSnapshot>>>,
}

impl LoadHandle {
  /// Block until the load completes.
  pub fn wait(self) -> LumenResult<Arc<BufferSnapshot>> {
    self.rx.recv().map_err(|_| LumenError::LoadAbandoned)?
  }

  /// The result, if the load already completed.
  pub fn try_wait(&self) -> Option<LumenResult<Arc<BufferSnapshot>>> {
    self.rx.try_recv().ok()
  }
}

/// Marks a load in flight for as long as it lives.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
  fn new(counter: &'a AtomicUsize) -> Self {
    counter.fetch_add(1, Ordering::SeqCst);
    Self(counter)
  }
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}

struct Shared {
  config: BufferConfig,
  current: RwLock<Option<Arc<BufferSnapshot>>>,
  /// Held for the whole of a build.
  build_lock: Mutex<()>,
  /// Latest requested root and its ticket.
  pending: Mutex<Option<(u64, AccessibleObject)>>,
  next_ticket: AtomicU64,
  /// Highest ticket a started build has taken over.
  covered: AtomicU64,
  loading: AtomicUsize,
  caret: AtomicUsize,
  /// Requests up to this ticket were dropped by `close`.
  closed_through: AtomicU64,
}

impl Shared {
  fn request(&self, root: AccessibleObject) -> u64 {
    let mut pending = self.pending.lock();
    let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
    *pending = Some((ticket, root));
    ticket
  }

  fn is_closed(&self, ticket: u64) -> bool {
    ticket <= self.closed_through.load(Ordering::SeqCst)
  }

  fn current(&self) -> LumenResult<Arc<BufferSnapshot>> {
    self.current.read().clone().ok_or(LumenError::NoDocument)
  }

  fn run(&self, ticket: u64) -> LumenResult<Arc<BufferSnapshot>> {
    let _build = self.build_lock.lock();
    if self.covered.load(Ordering::SeqCst) >= ticket {
      if self.is_closed(ticket) {
        return Err(LumenError::LoadAbandoned);
      }
      log::debug!("Load #{ticket} already covered by a newer build");
      return self.current();
    }
    let Some((latest, root)) = self.pending.lock().take() else {
      return self.current();
    };
    self.covered.store(latest, Ordering::SeqCst);
    if self.is_closed(latest) {
      return Err(LumenError::LoadAbandoned);
    }

    let built = builder::build(&root, &self.config);
    let snapshot = Arc::new(BufferSnapshot::new(built.text, built.nodes));
    // `close` marks tickets under the same write lock.
    let mut current = self.current.write();
    if self.is_closed(latest) {
      log::debug!("Load #{ticket} finished after close; discarding");
      return Err(LumenError::LoadAbandoned);
    }
    *current = Some(Arc::clone(&snapshot));
    self.caret.store(0, Ordering::SeqCst);
    drop(current);
    log::debug!(
      "Load #{ticket} published build #{latest} ({} nodes)",
      snapshot.node_count()
    );
    Ok(snapshot)
  }
}

/// Offset-addressed text view of one document, with a reading caret.
pub struct VirtualBuffer {
  shared: Arc<Shared>,
  pool: rayon::ThreadPool,
}

impl std::fmt::Debug for VirtualBuffer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VirtualBuffer")
      .field("config", &self.shared.config)
      .field("loading", &self.is_loading())
      .field("nodes", &self.node_count())
      .finish_non_exhaustive()
  }
}

impl VirtualBuffer {
  /// Validate `config` and start the build pool.
  pub fn new(config: BufferConfig) -> LumenResult<Self> {
    config.validate()?;
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(config.workers)
      .thread_name(|i| format!("lumen-buffer-{i}"))
      .build()?;
    Ok(Self {
      shared: Arc::new(Shared {
        config,
        current: RwLock::new(None),
        build_lock: Mutex::new(()),
        pending: Mutex::new(None),
        next_ticket: AtomicU64::new(0),
        covered: AtomicU64::new(0),
        loading: AtomicUsize::new(0),
        caret: AtomicUsize::new(0),
        closed_through: AtomicU64::new(0),
      }),
      pool,
    })
  }

  /// Build and publish synchronously.
  pub fn load_document(&self, root: &AccessibleObject) -> LumenResult<Arc<BufferSnapshot>> {
    let _loading = LoadingGuard::new(&self.shared.loading);
    let ticket = self.shared.request(root.clone());
    self.shared.run(ticket)
  }

  /// Build and publish on the buffer's worker pool.
  ///
  /// The request is registered before this returns, so a later load always
  /// wins over an earlier one regardless of which worker runs first.
  pub fn load_document_async(&self, root: AccessibleObject) -> LoadHandle {
    self.shared.loading.fetch_add(1, Ordering::SeqCst);
    let ticket = self.shared.request(root);
    let shared = Arc::clone(&self.shared);
    let (tx, rx) = bounded(1);
    self.pool.spawn(move || {
      let result = shared.run(ticket);
      shared.loading.fetch_sub(1, Ordering::SeqCst);
      if tx.send(result).is_err() {
        log::trace!("Load #{ticket} finished with nobody waiting");
      }
    });
    LoadHandle { rx }
  }

  /// Whether any load is in flight.
  pub fn is_loading(&self) -> bool {
    self.shared.loading.load(Ordering::SeqCst) > 0
  }

  /// The published snapshot, if any. Hold on to it for consistent multi-step reads.
  pub fn snapshot(&self) -> Option<Arc<BufferSnapshot>> {
    self.shared.current.read().clone()
  }

  /// Drop the published document. Loads requested before this resolve to
  /// [`LumenError::LoadAbandoned`]; later loads proceed normally.
  pub fn close(&self) {
    let mut current = self.shared.current.write();
    let through = self.shared.next_ticket.load(Ordering::SeqCst);
    self.shared.closed_through.store(through, Ordering::SeqCst);
    *current = None;
    self.shared.caret.store(0, Ordering::SeqCst);
  }

  /// Copy of the published text; empty before the first load.
  pub fn text(&self) -> String {
    self.snapshot().map(|s| s.text().to_owned()).unwrap_or_default()
  }

  pub fn len(&self) -> usize {
    self.snapshot().map_or(0, |s| s.len())
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn node_count(&self) -> usize {
    self.snapshot().map_or(0, |s| s.node_count())
  }

  /// Look up a node of the published document.
  pub fn node(&self, id: NodeId) -> LumenResult<BufferNode> {
    let snapshot = self.shared.current()?;
    snapshot.node(id).cloned().ok_or(LumenError::NodeNotFound(id))
  }

  pub fn node_at_offset(&self, offset: usize) -> Option<BufferNode> {
    self.snapshot()?.node_at_offset(offset).cloned()
  }

  pub fn text_range(&self, start: usize, end: usize) -> String {
    self
      .snapshot()
      .map(|s| s.text_range(start, end).to_owned())
      .unwrap_or_default()
  }

  /// The line the caret is on.
  pub fn current_line(&self) -> String {
    let Some(snapshot) = self.snapshot() else {
      return String::new();
    };
    let line = snapshot.line_at(self.caret_offset());
    snapshot.text_range(line.start, line.end).to_owned()
  }

  pub fn caret_offset(&self) -> usize {
    self.shared.caret.load(Ordering::SeqCst)
  }

  /// Move the caret, clamped to the buffer. Returns the new offset.
  pub fn move_to_offset(&self, offset: usize) -> usize {
    let offset = offset.min(self.len());
    self.shared.caret.store(offset, Ordering::SeqCst);
    offset
  }

  /// Move the caret to the start of a node. Returns the new offset.
  pub fn move_to_node(&self, id: NodeId) -> LumenResult<usize> {
    let node = self.node(id)?;
    Ok(self.move_to_offset(node.range.start))
  }

  /// Next node matching `query` that starts after `from`.
  pub fn find_next_by_type(&self, query: NavType, from: usize) -> Option<BufferNode> {
    self.snapshot()?.find_next_by_type(query, from).cloned()
  }

  /// Previous node matching `query` that starts before `from`.
  pub fn find_previous_by_type(&self, query: NavType, from: usize) -> Option<BufferNode> {
    self.snapshot()?.find_previous_by_type(query, from).cloned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::provider::tree::mapping::control_type;
  use crate::testing::{FakeNode, FakeTree};
  use crate::types::NativeToken;
  use proptest::prelude::*;
  use std::thread;
  use std::time::Duration;

  fn document(tree: &FakeTree) -> AccessibleObject {
    tree.tree_provider().object_for_token(NativeToken(1)).expect("root")
  }

  fn intro_tree() -> FakeTree {
    let tree = FakeTree::new();
    tree.add_root(FakeNode::new(1, "Doc").control_type(control_type::DOCUMENT));
    tree.add_child(1, FakeNode::new(2, "Intro").control_type(control_type::TEXT).heading(1));
    tree.add_child(1, FakeNode::new(3, "A").control_type(control_type::HYPERLINK));
    tree.add_child(1, FakeNode::new(4, "B").control_type(control_type::HYPERLINK));
    tree
  }

  fn buffer() -> VirtualBuffer {
    VirtualBuffer::new(BufferConfig::default()).expect("buffer")
  }

  #[test]
  fn empty_until_loaded() {
    let buffer = buffer();
    assert!(buffer.snapshot().is_none());
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.current_line(), "");
    assert!(matches!(buffer.node(NodeId(0)), Err(LumenError::NoDocument)));
    assert!(buffer.find_next_by_type(NavType::Heading, 0).is_none());
  }

  #[test]
  fn intro_scenario_through_the_buffer() {
    let tree = intro_tree();
    let buffer = buffer();
    buffer.load_document(&document(&tree)).expect("load");

    assert_eq!(buffer.text(), "Intro\nA B\n");
    assert_eq!(buffer.node_count(), 4);
    let link = buffer.find_next_by_type(NavType::Link, 0).expect("A");
    assert_eq!(link.object.name.as_deref(), Some("A"));
    assert_eq!(buffer.move_to_node(link.id).expect("move"), 6);
    assert_eq!(buffer.current_line(), "A B");

    let heading = buffer.find_previous_by_type(NavType::Heading, buffer.caret_offset()).expect("heading");
    assert_eq!(heading.heading_level, 1);
    assert!(buffer.find_next_by_type(NavType::Heading2, 0).is_none());

    assert_eq!(buffer.node_at_offset(0).and_then(|n| n.object.name), Some("Intro".into()));
    assert!(buffer.node_at_offset(5).is_none());
    assert_eq!(buffer.text_range(6, 9), "A B");
    assert_eq!(buffer.text_range(8, 100), "B\n");
    assert!(matches!(buffer.node(NodeId(9)), Err(LumenError::NodeNotFound(NodeId(9)))));
  }

  #[test]
  fn caret_is_clamped_and_reset_on_reload() {
    let tree = intro_tree();
    let buffer = buffer();
    buffer.load_document(&document(&tree)).expect("load");
    assert_eq!(buffer.move_to_offset(1000), buffer.len());
    assert_eq!(buffer.current_line(), "");
    buffer.move_to_offset(2);
    assert_eq!(buffer.current_line(), "Intro");
    buffer.load_document(&document(&tree)).expect("reload");
    assert_eq!(buffer.caret_offset(), 0);
  }

  #[test]
  fn snapshots_are_immutable_across_reloads() {
    let tree = intro_tree();
    let buffer = buffer();
    let first = buffer.load_document(&document(&tree)).expect("load");
    tree.rename(3, "Alpha");
    buffer.load_document(&document(&tree)).expect("reload");
    assert_eq!(first.text(), "Intro\nA B\n");
    assert_eq!(buffer.text(), "Intro\nAlpha B\n");
  }

  #[test]
  fn async_load_publishes_once_complete() {
    let tree = intro_tree();
    tree.set_property_delay(Duration::from_millis(5));
    let buffer = buffer();
    let handle = buffer.load_document_async(document(&tree));
    assert!(buffer.is_loading());
    let snapshot = handle.wait().expect("load");
    assert_eq!(snapshot.node_count(), 4);
    assert!(!buffer.is_loading());
    assert_eq!(buffer.node_count(), 4);
  }

  #[test]
  fn concurrent_loads_publish_one_full_build() {
    let tree = intro_tree();
    tree.set_property_delay(Duration::from_millis(2));
    let buffer = buffer();
    let root = document(&tree);

    thread::scope(|scope| {
      let loads: Vec<_> = (0..4)
        .map(|_| scope.spawn(|| buffer.load_document(&root).expect("load")))
        .collect();
      for load in loads {
        let snapshot = load.join().expect("thread");
        assert_eq!(snapshot.text(), "Intro\nA B\n");
        assert_eq!(snapshot.node_count(), 4);
      }
    });
    assert_eq!(buffer.text(), "Intro\nA B\n");
  }

  #[test]
  fn queued_loads_are_coalesced() {
    let tree = intro_tree();
    let buffer = buffer();
    let root = document(&tree);

    let before = tree.property_fetches();
    buffer.load_document(&root).expect("load");
    let per_build = tree.property_fetches() - before;

    let held = buffer.shared.build_lock.lock();
    let first = buffer.load_document_async(root.clone());
    let second = buffer.load_document_async(root.clone());
    let before = tree.property_fetches();
    drop(held);

    let a = first.wait().expect("first");
    let b = second.wait().expect("second");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(tree.property_fetches() - before, per_build);
  }

  #[test]
  fn latest_request_wins() {
    let tree = intro_tree();
    tree.add_root(FakeNode::new(10, "Other").control_type(control_type::DOCUMENT));
    tree.add_child(10, FakeNode::new(11, "Elsewhere").control_type(control_type::TEXT));
    let other = tree.tree_provider().object_for_token(NativeToken(10)).expect("other");
    let buffer = buffer();

    let held = buffer.shared.build_lock.lock();
    let first = buffer.load_document_async(document(&tree));
    let second = buffer.load_document_async(other);
    drop(held);

    assert_eq!(first.wait().expect("first").text(), "Elsewhere\n");
    assert_eq!(second.wait().expect("second").text(), "Elsewhere\n");
  }

  #[test]
  fn closed_buffers_abandon_queued_loads() {
    let tree = intro_tree();
    let buffer = buffer();
    let held = buffer.shared.build_lock.lock();
    let handle = buffer.load_document_async(document(&tree));
    buffer.close();
    drop(held);
    assert!(matches!(handle.wait(), Err(LumenError::LoadAbandoned)));
    assert!(buffer.snapshot().is_none());
  }

  #[test]
  fn close_abandons_every_coalesced_load() {
    let tree = intro_tree();
    let buffer = buffer();
    let held = buffer.shared.build_lock.lock();
    let first = buffer.load_document_async(document(&tree));
    let second = buffer.load_document_async(document(&tree));
    buffer.close();
    drop(held);
    assert!(matches!(first.wait(), Err(LumenError::LoadAbandoned)));
    assert!(matches!(second.wait(), Err(LumenError::LoadAbandoned)));
    assert!(buffer.snapshot().is_none());
  }

  #[test]
  fn close_wins_over_an_in_flight_publish() {
    let tree = intro_tree();
    let buffer = buffer();
    let root = document(&tree);
    for _ in 0..200 {
      let handle = buffer.load_document_async(root.clone());
      buffer.close();
      let result = handle.wait();
      assert!(buffer.snapshot().is_none(), "published after close: {result:?}");
    }
  }

  #[test]
  fn loads_after_close_proceed() {
    let tree = intro_tree();
    let buffer = buffer();
    buffer.load_document(&document(&tree)).expect("load");
    buffer.close();
    assert_eq!(buffer.len(), 0);
    let snapshot = buffer.load_document_async(document(&tree)).wait().expect("reload");
    assert_eq!(snapshot.text(), "Intro\nA B\n");
  }

  #[test]
  fn line_ranges() {
    let snapshot = BufferSnapshot::new("ab\ncd\n".into(), Vec::new());
    assert_eq!(snapshot.line_at(0), TextRange::new(0, 2));
    assert_eq!(snapshot.line_at(2), TextRange::new(0, 2));
    assert_eq!(snapshot.line_at(3), TextRange::new(3, 5));
    assert_eq!(snapshot.line_at(6), TextRange::new(6, 6));
    let wide = BufferSnapshot::new("héllo\nwörld".into(), Vec::new());
    assert_eq!(wide.len(), 11);
    assert_eq!(wide.text_range(6, 11), "wörld");
    assert_eq!(wide.line_at(8), TextRange::new(6, 11));
  }

  /// Random documents: each entry is `(parent index, control type, name)`.
  fn random_tree() -> impl Strategy<Value = Vec<(usize, i32, String)>> {
    let control = proptest::sample::select(vec![
      control_type::TEXT,
      control_type::HYPERLINK,
      control_type::BUTTON,
      control_type::GROUP,
      control_type::LIST,
      control_type::LIST_ITEM,
      control_type::EDIT,
      control_type::CHECK_BOX,
      control_type::IMAGE,
    ]);
    prop::collection::vec((any::<usize>(), control, "[a-zé ]{0,8}"), 0..40)
  }

  fn build_random(shape: &[(usize, i32, String)]) -> Arc<BufferSnapshot> {
    let tree = FakeTree::new();
    tree.add_root(FakeNode::new(1, "root").control_type(control_type::DOCUMENT));
    for (i, (parent, control, name)) in shape.iter().enumerate() {
      let id = u64::try_from(i).expect("id") + 2;
      let parent = u64::try_from(parent % (i + 1)).expect("parent") + 1;
      tree.add_child(parent, FakeNode::new(id, name).control_type(*control));
    }
    buffer().load_document(&document(&tree)).expect("load")
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Node intervals are sorted, disjoint and fit inside the text.
    #[test]
    fn intervals_are_sorted_and_disjoint(shape in random_tree()) {
      let snapshot = build_random(&shape);
      let nodes = snapshot.nodes();
      for pair in nodes.windows(2) {
        if let [a, b] = pair {
          prop_assert!(a.range.start <= b.range.start);
          prop_assert!(!a.range.overlaps(&b.range));
        }
      }
      let total: usize = nodes.iter().map(|n| n.range.len()).sum();
      prop_assert!(total <= snapshot.len());
      for node in nodes {
        prop_assert!(node.range.end <= snapshot.len());
      }
    }

    /// `node_at_offset` only ever returns a node containing the offset.
    #[test]
    fn node_at_offset_contains_offset(shape in random_tree()) {
      let snapshot = build_random(&shape);
      for offset in 0..snapshot.len() {
        if let Some(node) = snapshot.node_at_offset(offset) {
          prop_assert!(node.range.contains(offset));
        }
      }
    }

    /// Every node's range slices exactly the text it was built from.
    #[test]
    fn ranges_slice_node_text(shape in random_tree()) {
      let snapshot = build_random(&shape);
      for node in snapshot.nodes().iter().filter(|n| !n.range.is_empty()) {
        let text = snapshot.text_range(node.range.start, node.range.end);
        let expected = node.object.value.as_deref().or(node.object.name.as_deref()).map(str::trim);
        prop_assert_eq!(Some(text), expected);
      }
    }
  }
}
