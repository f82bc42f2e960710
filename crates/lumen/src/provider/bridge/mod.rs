/*!
Managed-runtime bridge provider (Java Access Bridge shape).

Java UIs render into windows the other APIs see as opaque canvases. The bridge
reaches into the VM instead. Every object reference it hands out is adopted
into a [`BridgeContext`] on the spot, so references are released exactly once
no matter which path (resolution, navigation, events) produced them.

Availability is checked on a helper thread with a deadline: a half-installed
bridge can block the check indefinitely, and resolution must never hang on it.
*/

mod binding;
mod context;
pub(crate) mod mapping;

pub use binding::{
  BridgeBinding, BridgeContextInfo, BridgeEvent, BridgeEventHandler, BridgeEventKind, BridgeObject,
};
pub use context::BridgeContext;
use context::BridgeLibrary;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use parking_lot::Mutex;

use super::{EventSink, InitOnce, NativeResultExt, Provider, WindowSystem};
use crate::a11y::StateSet;
use crate::object::{AccessibleObject, NativeHandle, ObjectId};
use crate::types::{ApiKind, NativeResult, Point, ProcessId, ProviderEvent, WindowHandle};

const KIND: ApiKind = ApiKind::Bridge;

/// Executables that host a Java VM.
const JAVA_PROCESSES: &[&str] = &["java.exe", "javaw.exe", "jp2launcher.exe"];

/// Action names tried before falling back to the first reported action.
const PREFERRED_ACTIONS: &[&str] = &["click", "toggle", "press"];

/// Upper bound on children read from one parent.
const MAX_CHILDREN: i32 = 10_000;

/// How long a timed-out check is reported unavailable before it is waited on again.
const CHECK_RETRY_AFTER: Duration = Duration::from_secs(10);

/// Installation check progress. A timed-out check keeps its receiver so a late answer is still picked up.
#[derive(Debug)]
enum CheckState {
  NotRun,
  Running(Receiver<bool>),
  TimedOut { rx: Receiver<bool>, retry_at: Instant },
  Done(bool),
}

/// Provider over a [`BridgeBinding`].
pub struct BridgeProvider {
  me: Weak<BridgeProvider>,
  binding: Arc<dyn BridgeBinding>,
  library: Arc<BridgeLibrary>,
  windows: Arc<dyn WindowSystem>,
  availability_timeout: Duration,
  check: Mutex<CheckState>,
  init: InitOnce,
  listening: AtomicBool,
}

impl std::fmt::Debug for BridgeProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BridgeProvider")
      .field("availability_timeout", &self.availability_timeout)
      .field("initialized", &self.init.is_done())
      .field("live_contexts", &self.library.live())
      .field("listening", &self.listening.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}

impl BridgeProvider {
  pub fn new(
    binding: Arc<dyn BridgeBinding>,
    windows: Arc<dyn WindowSystem>,
    availability_timeout: Duration,
  ) -> Arc<Self> {
    Arc::new_cyclic(|me| Self {
      me: me.clone(),
      library: BridgeLibrary::new(Arc::clone(&binding)),
      binding,
      windows,
      availability_timeout,
      check: Mutex::new(CheckState::NotRun),
      init: InitOnce::default(),
      listening: AtomicBool::new(false),
    })
  }

  fn java_running(&self) -> bool {
    JAVA_PROCESSES.iter().any(|name| self.windows.is_process_running(name))
  }

  /// Run (or keep waiting on) the installation check, bounded by the configured timeout.
  fn check_installed(&self) -> bool {
    let mut state = self.check.lock();
    let rx = match &*state {
      CheckState::Done(installed) => return *installed,
      CheckState::Running(rx) => rx.clone(),
      CheckState::TimedOut { rx, retry_at } => {
        let (rx, retry_due) = (rx.clone(), Instant::now() >= *retry_at);
        match rx.try_recv() {
          Ok(installed) => {
            *state = CheckState::Done(installed);
            return installed;
          }
          Err(TryRecvError::Disconnected) => {
            *state = CheckState::Done(false);
            return false;
          }
          Err(TryRecvError::Empty) if !retry_due => return false,
          Err(TryRecvError::Empty) => rx,
        }
      }
      CheckState::NotRun => {
        let (tx, rx) = bounded(1);
        let binding = Arc::clone(&self.binding);
        let spawned = thread::Builder::new()
          .name("lumen-bridge-check".into())
          .spawn(move || {
            // The receiver may be gone if the provider was dropped mid-check.
            tx.send(binding.is_installed()).ok();
          });
        if let Err(e) = spawned {
          log::error!("[{KIND}] failed to spawn install check thread: {e}");
          return false;
        }
        *state = CheckState::Running(rx.clone());
        rx
      }
    };

    match rx.recv_timeout(self.availability_timeout) {
      Ok(installed) => {
        *state = CheckState::Done(installed);
        installed
      }
      Err(RecvTimeoutError::Timeout) => {
        log::warn!(
          "[{KIND}] availability check did not answer within {:?}, treating as unavailable",
          self.availability_timeout
        );
        *state = CheckState::TimedOut {
          rx: rx.clone(),
          retry_at: Instant::now() + CHECK_RETRY_AFTER,
        };
        false
      }
      Err(RecvTimeoutError::Disconnected) => {
        log::warn!("[{KIND}] availability check exited without answering");
        *state = CheckState::Done(false);
        false
      }
    }
  }

  fn adopt(&self, object: BridgeObject, pid: ProcessId) -> BridgeContext {
    BridgeContext::adopt(Arc::clone(&self.library), object, pid)
  }

  /// Adopt an optional reference a binding call returned, logging failures.
  fn adopt_result(
    &self,
    result: NativeResult<Option<BridgeObject>>,
    pid: ProcessId,
  ) -> Option<BridgeContext> {
    result.or_log(KIND).flatten().map(|object| self.adopt(object, pid))
  }

  fn pid_of(&self, window: WindowHandle) -> ProcessId {
    self.windows.process_id(window).unwrap_or(ProcessId(0))
  }

  /// Canonical object for an owned context. `None` if the VM no longer knows it.
  fn object_for(&self, ctx: BridgeContext) -> Option<AccessibleObject> {
    let info = self.binding.context_info(ctx.object()).or_log(KIND)?;
    let value = if info.accessible_value {
      self.binding.current_value(ctx.object()).or_log(KIND).flatten()
    } else {
      None
    };
    let provider: Arc<dyn Provider> = self.me.upgrade()?;
    let pid = ctx.pid();
    let mut obj = AccessibleObject::new(ObjectId::new(NativeHandle::Bridge(ctx), pid), provider);
    mapping::apply(&mut obj, &info);
    obj.value = value;
    Some(obj)
  }

  /// The context behind a handle, while the bridge is loaded.
  fn context<'h>(&self, handle: &'h NativeHandle) -> Option<&'h BridgeContext> {
    if !self.init.is_done() {
      return None;
    }
    match handle {
      NativeHandle::Bridge(ctx) => Some(ctx),
      NativeHandle::Tree(_) | NativeHandle::Legacy { .. } | NativeHandle::Extension { .. } => None,
    }
  }

  fn parent_context(&self, ctx: &BridgeContext) -> Option<BridgeContext> {
    self.adopt_result(self.binding.parent(ctx.object()), ctx.pid())
  }

  fn sibling(&self, handle: &NativeHandle, offset: i32) -> Option<AccessibleObject> {
    let ctx = self.context(handle)?;
    let info = self.binding.context_info(ctx.object()).or_log(KIND)?;
    let index = info.index_in_parent.checked_add(offset).filter(|i| *i >= 0)?;
    let parent = self.parent_context(ctx)?;
    let sibling = self.adopt_result(self.binding.child(parent.object(), index), ctx.pid())?;
    self.object_for(sibling)
  }

  fn on_native_event(&self, event: BridgeEvent, sink: &EventSink) {
    // Adopt first: the source must be released even when nothing is emitted.
    let pid = event.window.map_or(ProcessId(0), |w| self.pid_of(w));
    let ctx = self.adopt(event.source, pid);
    if let Some(object) = self.object_for(ctx) {
      sink.emit(ProviderEvent::new(mapping::event_kind(event.kind), object));
    }
  }
}

impl Provider for BridgeProvider {
  fn kind(&self) -> ApiKind {
    KIND
  }

  fn is_available(&self) -> bool {
    if !self.java_running() {
      log::trace!("[{KIND}] no Java process running");
      return false;
    }
    self.check_installed()
  }

  fn initialize(&self) -> bool {
    self.init.run(|| self.library.load().or_log(KIND).is_some())
  }

  fn is_initialized(&self) -> bool {
    self.init.is_done()
  }

  fn owns_window(&self, window: WindowHandle) -> bool {
    self.init.is_done() && self.binding.is_java_window(window)
  }

  fn resolve_focused(&self) -> Option<AccessibleObject> {
    let window = self.windows.foreground_window()?;
    if !self.owns_window(window) {
      return None;
    }
    let ctx = self.adopt_result(self.binding.context_with_focus(window), self.pid_of(window))?;
    self.object_for(ctx)
  }

  fn resolve_at_point(&self, point: Point) -> Option<AccessibleObject> {
    let window = self.windows.window_at_point(point)?;
    if !self.owns_window(window) {
      return None;
    }
    let pid = self.pid_of(window);
    let root = self.adopt_result(self.binding.context_from_window(window), pid)?;
    let hit = self.adopt_result(self.binding.context_at(root.object(), point), pid)?;
    self.object_for(hit)
  }

  fn resolve_at_window(&self, window: WindowHandle) -> Option<AccessibleObject> {
    if !self.init.is_done() {
      return None;
    }
    let ctx = self.adopt_result(self.binding.context_from_window(window), self.pid_of(window))?;
    self.object_for(ctx)
  }

  fn parent(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    let ctx = self.context(handle)?;
    self.object_for(self.parent_context(ctx)?)
  }

  fn children(&self, handle: &NativeHandle) -> Vec<AccessibleObject> {
    let Some(ctx) = self.context(handle) else {
      return Vec::new();
    };
    let Some(info) = self.binding.context_info(ctx.object()).or_log(KIND) else {
      return Vec::new();
    };
    let count = info.children_count.clamp(0, MAX_CHILDREN);
    if count < info.children_count {
      log::warn!("[{KIND}] {ctx:?} reports {} children, truncating", info.children_count);
    }
    (0..count)
      .filter_map(|i| self.adopt_result(self.binding.child(ctx.object(), i), ctx.pid()))
      .filter_map(|child| self.object_for(child))
      .collect()
  }

  fn next_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    self.sibling(handle, 1)
  }

  fn previous_sibling(&self, handle: &NativeHandle) -> Option<AccessibleObject> {
    self.sibling(handle, -1)
  }

  fn set_focus(&self, handle: &NativeHandle) -> bool {
    self.context(handle).is_some_and(|ctx| self.binding.request_focus(ctx.object()).or_log(KIND).is_some())
  }

  fn invoke(&self, handle: &NativeHandle) -> bool {
    let Some(ctx) = self.context(handle) else {
      return false;
    };
    let Some(actions) = self.binding.actions(ctx.object()).or_log(KIND) else {
      return false;
    };
    let chosen = actions
      .iter()
      .find(|a| PREFERRED_ACTIONS.contains(&a.to_lowercase().as_str()))
      .or_else(|| actions.first());
    let Some(action) = chosen else {
      log::debug!("[{KIND}] {ctx:?} has no actions");
      return false;
    };
    self.binding.do_action(ctx.object(), action).or_log(KIND).is_some()
  }

  fn text(&self, handle: &NativeHandle) -> Option<String> {
    let ctx = self.context(handle)?;
    let info = self.binding.context_info(ctx.object()).or_log(KIND)?;
    if !info.accessible_text {
      return None;
    }
    self.binding.text(ctx.object()).or_log(KIND).flatten()
  }

  fn set_text(&self, handle: &NativeHandle, text: &str) -> bool {
    let Some(ctx) = self.context(handle) else {
      return false;
    };
    let Some(info) = self.binding.context_info(ctx.object()).or_log(KIND) else {
      return false;
    };
    if !mapping::states_from_list(&info.states_en_us).contains(StateSet::EDITABLE) {
      return false;
    }
    self.binding.set_text_contents(ctx.object(), text).or_log(KIND).is_some()
  }

  fn start_listening(&self, sink: EventSink) -> bool {
    if self.listening.swap(true, Ordering::SeqCst) {
      return true;
    }
    let me = self.me.clone();
    let library = Arc::clone(&self.library);
    let handler: BridgeEventHandler = Arc::new(move |event| {
      if let Some(provider) = me.upgrade() {
        provider.on_native_event(event, &sink);
      } else {
        drop(BridgeContext::adopt(Arc::clone(&library), event.source, ProcessId(0)));
      }
    });
    if self.binding.set_event_handler(handler).or_log(KIND).is_some() {
      true
    } else {
      self.listening.store(false, Ordering::SeqCst);
      false
    }
  }

  fn stop_listening(&self) {
    if self.listening.swap(false, Ordering::SeqCst) {
      self.binding.clear_event_handler();
    }
  }

  /// Stop events and unload the bridge. Later calls answer nothing until
  /// `initialize()` succeeds again; the library itself stays loaded until
  /// every outstanding context has been released.
  fn shutdown(&self) {
    self.stop_listening();
    if self.init.reset() {
      self.library.unload();
    }
  }
}
