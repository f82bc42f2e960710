/*!
RAII ownership of bridge object references.

[`BridgeLibrary`] counts the references alive on behalf of this process. The
library is only unloaded once that count is zero, so a context that outlives
the provider's shutdown still releases into a loaded bridge.
*/

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::binding::{BridgeBinding, BridgeObject};
use crate::types::{ApiKind, NativeResult, ProcessId};

#[derive(Debug, Default)]
struct LibraryState {
  live: usize,
  unload_pending: bool,
}

/// The loaded bridge plus the bookkeeping that keeps it loaded while in use.
pub(crate) struct BridgeLibrary {
  binding: Arc<dyn BridgeBinding>,
  state: Mutex<LibraryState>,
}

impl fmt::Debug for BridgeLibrary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BridgeLibrary").field("state", &*self.state.lock()).finish_non_exhaustive()
  }
}

impl BridgeLibrary {
  pub(crate) fn new(binding: Arc<dyn BridgeBinding>) -> Arc<Self> {
    Arc::new(Self {
      binding,
      state: Mutex::new(LibraryState::default()),
    })
  }

  /// Load the library. A load while an unload is still pending keeps the
  /// library that is already there.
  pub(crate) fn load(&self) -> NativeResult<()> {
    let mut state = self.state.lock();
    if state.unload_pending {
      state.unload_pending = false;
      return Ok(());
    }
    self.binding.load()
  }

  /// Unload now, or as soon as the last live context is released.
  pub(crate) fn unload(&self) {
    let mut state = self.state.lock();
    if state.live == 0 {
      self.binding.unload();
    } else {
      log::debug!(
        "[{}] deferring unload until {} live contexts are released",
        ApiKind::Bridge,
        state.live
      );
      state.unload_pending = true;
    }
  }

  /// References handed out and not yet released.
  pub(crate) fn live(&self) -> usize {
    self.state.lock().live
  }

  fn acquire(&self) {
    self.state.lock().live += 1;
  }

  fn release(&self, object: BridgeObject) {
    let mut state = self.state.lock();
    self.binding.release(object);
    state.live = state.live.saturating_sub(1);
    if state.live == 0 && state.unload_pending {
      state.unload_pending = false;
      self.binding.unload();
    }
  }
}

struct ContextGuard {
  library: Arc<BridgeLibrary>,
  object: BridgeObject,
  pid: ProcessId,
}

impl Drop for ContextGuard {
  fn drop(&mut self) {
    self.library.release(self.object);
  }
}

/// Shared ownership of one bridge object reference.
///
/// Clones share the reference; it is released when the last clone drops.
#[derive(Clone)]
pub struct BridgeContext(Arc<ContextGuard>);

impl BridgeContext {
  /// Take ownership of a reference the binding just handed out.
  pub(crate) fn adopt(library: Arc<BridgeLibrary>, object: BridgeObject, pid: ProcessId) -> Self {
    library.acquire();
    Self(Arc::new(ContextGuard { library, object, pid }))
  }

  pub fn object(&self) -> BridgeObject {
    self.0.object
  }

  pub fn vm_id(&self) -> i32 {
    self.0.object.vm_id
  }

  /// Process hosting the VM.
  pub fn pid(&self) -> ProcessId {
    self.0.pid
  }
}

impl PartialEq for BridgeContext {
  fn eq(&self, other: &Self) -> bool {
    self.0.object == other.0.object
  }
}

impl Eq for BridgeContext {}

impl fmt::Debug for BridgeContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BridgeContext")
      .field("vm_id", &self.0.object.vm_id)
      .field("context", &self.0.object.context)
      .finish()
  }
}
