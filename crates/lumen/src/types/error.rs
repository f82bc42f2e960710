/*! Error types.

Two layers: [`NativeError`] is what a native binding reports and never leaves a
provider; [`LumenError`] covers the few public operations that can fail.
*/

/// Status codes native bindings report for conditions the providers treat specially.
pub mod status {
  /// Reinterpret a 32-bit status word as the signed value bindings report.
  const fn hresult(code: u32) -> i32 {
    i32::from_ne_bytes(code.to_ne_bytes())
  }

  /// UI Automation: the element is no longer available.
  pub const ELEMENT_NOT_AVAILABLE: i32 = hresult(0x8004_0201);
  /// COM: the object invoked has disconnected from its clients.
  pub const RPC_DISCONNECTED: i32 = hresult(0x8001_0108);
  /// COM: object is not connected to server.
  pub const OBJECT_NOT_CONNECTED: i32 = hresult(0x8004_01FD);
  /// RPC: the server process went away.
  pub const SERVER_UNAVAILABLE: i32 = hresult(0x8007_06BA);
  /// One or more arguments are invalid (stale child ids land here).
  pub const INVALID_ARG: i32 = hresult(0x8007_0057);
  /// Interface or pattern not supported.
  pub const NO_INTERFACE: i32 = hresult(0x8000_4002);
  /// Not implemented.
  pub const NOT_IMPLEMENTED: i32 = hresult(0x8000_4001);
  /// Generic failure.
  pub const FAIL: i32 = hresult(0x8000_4005);
  /// Bridge: the context no longer refers to a live Java object.
  pub const BRIDGE_INVALID_CONTEXT: i32 = -2;
  /// Bridge: the call returned FALSE without further detail.
  pub const BRIDGE_CALL_FAILED: i32 = -1;
}

/// A failed native call: which entry point, and the status it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{call} failed with status {status:#010x}")]
pub struct NativeError {
  pub call: &'static str,
  pub status: i32,
}

impl NativeError {
  pub const fn new(call: &'static str, status: i32) -> Self {
    Self { call, status }
  }

  /// The native reference no longer points at a live element.
  pub const fn is_stale(&self) -> bool {
    matches!(
      self.status,
      status::ELEMENT_NOT_AVAILABLE
        | status::RPC_DISCONNECTED
        | status::OBJECT_NOT_CONNECTED
        | status::SERVER_UNAVAILABLE
        | status::INVALID_ARG
        | status::BRIDGE_INVALID_CONTEXT
    )
  }

  /// The capability simply does not exist on this element.
  pub const fn is_unsupported(&self) -> bool {
    matches!(self.status, status::NO_INTERFACE | status::NOT_IMPLEMENTED)
  }
}

/// Result of a call across a native binding.
pub type NativeResult<T> = Result<T, NativeError>;

/// Errors surfaced by the public API.
#[derive(Debug, thiserror::Error)]
pub enum LumenError {
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(#[from] serde_json::Error),

  #[error("Unknown navigation token: {0:?}")]
  UnknownNavToken(String),

  #[error("Failed to start buffer workers: {0}")]
  WorkerPool(#[from] rayon::ThreadPoolBuildError),

  #[error("Document load was abandoned before completion")]
  LoadAbandoned,

  #[error("Node not found: {0}")]
  NodeNotFound(super::NodeId),

  #[error("No document loaded")]
  NoDocument,
}

/// Result type for public operations.
pub type LumenResult<T> = Result<T, LumenError>;

/// Log a native failure at the provider boundary and discard it.
///
/// Stale references are expected during normal operation and only logged at debug;
/// unsupported capabilities are silent; anything else is a warning.
pub(crate) fn log_native(provider: &str, err: &NativeError) {
  if err.is_unsupported() {
    return;
  }
  if err.is_stale() {
    log::debug!("[{provider}] stale reference: {err}");
  } else {
    log::warn!("[{provider}] {err}");
  }
}
