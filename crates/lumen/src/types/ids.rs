/*! Branded ID types for type-safe references. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Process ID - branded type to distinguish from other u32 values.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct ProcessId(pub u32);

/// OS window handle as supplied by the window-manager layer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[display("{_0:#x}")]
pub struct WindowHandle(pub u64);

/// Opaque reference a native binding hands out for one of its elements.
///
/// Only the binding that produced a token can interpret it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct NativeToken(pub u64);

/// Index of a node within one built virtual buffer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct NodeId(pub usize);

/// The accessibility API family an object came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum ApiKind {
  /// Modern tree-based API (UI Automation shape).
  #[display("tree")]
  Tree,
  /// Legacy handle + child-id API (MSAA shape).
  #[display("legacy")]
  Legacy,
  /// Extension API layered over the legacy one (IAccessible2 shape).
  #[display("extension")]
  Extension,
  /// Managed-runtime bridge (Java Access Bridge shape).
  #[display("bridge")]
  Bridge,
}

impl ApiKind {
  /// All API families, most specific first (the default dispatch order).
  pub const ALL: &'static [Self] = &[Self::Bridge, Self::Extension, Self::Tree, Self::Legacy];
}
