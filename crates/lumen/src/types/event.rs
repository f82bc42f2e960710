/*! Events providers emit after translating native notifications. */

use crate::object::AccessibleObject;

/// What changed. One shape for all four native event models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
  /// Keyboard focus moved to the object.
  FocusChanged,
  /// Children were added, removed or reordered under the object.
  StructureChanged,
  /// The object's name changed.
  NameChanged,
  /// The object's value changed.
  ValueChanged,
  /// One or more state flags changed.
  StateChanged,
  /// A document finished loading and its tree is ready to walk.
  DocumentLoaded,
}

/// A canonical event: the kind plus the object it concerns.
#[derive(Debug, Clone)]
pub struct ProviderEvent {
  pub kind: EventKind,
  pub object: AccessibleObject,
}

impl ProviderEvent {
  pub const fn new(kind: EventKind, object: AccessibleObject) -> Self {
    Self { kind, object }
  }
}
