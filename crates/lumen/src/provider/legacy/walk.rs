/*!
Hierarchy walking over the handle-based API.

Shared by the handle-based and extension providers, which differ only in how
they turn a located object into a canonical one.
*/

use super::binding::{LegacyBinding, LegacyChild, LegacyRef, NavDirection};
use crate::object::CHILD_ID_SELF;
use crate::provider::NativeResultExt;
use crate::types::{log_native, ApiKind, NativeToken, WindowHandle};

/// Focus chains deeper than this are treated as cycles.
const MAX_FOCUS_DEPTH: usize = 32;

/// A reference plus the window it lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
  pub(crate) window: WindowHandle,
  pub(crate) target: LegacyRef,
}

impl Located {
  pub(crate) const fn new(window: WindowHandle, target: LegacyRef) -> Self {
    Self { window, target }
  }
}

pub(crate) struct Walker<'a, B: ?Sized> {
  binding: &'a B,
  kind: ApiKind,
}

impl<'a, B: LegacyBinding + ?Sized> Walker<'a, B> {
  pub(crate) const fn new(binding: &'a B, kind: ApiKind) -> Self {
    Self { binding, kind }
  }

  fn window_of(&self, token: NativeToken, fallback: WindowHandle) -> WindowHandle {
    self
      .binding
      .window_from_object(token)
      .or_log(self.kind)
      .flatten()
      .unwrap_or(fallback)
  }

  /// Interpret a child entry relative to the object that reported it.
  fn resolve_child(&self, container: Located, child: LegacyChild) -> Located {
    match child {
      LegacyChild::Object(token) => {
        Located::new(self.window_of(token, container.window), LegacyRef::object(token))
      }
      LegacyChild::Element(id) => {
        Located::new(container.window, LegacyRef::element(container.target.token, id))
      }
    }
  }

  pub(crate) fn parent(&self, at: Located) -> Option<Located> {
    if at.target.is_simple() {
      return Some(Located::new(at.window, LegacyRef::object(at.target.token)));
    }
    let parent = self.binding.parent(at.target.token).or_log(self.kind).flatten()?;
    Some(Located::new(self.window_of(parent, at.window), LegacyRef::object(parent)))
  }

  pub(crate) fn children(&self, at: Located) -> Vec<Located> {
    if at.target.is_simple() {
      return Vec::new();
    }
    self
      .binding
      .children(at.target.token)
      .or_log(self.kind)
      .unwrap_or_default()
      .into_iter()
      .map(|child| self.resolve_child(at, child))
      .collect()
  }

  /// Native navigation first; servers that do not implement it get a parent scan.
  pub(crate) fn sibling(&self, at: Located, direction: NavDirection) -> Option<Located> {
    match self.binding.navigate(at.target, direction) {
      Ok(found) => {
        let container = Located::new(at.window, LegacyRef::object(at.target.token));
        found.map(|child| self.resolve_child(container, child))
      }
      Err(err) if err.is_unsupported() => self.sibling_by_scan(at, direction),
      Err(err) => {
        log_native(&self.kind.to_string(), &err);
        None
      }
    }
  }

  fn sibling_by_scan(&self, at: Located, direction: NavDirection) -> Option<Located> {
    let parent = self.parent(at)?;
    let siblings = self.children(parent);
    let index = siblings.iter().position(|s| s.target == at.target)?;
    let next = match direction {
      NavDirection::Next => index.checked_add(1)?,
      NavDirection::Previous => index.checked_sub(1)?,
    };
    siblings.get(next).copied()
  }

  /// Follow the focus chain down from a window's client object.
  pub(crate) fn focus_within(&self, window: WindowHandle) -> Option<Located> {
    let root = self.binding.object_from_window(window).or_log(self.kind).flatten()?;
    let mut current = Located::new(window, LegacyRef::object(root));
    for _ in 0..MAX_FOCUS_DEPTH {
      match self.binding.focus(current.target.token).or_log(self.kind).flatten() {
        Some(LegacyChild::Object(token)) if token != current.target.token => {
          current = self.resolve_child(current, LegacyChild::Object(token));
        }
        Some(LegacyChild::Element(id)) if id != CHILD_ID_SELF => {
          return Some(self.resolve_child(current, LegacyChild::Element(id)));
        }
        Some(LegacyChild::Object(_) | LegacyChild::Element(_)) | None => return Some(current),
      }
    }
    log::debug!("[{}] focus chain in {window} deeper than {MAX_FOCUS_DEPTH}", self.kind);
    Some(current)
  }
}
