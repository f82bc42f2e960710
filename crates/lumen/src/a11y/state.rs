/*!
Canonical state flags.

Each provider translates its native state representation (bit masks,
property booleans, comma-separated state strings) into a [`StateSet`].
*/

use super::Role;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

bitflags! {
  /// Set of canonical state flags.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
  pub struct StateSet: u64 {
    const FOCUSED = 1 << 0;
    const FOCUSABLE = 1 << 1;
    const SELECTED = 1 << 2;
    const SELECTABLE = 1 << 3;
    const MULTISELECTABLE = 1 << 4;
    const CHECKED = 1 << 5;
    const MIXED = 1 << 6;
    const CHECKABLE = 1 << 7;
    const PRESSED = 1 << 8;
    const EXPANDED = 1 << 9;
    const COLLAPSED = 1 << 10;
    const EXPANDABLE = 1 << 11;
    const BUSY = 1 << 12;
    const READ_ONLY = 1 << 13;
    const EDITABLE = 1 << 14;
    const REQUIRED = 1 << 15;
    const INVALID = 1 << 16;
    const DISABLED = 1 << 17;
    const INVISIBLE = 1 << 18;
    const OFFSCREEN = 1 << 19;
    const VISITED = 1 << 20;
    const LINKED = 1 << 21;
    const PROTECTED = 1 << 22;
    const HAS_POPUP = 1 << 23;
    const MODAL = 1 << 24;
    const MULTILINE = 1 << 25;
    const SINGLE_LINE = 1 << 26;
    const DEFAULT = 1 << 27;
    const HOT_TRACKED = 1 << 28;
    const ANIMATED = 1 << 29;
    const TRAVERSED = 1 << 30;
    const SORTED_ASCENDING = 1 << 31;
    const SORTED_DESCENDING = 1 << 32;
    const HORIZONTAL = 1 << 33;
    const VERTICAL = 1 << 34;
    const CURRENT = 1 << 35;
  }
}

/// Spoken text for each flag. Lookup is by single-flag equality.
const STATE_TEXT: &[(StateSet, &str)] = &[
  (StateSet::FOCUSED, "focused"),
  (StateSet::FOCUSABLE, "focusable"),
  (StateSet::SELECTED, "selected"),
  (StateSet::SELECTABLE, "selectable"),
  (StateSet::MULTISELECTABLE, "multi select"),
  (StateSet::CHECKED, "checked"),
  (StateSet::MIXED, "half checked"),
  (StateSet::CHECKABLE, "checkable"),
  (StateSet::PRESSED, "pressed"),
  (StateSet::EXPANDED, "expanded"),
  (StateSet::COLLAPSED, "collapsed"),
  (StateSet::EXPANDABLE, "expandable"),
  (StateSet::BUSY, "busy"),
  (StateSet::READ_ONLY, "read only"),
  (StateSet::EDITABLE, "editable"),
  (StateSet::REQUIRED, "required"),
  (StateSet::INVALID, "invalid entry"),
  (StateSet::DISABLED, "unavailable"),
  (StateSet::INVISIBLE, "invisible"),
  (StateSet::OFFSCREEN, "off screen"),
  (StateSet::VISITED, "visited"),
  (StateSet::LINKED, "linked"),
  (StateSet::PROTECTED, "protected"),
  (StateSet::HAS_POPUP, "sub menu"),
  (StateSet::MODAL, "modal"),
  (StateSet::MULTILINE, "multi line"),
  (StateSet::SINGLE_LINE, "single line"),
  (StateSet::DEFAULT, "default"),
  (StateSet::HOT_TRACKED, "hot tracked"),
  (StateSet::ANIMATED, "animated"),
  (StateSet::TRAVERSED, "traversed"),
  (StateSet::SORTED_ASCENDING, "sorted ascending"),
  (StateSet::SORTED_DESCENDING, "sorted descending"),
  (StateSet::HORIZONTAL, "horizontal"),
  (StateSet::VERTICAL, "vertical"),
  (StateSet::CURRENT, "current"),
];

impl StateSet {
  /// Flags worth speaking when an object is announced, in announcement order.
  /// Check states are handled separately because they also speak their absence.
  const ANNOUNCED: Self = Self::PRESSED
    .union(Self::EXPANDED)
    .union(Self::COLLAPSED)
    .union(Self::SELECTED)
    .union(Self::BUSY)
    .union(Self::READ_ONLY)
    .union(Self::REQUIRED)
    .union(Self::INVALID)
    .union(Self::DISABLED)
    .union(Self::VISITED)
    .union(Self::PROTECTED)
    .union(Self::HAS_POPUP)
    .union(Self::MODAL)
    .union(Self::MULTILINE)
    .union(Self::CURRENT)
    .union(Self::SORTED_ASCENDING)
    .union(Self::SORTED_DESCENDING);

  /// Text for a single flag. Sets with several flags, and flags missing from
  /// the table, fall back to the symbolic flag names.
  pub fn text(self) -> Cow<'static, str> {
    if let Some((_, text)) = STATE_TEXT.iter().find(|(flag, _)| *flag == self) {
      return Cow::Borrowed(text);
    }
    let names: Vec<&str> = self.iter_names().map(|(name, _)| name).collect();
    Cow::Owned(names.join(" "))
  }

  /// Text for every flag in the set, in declaration order.
  pub fn texts(self) -> Vec<Cow<'static, str>> {
    self.iter().map(Self::text).collect()
  }

  /// The state phrases spoken for an object with this role.
  pub fn announcement_parts(self, role: Role) -> Vec<Cow<'static, str>> {
    let mut parts = Vec::new();

    if role.is_checkable() || self.contains(Self::CHECKABLE) {
      if self.contains(Self::MIXED) {
        parts.push(Self::MIXED.text());
      } else if self.contains(Self::CHECKED) {
        parts.push(Self::CHECKED.text());
      } else if !matches!(role, Role::RadioButton | Role::RadioMenuItem) {
        parts.push(Cow::Borrowed("not checked"));
      }
    }

    let mut announced = self.intersection(Self::ANNOUNCED);
    // A selected item in a single-selection container is the norm, not news.
    if !self.contains(Self::MULTISELECTABLE) && role != Role::Tab {
      announced.remove(Self::SELECTED);
    }
    parts.extend(announced.texts());
    parts
  }
}
