/*! Half-open character ranges into a flat text buffer. */

use serde::{Deserialize, Serialize};

/// Character range within buffer text. End is exclusive, matching Rust's `Range` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
  /// Start position (inclusive).
  pub start: usize,
  /// End position (exclusive).
  pub end: usize,
}

impl TextRange {
  /// Create a new text range.
  pub const fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  /// Length of the range in characters.
  pub const fn len(&self) -> usize {
    self.end.saturating_sub(self.start)
  }

  /// Check if the range is empty.
  pub const fn is_empty(&self) -> bool {
    self.start >= self.end
  }

  /// Check if a position falls within this range.
  pub const fn contains(&self, position: usize) -> bool {
    position >= self.start && position < self.end
  }

  /// Check whether two ranges share at least one position. Empty ranges
  /// hold no position, so they overlap nothing.
  pub const fn overlaps(&self, other: &TextRange) -> bool {
    !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
  }
}

impl From<(usize, usize)> for TextRange {
  fn from((start, end): (usize, usize)) -> Self {
    Self { start, end }
  }
}
