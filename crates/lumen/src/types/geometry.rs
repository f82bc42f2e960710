/*! Geometry types for screen coordinates. */

use serde::{Deserialize, Serialize};

/// Rectangle bounds in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
  pub x: f64,
  pub y: f64,
  pub w: f64,
  pub h: f64,
}

impl Bounds {
  pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
    Self { x, y, w, h }
  }

  /// Build bounds from an integer `(left, top, width, height)` location,
  /// the shape handle-based and bridge APIs report.
  pub fn from_location(left: i32, top: i32, width: i32, height: i32) -> Self {
    Self {
      x: f64::from(left),
      y: f64::from(top),
      w: f64::from(width.max(0)),
      h: f64::from(height.max(0)),
    }
  }

  /// Zero-area bounds. Offscreen or collapsed elements report these.
  pub fn is_empty(&self) -> bool {
    self.w <= 0.0 || self.h <= 0.0
  }

  /// Check if a point is contained within these bounds (edges inclusive).
  pub fn contains(&self, point: Point) -> bool {
    point.x >= self.x
      && point.x <= self.x + self.w
      && point.y >= self.y
      && point.y <= self.y + self.h
  }

  /// Check whether two rectangles share any area.
  pub fn intersects(&self, other: &Bounds) -> bool {
    self.x < other.x + other.w
      && other.x < self.x + self.w
      && self.y < other.y + other.h
      && other.y < self.y + self.h
  }

  /// Center point, used when a click has to be synthesized.
  pub fn center(&self) -> Point {
    Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
  }
}

/// A 2D point in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod bounds_from_location {
    use super::*;

    #[test]
    fn converts_integer_location() {
      let b = Bounds::from_location(10, 20, 100, 50);
      assert_eq!(b, Bounds::new(10.0, 20.0, 100.0, 50.0));
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
      let b = Bounds::from_location(10, 20, -5, -1);
      assert_eq!(b.w, 0.0);
      assert_eq!(b.h, 0.0);
      assert!(b.is_empty());
    }
  }

  mod bounds_contains {
    use super::*;

    #[test]
    fn point_inside_bounds() {
      let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
      assert!(
        bounds.contains(Point::new(50.0, 50.0)),
        "center point should be contained"
      );
    }

    #[test]
    fn corners_are_contained() {
      let bounds = Bounds::new(10.0, 20.0, 100.0, 50.0);
      assert!(bounds.contains(Point::new(10.0, 20.0)), "top-left corner");
      assert!(bounds.contains(Point::new(110.0, 70.0)), "bottom-right corner");
    }

    #[test]
    fn point_outside_bounds() {
      let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
      assert!(!bounds.contains(Point::new(-1.0, 50.0)), "left of bounds");
      assert!(!bounds.contains(Point::new(50.0, 101.0)), "below bounds");
    }
  }

  mod bounds_intersects {
    use super::*;

    #[test]
    fn overlapping_rectangles() {
      let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
      let b = Bounds::new(5.0, 5.0, 10.0, 10.0);
      assert!(a.intersects(&b));
      assert!(b.intersects(&a));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
      let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
      let b = Bounds::new(10.0, 0.0, 10.0, 10.0);
      assert!(!a.intersects(&b));
    }
  }

  #[test]
  fn center_of_bounds() {
    let b = Bounds::new(10.0, 10.0, 20.0, 40.0);
    assert_eq!(b.center(), Point::new(20.0, 30.0));
  }
}

#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  fn coord() -> impl Strategy<Value = f64> {
    -10000.0..10000.0f64
  }

  fn dimension() -> impl Strategy<Value = f64> {
    1.0..5000.0f64
  }

  proptest! {
    /// The center of non-empty bounds is always inside them
    #[test]
    fn center_contained(x in coord(), y in coord(), w in dimension(), h in dimension()) {
      let bounds = Bounds::new(x, y, w, h);
      prop_assert!(bounds.contains(bounds.center()));
    }

    /// Intersection is symmetric
    #[test]
    fn intersects_symmetric(
      x1 in coord(), y1 in coord(), w1 in dimension(), h1 in dimension(),
      x2 in coord(), y2 in coord(), w2 in dimension(), h2 in dimension(),
    ) {
      let a = Bounds::new(x1, y1, w1, h1);
      let b = Bounds::new(x2, y2, w2, h2);
      prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    /// Non-empty bounds intersect themselves
    #[test]
    fn intersects_reflexive(x in coord(), y in coord(), w in dimension(), h in dimension()) {
      let bounds = Bounds::new(x, y, w, h);
      prop_assert!(bounds.intersects(&bounds));
    }
  }
}
