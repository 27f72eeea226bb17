//! Geometric primitives for flow layout.
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangle defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X   (ranks grow rightward)
//!     │
//!     ▼
//!    +Y                  (nodes stack downward within a rank)
//! ```
//!
//! Origin is the top-left corner, matching SVG and screen coordinates.

use serde::{Serialize, Serializer, ser::SerializeStruct};

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use zfl_core::geometry::{Point, Size};
/// let bounds = Point::new(220.0, 20.0).to_bounds(Size::new(160.0, 48.0));
/// assert_eq!(bounds.max_x(), 380.0);
/// assert_eq!(bounds.max_y(), 68.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    /// Bounds of a rectangle of `size` whose top-left corner is this point.
    pub fn to_bounds(self, size: Size) -> Bounds {
        Bounds::new_from_top_left(self, size)
    }
}

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }
}

/// An axis-aligned rectangle stored as minimum and maximum coordinates.
///
/// Serializes as `{x, y, width, height}` with `x`/`y` the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    /// Create bounds from the top-left corner and a size.
    ///
    /// ```
    /// # use zfl_core::geometry::{Bounds, Point, Size};
    /// let b = Bounds::new_from_top_left(Point::new(20.0, 20.0), Size::new(180.0, 56.0));
    /// assert_eq!(b.max_x(), 200.0);
    /// assert_eq!(b.max_y(), 76.0);
    /// ```
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f64 {
        self.min_x
    }

    pub fn min_y(self) -> f64 {
        self.min_y
    }

    pub fn max_x(self) -> f64 {
        self.max_x
    }

    pub fn max_y(self) -> f64 {
        self.max_y
    }

    pub fn width(self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest bounds containing both rectangles.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow the bounds outward by `insets`.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left,
            min_y: self.min_y - insets.top,
            max_x: self.max_x + insets.right,
            max_y: self.max_y + insets.bottom,
        }
    }

    /// Whether `other` lies entirely inside these bounds (edges inclusive).
    pub fn contains(&self, other: &Bounds) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Bounds", 4)?;
        state.serialize_field("x", &self.min_x)?;
        state.serialize_field("y", &self.min_y)?;
        state.serialize_field("width", &self.width())?;
        state.serialize_field("height", &self.height())?;
        state.end()
    }
}

/// Spacing around a rectangle, one value per side.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f64,
    right: f64,
    bottom: f64,
    left: f64,
}

impl Insets {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same value on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f64..1000.0,
            -1000.0f64..1000.0,
            1.0f64..500.0,
            1.0f64..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    /// Merging is order independent.
    fn check_merge_is_commutative(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let m1 = b1.merge(&b2);
        let m2 = b2.merge(&b1);
        prop_assert!(approx_eq!(f64, m1.min_x(), m2.min_x()));
        prop_assert!(approx_eq!(f64, m1.max_y(), m2.max_y()));
        Ok(())
    }

    /// Merged bounds contain both inputs.
    fn check_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        prop_assert!(merged.contains(&b1));
        prop_assert!(merged.contains(&b2));
        Ok(())
    }

    /// Padding grows each dimension by twice the uniform inset.
    fn check_padding_grows_size(bounds: Bounds, pad: f64) -> Result<(), TestCaseError> {
        let padded = bounds.add_padding(Insets::uniform(pad));
        prop_assert!(padded.contains(&bounds));
        prop_assert!(approx_eq!(
            f64,
            padded.width(),
            bounds.width() + 2.0 * pad,
            epsilon = 0.0001
        ));
        Ok(())
    }

    proptest! {
        #[test]
        fn bounds_merge_is_commutative(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_is_commutative(b1, b2)?;
        }

        #[test]
        fn bounds_merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn padding_grows_size(bounds in bounds_strategy(), pad in 0.0f64..100.0) {
            check_padding_grows_size(bounds, pad)?;
        }
    }
}
