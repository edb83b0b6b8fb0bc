//! Geometric primitives carried alongside recognized text.
//!
//! Fusion performs no geometric computation of its own; boxes ride along with
//! line results so downstream consumers keep their spatial anchors, and a
//! fused line's box is the union of its members' boxes.

use serde::{Deserialize, Serialize};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum x-coordinate.
    pub x_min: f32,
    /// Minimum y-coordinate.
    pub y_min: f32,
    /// Maximum x-coordinate.
    pub x_max: f32,
    /// Maximum y-coordinate.
    pub y_max: f32,
}

impl BoundingBox {
    /// Creates a bounding box from corner coordinates.
    ///
    /// # Arguments
    ///
    /// * `x1` - The x-coordinate of the top-left corner.
    /// * `y1` - The y-coordinate of the top-left corner.
    /// * `x2` - The x-coordinate of the bottom-right corner.
    /// * `y2` - The y-coordinate of the bottom-right corner.
    ///
    /// # Returns
    ///
    /// A new `BoundingBox` instance. Coordinates are reordered so that min is
    /// never greater than max.
    pub fn from_coords(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Returns the top-left corner of the box.
    pub fn top_left(&self) -> Point {
        Point::new(self.x_min, self.y_min)
    }

    /// Returns the bottom-right corner of the box.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x_max, self.y_max)
    }

    /// Returns the width of the box.
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Returns the height of the box.
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Returns the smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Folds an iterator of boxes into their union, or `None` when empty.
    pub fn union_all<I>(boxes: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = BoundingBox>,
    {
        boxes.into_iter().reduce(|a, b| a.union(&b))
    }
}
