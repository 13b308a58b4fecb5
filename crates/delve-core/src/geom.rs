//! Grid points and rectangles
//!
//! Rectangles are half-open: `min` is inside, `max` is one past the last
//! column/row. A room of width `w` anchored at the origin is `Rect::from_size(w, h)`.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Integer cell coordinate, either absolute on the grid or local to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Point {
    type Output = Point;

    fn mul(self, rhs: i32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// An axis-aligned rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner (inclusive)
    pub min: Point,
    /// Bottom-right corner (exclusive)
    pub max: Point,
}

impl Rect {
    /// Create a new rectangle from its corners
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Rectangle of the given size anchored at the origin
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self {
            min: Point::ZERO,
            max: Point::new(width, height),
        }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> i32 {
        (self.max.x - self.min.x).max(0)
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> i32 {
        (self.max.y - self.min.y).max(0)
    }

    /// True if the rectangle covers no cells
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Center cell, rounded toward the top-left
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// The same rectangle moved by `offset`
    pub fn translate(&self, offset: Point) -> Rect {
        Rect::new(self.min + offset, self.max + offset)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Check if this rectangle contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Check if the two rectangles share at least one cell
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Calculate the intersection of two rectangles
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }

        Some(Rect::new(
            Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        ))
    }

    /// Iterate every cell of the rectangle, row by row
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (self.min.y..self.max.y)
            .flat_map(move |y| (self.min.x..self.max.x).map(move |x| Point::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rect_dimensions() {
        let r = Rect::new(Point::new(10, 20), Point::new(16, 26));
        assert_eq!(r.width(), 6);
        assert_eq!(r.height(), 6);
        assert_eq!(r.center(), Point::new(13, 23));
    }

    #[test]
    fn test_rect_contains() {
        let outer = Rect::from_size(20, 20);
        let inner = Rect::new(Point::new(5, 5), Point::new(10, 10));
        let outside = Rect::new(Point::new(25, 25), Point::new(30, 30));

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&outside));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::from_size(10, 10);
        let b = a.translate(Point::new(10, 0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&b.translate(Point::new(-1, 0))));
    }

    #[test]
    fn test_rect_intersection() {
        let r1 = Rect::from_size(10, 10);
        let r2 = Rect::new(Point::new(5, 5), Point::new(15, 15));

        assert_eq!(
            r1.intersection(&r2),
            Some(Rect::new(Point::new(5, 5), Point::new(10, 10)))
        );
        assert_eq!(r1.intersection(&r1.translate(Point::new(20, 0))), None);
    }

    #[test]
    fn test_points_cover_area() {
        let r = Rect::new(Point::new(2, 3), Point::new(5, 5));
        let pts: Vec<_> = r.points().collect();
        assert_eq!(pts.len(), 6);
        assert_eq!(pts[0], Point::new(2, 3));
        assert_eq!(pts[5], Point::new(4, 4));
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-20i32..20, -20i32..20, 0i32..15, 0i32..15)
            .prop_map(|(x, y, w, h)| Rect::from_size(w, h).translate(Point::new(x, y)))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn overlap_matches_shared_cells(a in arb_rect(), b in arb_rect()) {
            let shared = a.points().any(|p| b.contains_point(p));
            prop_assert_eq!(a.overlaps(&b), shared);
        }

        #[test]
        fn intersection_is_contained(a in arb_rect(), b in arb_rect()) {
            if let Some(i) = a.intersection(&b) {
                prop_assert!(a.contains(&i));
                prop_assert!(b.contains(&i));
            }
        }
    }
}
