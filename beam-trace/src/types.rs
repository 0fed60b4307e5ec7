// SPDX-License-Identifier: MIT
//! # Contour Geometry Types
//!
//! Integer points in source-raster space and the ordered chains built from them.
//! Both types are produced by the tracer and consumed read-only by the path core.

/// Integer position in source-raster coordinates (x to the right, y down).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The coordinate origin, used as the parked beam position when costing
    /// the first move of a frame.
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Ordered chain of points approximating the outline of one connected region.
///
/// A contour may be open or closed; the tracer does not repeat the first point
/// at the end of a closed chain.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(3, 4).distance(Point::ORIGIN), 5.0);
        assert_eq!(Point::new(-2, 7).distance(Point::new(-2, 7)), 0.0);
    }

    #[test]
    fn contour_endpoints() {
        let c: Contour = [(1, 1), (2, 1), (3, 2)].into_iter().map(Point::from).collect();
        assert_eq!(c.len(), 3);
        assert_eq!(c.first(), Some(Point::new(1, 1)));
        assert_eq!(c.last(), Some(Point::new(3, 2)));

        let empty = Contour::default();
        assert!(empty.is_empty());
        assert_eq!(empty.first(), None);
    }
}
