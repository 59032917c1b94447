//! Planar geometry helpers
//!
//! The map occupies the rectangle `[0, width] x [0, height]`.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const SIDE_LEFT: u8 = 1;
const SIDE_RIGHT: u8 = 2;
const SIDE_TOP: u8 = 4;
const SIDE_BOTTOM: u8 = 8;

/// Rectangular extent of the generated map, anchored at the origin
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Default positional tolerance for this map size
    ///
    /// Used for corner deduplication and border tests.
    #[inline]
    pub fn tolerance(&self) -> f64 {
        1e-6 * self.width.max(self.height)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Check whether a point lies inside the rectangle (inclusive)
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Check whether a point lies on the rectangle outline within `tolerance`
    #[inline]
    pub fn on_border(&self, point: DVec2, tolerance: f64) -> bool {
        self.sides(point, tolerance) != 0
    }

    /// Rectangle corners, counter-clockwise (y-up) from the origin
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(0.0, 0.0),
            DVec2::new(self.width, 0.0),
            DVec2::new(self.width, self.height),
            DVec2::new(0.0, self.height),
        ]
    }

    /// Bitmask of the sides a point touches
    fn sides(&self, point: DVec2, tolerance: f64) -> u8 {
        let mut mask = 0;
        if point.x.abs() <= tolerance {
            mask |= SIDE_LEFT;
        }
        if (point.x - self.width).abs() <= tolerance {
            mask |= SIDE_RIGHT;
        }
        if point.y.abs() <= tolerance {
            mask |= SIDE_TOP;
        }
        if (point.y - self.height).abs() <= tolerance {
            mask |= SIDE_BOTTOM;
        }
        mask
    }

    /// Length of the rectangle outline
    #[inline]
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }

    /// Position of a border point along the outline
    ///
    /// Measured counter-clockwise (y-up) from the origin, in `[0, perimeter)`.
    /// The point is projected onto its nearest side first.
    pub fn outline_position(&self, point: DVec2) -> f64 {
        let (w, h) = (self.width, self.height);
        let x = point.x.clamp(0.0, w);
        let y = point.y.clamp(0.0, h);

        let distances = [point.y.abs(), (point.x - w).abs(), (point.y - h).abs(), point.x.abs()];
        let side = (0..4)
            .min_by(|&a, &b| distances[a].total_cmp(&distances[b]))
            .unwrap_or(0);

        let t = match side {
            0 => x,
            1 => w + y,
            2 => w + h + (w - x),
            _ => 2.0 * w + h + (h - y),
        };
        t.rem_euclid(self.perimeter())
    }

    /// Distance walked along the outline, counter-clockwise, from `from` to `to`
    #[inline]
    pub fn outline_distance(&self, from: DVec2, to: DVec2) -> f64 {
        (self.outline_position(to) - self.outline_position(from)).rem_euclid(self.perimeter())
    }

    /// Rectangle corners passed when walking the outline counter-clockwise
    /// from `from` to `to`, in walking order
    ///
    /// Corners within `tolerance` of either end are not included.
    pub fn corners_between(&self, from: DVec2, to: DVec2, tolerance: f64) -> Vec<DVec2> {
        let perimeter = self.perimeter();
        let start = self.outline_position(from);
        let span = self.outline_distance(from, to);

        let mut passed: Vec<(f64, DVec2)> = self
            .corners()
            .into_iter()
            .map(|corner| ((self.outline_position(corner) - start).rem_euclid(perimeter), corner))
            .filter(|&(d, _)| d > tolerance && d < span - tolerance)
            .collect();
        passed.sort_by(|a, b| a.0.total_cmp(&b.0));
        passed.into_iter().map(|(_, corner)| corner).collect()
    }
}

/// Signed area of the triangle `(a, b, c)`; positive when counter-clockwise
/// in a y-up frame
#[inline]
pub fn signed_triangle_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    0.5 * (b - a).perp_dot(c - a)
}

#[inline]
pub fn triangle_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    signed_triangle_area(a, b, c).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_border() {
        let bounds = Bounds::new(100.0, 50.0);
        let tol = bounds.tolerance();

        assert!(bounds.on_border(DVec2::new(0.0, 20.0), tol));
        assert!(bounds.on_border(DVec2::new(100.0, 20.0), tol));
        assert!(bounds.on_border(DVec2::new(30.0, 50.0), tol));
        assert!(!bounds.on_border(DVec2::new(30.0, 25.0), tol));
    }

    #[test]
    fn test_outline_position() {
        let bounds = Bounds::new(10.0, 4.0);
        assert_eq!(bounds.perimeter(), 28.0);
        assert_eq!(bounds.outline_position(DVec2::new(3.0, 0.0)), 3.0);
        assert_eq!(bounds.outline_position(DVec2::new(10.0, 1.0)), 11.0);
        assert_eq!(bounds.outline_position(DVec2::new(7.0, 4.0)), 17.0);
        assert_eq!(bounds.outline_position(DVec2::new(0.0, 1.0)), 27.0);
        // The origin sits at both ends of the walk
        assert_eq!(bounds.outline_position(DVec2::new(0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_corners_between_adjacent_sides() {
        let bounds = Bounds::new(10.0, 10.0);
        let tol = bounds.tolerance();

        let corners = bounds.corners_between(DVec2::new(0.0, 5.0), DVec2::new(5.0, 0.0), tol);
        assert_eq!(corners, vec![DVec2::new(0.0, 0.0)]);

        // Same side, walking forward: nothing to insert
        assert!(bounds
            .corners_between(DVec2::new(2.0, 0.0), DVec2::new(8.0, 0.0), tol)
            .is_empty());
    }

    #[test]
    fn test_corners_between_opposite_sides() {
        let bounds = Bounds::new(10.0, 10.0);
        let tol = bounds.tolerance();

        // Right side up to the left side passes the two top corners
        let corners = bounds.corners_between(DVec2::new(10.0, 4.0), DVec2::new(0.0, 6.0), tol);
        assert_eq!(corners, vec![DVec2::new(10.0, 10.0), DVec2::new(0.0, 10.0)]);

        // Walking the other way round passes the bottom corners instead
        let corners = bounds.corners_between(DVec2::new(0.0, 6.0), DVec2::new(10.0, 4.0), tol);
        assert_eq!(corners, vec![DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)]);
    }

    #[test]
    fn test_corners_between_wraps_three_sides() {
        let bounds = Bounds::new(10.0, 10.0);
        let tol = bounds.tolerance();

        // From the top side all the way round to the bottom side
        let corners = bounds.corners_between(DVec2::new(6.0, 10.0), DVec2::new(4.0, 0.0), tol);
        assert_eq!(corners, vec![DVec2::new(0.0, 10.0), DVec2::new(0.0, 0.0)]);

        let corners = bounds.corners_between(DVec2::new(4.0, 0.0), DVec2::new(6.0, 10.0), tol);
        assert_eq!(corners, vec![DVec2::new(10.0, 0.0), DVec2::new(10.0, 10.0)]);

        // Ends sitting on a rectangle corner do not repeat it
        let corners = bounds.corners_between(DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0), tol);
        assert_eq!(corners, vec![DVec2::new(10.0, 10.0)]);
    }

    #[test]
    fn test_triangle_area() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(2.0, 0.0);
        let c = DVec2::new(0.0, 2.0);
        assert_eq!(signed_triangle_area(a, b, c), 2.0);
        assert_eq!(signed_triangle_area(a, c, b), -2.0);
        assert_eq!(triangle_area(a, c, b), 2.0);
    }
}
