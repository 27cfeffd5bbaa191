// Copyright (c) 2026 rezky_nightky

use std::fmt;

/// Integer grid position. Equality is field-by-field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.x, self.y)
    }
}

/// A discrete straight-line path between two grid points.
///
/// Each axis advances by at most one cell per emitted point and holds
/// once it reaches its target, so the path has max(|dx|, |dy|) + 1
/// points. This is per-axis unit stepping, not Bresenham.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Ray {
    points: Vec<Point>,
}

#[allow(dead_code)]
impl Ray {
    pub fn new(a: Point, b: Point) -> Self {
        let mut points = Vec::with_capacity(((b.x - a.x).abs().max((b.y - a.y).abs()) + 1) as usize);

        let x_dir = if a.x > b.x { -1 } else { 1 };
        let y_dir = if a.y > b.y { -1 } else { 1 };

        let mut x = a.x;
        let mut y = a.y;

        while x != b.x || y != b.y {
            points.push(Point::new(x, y));
            if x != b.x {
                x += x_dir;
            }
            if y != b.y {
                y += y_dir;
            }
        }
        points.push(Point::new(x, y));

        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_ray_is_a_single_point() {
        let r = Ray::new(Point::new(4, -2), Point::new(4, -2));
        assert_eq!(r.points(), &[Point::new(4, -2)]);
    }

    #[test]
    fn short_axis_reaches_target_early_and_holds() {
        let r = Ray::new(Point::new(0, 0), Point::new(3, 1));
        assert_eq!(
            r.points(),
            &[
                Point::new(0, 0),
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(3, 1),
            ]
        );
    }

    #[test]
    fn steps_backwards_on_both_axes() {
        let r = Ray::new(Point::new(2, 2), Point::new(0, 0));
        assert_eq!(
            r.points(),
            &[Point::new(2, 2), Point::new(1, 1), Point::new(0, 0)]
        );
    }

    #[test]
    fn length_is_longest_axis_plus_one() {
        let r = Ray::new(Point::new(0, 0), Point::new(0, 7));
        assert_eq!(r.len(), 8);
        assert!(!r.is_empty());
    }

    #[test]
    fn point_displays_in_angle_brackets() {
        assert_eq!(Point::new(-3, 9).to_string(), "<-3, 9>");
    }
}
