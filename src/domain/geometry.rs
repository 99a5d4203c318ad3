//! Points and the cubic edge curve.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Swap the axes: layout (spread, depth) becomes screen (depth, spread).
    pub fn transposed(self) -> Self {
        Self::new(self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl CubicBezier {
    pub fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.start.x + b * self.control1.x + c * self.control2.x + d * self.end.x,
            a * self.start.y + b * self.control1.y + c * self.control2.y + d * self.end.y,
        )
    }

    /// SVG path data, e.g. `M0,0C50,0,50,100,100,100`.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{}C{},{},{},{},{},{}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// S-shaped edge from `source` to `target` in screen coordinates.
///
/// Both control points sit at the horizontal midpoint, one at each endpoint's
/// y, so the curve never leaves the vertical span of its endpoints.
pub fn curvy_link(source: Point, target: Point) -> CubicBezier {
    let mid_x = (source.x + target.x) / 2.0;
    CubicBezier {
        start: source,
        control1: Point::new(mid_x, source.y),
        control2: Point::new(mid_x, target.y),
        end: target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_two_points_when_linking_then_controls_at_midpoint() {
        let curve = curvy_link(Point::new(0.0, 10.0), Point::new(100.0, 50.0));
        assert_eq!(curve.control1, Point::new(50.0, 10.0));
        assert_eq!(curve.control2, Point::new(50.0, 50.0));
        assert_eq!(curve.to_svg_path(), "M0,10C50,10,50,50,100,50");
    }

    #[rstest]
    #[case(Point::new(0.0, 0.0), Point::new(120.0, 300.0))]
    #[case(Point::new(40.0, 200.0), Point::new(-80.0, 10.0))]
    #[case(Point::new(5.0, 5.0), Point::new(5.0, 5.0))]
    fn given_link_when_sampling_then_stays_between_endpoint_ys(
        #[case] source: Point,
        #[case] target: Point,
    ) {
        let curve = curvy_link(source, target);
        let (lo, hi) = (source.y.min(target.y), source.y.max(target.y));
        for step in 0..=20 {
            let p = curve.eval(step as f64 / 20.0);
            assert!(p.y >= lo - 1e-9 && p.y <= hi + 1e-9, "{} out of span", p);
        }
        assert_eq!(curve.eval(0.0), source);
        assert_eq!(curve.eval(1.0), target);
    }
}
