//! Rational quadratic Bezier curves over the (lightness, chroma) plane.
//!
//! ```text
//!          w·(1-t)·t·2·P1 + (1-t)²·P0 + t²·P2
//! B(t) = ───────────────────────────────────────
//!          w·(1-t)·t·2    + (1-t)²    + t²
//! ```
//!
//! With `w = 1` this is the ordinary quadratic Bezier; larger weights pull
//! the curve toward the middle control point, sharpening the peak.

/// A point in the (lightness percent, chroma) plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Evaluate the rational quadratic Bezier `(p0, p1, p2, w)` at parameter `t`.
#[must_use]
pub fn quad_bezier_rational(p0: Point, p1: Point, p2: Point, w: f64, t: f64) -> Point {
    let u = 1.0 - t;
    let b0 = u * u;
    let b1 = 2.0 * w * u * t;
    let b2 = t * t;
    let den = b0 + b1 + b2;
    Point {
        x: b2.mul_add(p2.x, b0.mul_add(p0.x, b1 * p1.x)) / den,
        y: b2.mul_add(p2.y, b0.mul_add(p0.y, b1 * p1.y)) / den,
    }
}

/// Sample the curve at `n` evenly spaced parameters over `[0, 1]`.
#[must_use]
pub fn sample(p0: Point, p1: Point, p2: Point, w: f64, n: usize) -> Vec<Point> {
    if n < 2 {
        return vec![quad_bezier_rational(p0, p1, p2, w, 0.0)];
    }
    #[allow(clippy::cast_precision_loss)]
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / last;
            quad_bezier_rational(p0, p1, p2, w, t)
        })
        .collect()
}

/// Piecewise-linear interpolation of `points` (sorted by `x`) at `x`.
///
/// Queries left of the first point return its `y`, queries right of the
/// last return the last `y`. Curves whose peak control point has been
/// pushed far by calibration may not span the full lightness range, and
/// the edge value is the best available answer there.
#[must_use]
pub fn interp(points: &[Point], x: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return 0.0;
    };
    if x <= first.x {
        return first.y;
    }
    if x >= last.x {
        return last.y;
    }

    // First index whose x exceeds the query; 1..len by the checks above.
    let hi = points.partition_point(|p| p.x <= x);
    let (a, b) = (points[hi - 1], points[hi]);
    let span = b.x - a.x;
    if span <= 0.0 {
        return b.y;
    }
    let f = (x - a.x) / span;
    f.mul_add(b.y - a.y, a.y)
}

/// Chroma of the curve at each lightness in `xs`, by sampling `n` points
/// and inverting `x(t)` through [`interp`].
#[must_use]
pub fn y_at_x(p0: Point, p1: Point, p2: Point, w: f64, xs: &[f64], n: usize) -> Vec<f64> {
    let points = sample(p0, p1, p2, w, n);
    xs.iter().map(|&x| interp(&points, x)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
