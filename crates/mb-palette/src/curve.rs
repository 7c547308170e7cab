//! Per-hue chroma curves: how much chroma each hue carries at each
//! published lightness.
//!
//! ```text
//! monotone:  C(L) = min(chroma, Cmax(L))                      flat
//! accent:    C(L) = max(0, min(Bezier(L), Cmax(L)))           fitted
//!
//!   Bezier control points
//!     start (0, 0) ── peak (L* + l_offset, Cmax(L*+l_offset) + c_offset) ── end (100, 0)
//!   L* = grid lightness with the largest Cmax
//! ```
//!
//! The fitted curve may overshoot the gamut, for instance under a positive
//! `c_offset`. Clipping against [`ChromaBound`] keeps every published point
//! in gamut.

use tracing::debug;

use crate::bezier::{self, Point};
use crate::config::{Calibration, HueRole, HueSpec, LightnessRange};
use crate::error::Result;
use crate::gamut::ChromaBound;

/// Bezier control points and weight of an accent hue's fitted curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierControls {
    pub start: Point,
    pub peak: Point,
    pub end: Point,
    pub weight: f64,
}

/// One hue's chroma at every published lightness.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromaCurve {
    pub name: String,
    pub hue: f64,
    /// Published lightness points, ascending.
    pub lightness: Vec<u8>,
    /// Final (clipped) chroma, parallel to `lightness`.
    pub chroma: Vec<f64>,
    /// Present for accent hues only.
    pub controls: Option<BezierControls>,
}

impl ChromaCurve {
    /// Chroma at a published lightness, if `lightness` is one.
    #[must_use]
    pub fn chroma_at(&self, lightness: u8) -> Option<f64> {
        self.lightness
            .iter()
            .position(|&l| l == lightness)
            .map(|i| self.chroma[i])
    }

    /// `(lightness, chroma)` pairs in ascending lightness.
    pub fn points(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.lightness.iter().copied().zip(self.chroma.iter().copied())
    }

    #[must_use]
    pub const fn is_accent(&self) -> bool {
        self.controls.is_some()
    }
}

/// Place the Bezier control points for an accent hue.
///
/// # Errors
///
/// Propagates gamut search failures.
pub fn fit_controls(
    hue: f64,
    calibration: &Calibration,
    grid: &[f64],
    bound: &ChromaBound,
) -> Result<BezierControls> {
    // First grid point with the largest bound, like argmax.
    let mut peak_l = grid.first().copied().unwrap_or(50.0);
    let mut peak_c = f64::NEG_INFINITY;
    for &l in grid {
        let c = bound.get(l, hue)?;
        if c > peak_c {
            peak_l = l;
            peak_c = c;
        }
    }

    let peak_l = peak_l + calibration.l_offset;
    let peak_c = bound.get(peak_l, hue)? + calibration.c_offset;

    Ok(BezierControls {
        start: Point::new(0.0, 0.0),
        peak: Point::new(peak_l, peak_c),
        end: Point::new(100.0, 0.0),
        weight: calibration.weight,
    })
}

/// Build the final chroma curve for one hue.
///
/// # Errors
///
/// Propagates gamut search failures.
pub fn build_curve(
    spec: &HueSpec,
    range: &LightnessRange,
    bezier_samples: usize,
    bound: &ChromaBound,
) -> Result<ChromaCurve> {
    let lightness = range.points();
    let xs: Vec<f64> = lightness.iter().copied().map(f64::from).collect();

    let (raw, controls) = match spec.role {
        HueRole::Monotone { chroma } => (vec![chroma; xs.len()], None),
        HueRole::Accent(calibration) => {
            let controls = fit_controls(spec.hue, &calibration, &range.grid(), bound)?;
            debug!(
                hue = %spec.name,
                peak_l = controls.peak.x,
                peak_c = controls.peak.y,
                weight = controls.weight,
                "fitted accent curve"
            );
            let raw = bezier::y_at_x(
                controls.start,
                controls.peak,
                controls.end,
                controls.weight,
                &xs,
                bezier_samples,
            );
            (raw, Some(controls))
        }
    };

    let chroma = xs
        .iter()
        .zip(raw)
        .map(|(&l, c)| Ok(c.min(bound.get(l, spec.hue)?).max(0.0)))
        .collect::<Result<Vec<_>>>()?;

    Ok(ChromaCurve {
        name: spec.name.clone(),
        hue: spec.hue,
        lightness,
        chroma,
        controls,
    })
}

/// Build every hue's curve, one scoped worker per hue.
///
/// Output order matches `specs`.
///
/// # Errors
///
/// Returns the first failure in `specs` order.
pub fn build_curves(
    specs: &[HueSpec],
    range: &LightnessRange,
    bezier_samples: usize,
    bound: &ChromaBound,
) -> Result<Vec<ChromaCurve>> {
    std::thread::scope(|s| {
        let handles: Vec<_> = specs
            .iter()
            .map(|spec| s.spawn(move || build_curve(spec, range, bezier_samples, bound)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use mb_color::Gamut;

    use super::*;
    use crate::config::PaletteConfig;

    fn bound() -> ChromaBound {
        ChromaBound::new(Gamut::Srgb, 1e-9, 1e-6)
    }

    fn spec(name: &str) -> HueSpec {
        PaletteConfig::default()
            .hues()
            .unwrap()
            .into_iter()
            .find(|h| h.name == name)
            .unwrap()
    }

    // ── Monotone ────────────────────────────────────────────────────

    #[test]
    fn monotone_curve_is_flat_where_gamut_allows() {
        let bound = bound();
        let range = LightnessRange::default();
        let curve = build_curve(&spec("badlands"), &range, 400, &bound).unwrap();

        assert!(curve.controls.is_none());
        assert_eq!(curve.lightness.len(), 89);
        for (l, c) in curve.points() {
            let cmax = bound.get(f64::from(l), 29.0).unwrap();
            let expected = 0.011f64.min(cmax);
            assert!(c.to_bits() == expected.to_bits(), "L={l}: {c} != {expected}");
        }
        assert_eq!(curve.chroma_at(50), Some(0.011));
    }

    #[test]
    fn achromatic_monotone_is_zero() {
        let curve = build_curve(&spec("alpine"), &LightnessRange::default(), 400, &bound()).unwrap();
        assert!(curve.chroma.iter().all(|&c| c == 0.0));
    }

    // ── Accent ──────────────────────────────────────────────────────

    #[test]
    fn accent_controls_follow_calibration() {
        let bound = bound();
        let grid = LightnessRange::default().grid();
        let plain = fit_controls(262.0, &Calibration::default(), &grid, &bound).unwrap();
        let shifted = fit_controls(
            262.0,
            &Calibration { weight: 3.4, l_offset: 10.0, c_offset: 0.0 },
            &grid,
            &bound,
        )
        .unwrap();

        assert_eq!(plain.start, Point::new(0.0, 0.0));
        assert_eq!(plain.end, Point::new(100.0, 0.0));
        assert!(plain.peak.x % 5.0 == 0.0, "peak must be a grid point");
        assert!((shifted.peak.x - plain.peak.x - 10.0).abs() < 1e-12);
        assert!((shifted.weight - 3.4).abs() < 1e-12);
    }

    #[test]
    fn accent_curve_never_exceeds_bound() {
        let bound = bound();
        for name in ["red", "orange", "yellow", "green", "blue"] {
            let spec = spec(name);
            let curve = build_curve(&spec, &LightnessRange::default(), 400, &bound).unwrap();
            assert!(curve.is_accent());
            for (l, c) in curve.points() {
                let cmax = bound.get(f64::from(l), spec.hue).unwrap();
                assert!(c >= 0.0 && c <= cmax, "{name} L={l}: {c} > {cmax}");
            }
        }
    }

    #[test]
    fn positive_chroma_offset_is_clipped() {
        let bound = bound();
        let mut spec = spec("red");
        spec.role = HueRole::Accent(Calibration { weight: 8.0, l_offset: 0.0, c_offset: 0.2 });
        let curve = build_curve(&spec, &LightnessRange::default(), 400, &bound).unwrap();
        let peak = curve.controls.unwrap().peak;
        let cmax = bound.get(peak.x, spec.hue).unwrap();
        assert!(peak.y > cmax, "control point should overshoot");

        let clipped = curve.points().filter(|&(l, c)| {
            (c - bound.get(f64::from(l), spec.hue).unwrap()).abs() < 1e-12
        });
        assert!(clipped.count() > 0, "no point was clipped to the gamut");
    }

    #[test]
    fn extreme_offset_extrapolates_instead_of_failing() {
        let mut spec = spec("blue");
        spec.role = HueRole::Accent(Calibration { weight: 1.0, l_offset: 80.0, c_offset: 0.0 });
        let curve = build_curve(&spec, &LightnessRange::default(), 400, &bound()).unwrap();
        assert_eq!(curve.chroma.len(), 89);
        assert!(curve.chroma.iter().all(|c| c.is_finite() && *c >= 0.0));
    }

    #[test]
    fn parallel_build_preserves_order() {
        let specs = PaletteConfig::default().hues().unwrap();
        let curves = build_curves(&specs, &LightnessRange::default(), 400, &bound()).unwrap();
        let names: Vec<_> = curves.iter().map(|c| c.name.as_str()).collect();
        let expected: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, expected);
    }
}
