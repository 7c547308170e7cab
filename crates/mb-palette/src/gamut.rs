//! Maximum in-gamut chroma at a fixed lightness and hue.
//!
//! This is the hottest path of palette construction: it runs for every
//! (grid lightness × accent hue) pair while locating chroma peaks, and
//! again for every published lightness of every hue while clipping. The
//! search itself is pure; [`ChromaBound`] memoizes it per engine.
//!
//! Search shape:
//!
//! ```text
//! chroma  0 ── lo ────────── hi ──────▶
//!              in gamut      out of gamut
//!
//! 1. exponential: hi = 0.1, 0.2, 0.4, ... until hi leaves the gamut
//! 2. bisection:   shrink [lo, hi] until narrower than eps (or tol)
//! 3. return lo, the largest chroma proven in gamut
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use mb_color::{Color, Gamut};
use tracing::trace;

use crate::error::{Error, Result};

/// First chroma probed by the exponential phase.
const SEED_CHROMA: f64 = 0.1;

/// Doublings allowed before the gamut test is declared broken. Real sRGB
/// chroma never exceeds 0.4, so 64 doublings of 0.1 is far past sane.
pub const MAX_DOUBLINGS: u32 = 64;

/// Largest chroma accepted by `in_gamut`, found by doubling then bisection.
///
/// Returns `None` if `in_gamut` still accepts the probe after
/// [`MAX_DOUBLINGS`] doublings.
///
/// The bisection stops once the bracket is narrower than `eps`, or narrower
/// than `tol` when that is the larger of the two: refining below the
/// membership tolerance cannot change the answer.
pub fn search_max_chroma(in_gamut: impl Fn(f64) -> bool, eps: f64, tol: f64) -> Option<f64> {
    let mut lo = 0.0;
    let mut hi = SEED_CHROMA;

    let mut doublings = 0;
    while in_gamut(hi) {
        if doublings == MAX_DOUBLINGS {
            return None;
        }
        lo = hi;
        hi *= 2.0;
        doublings += 1;
    }

    let width = eps.max(tol);
    while hi - lo > width {
        let mid = (lo + hi) * 0.5;
        if in_gamut(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Some(lo)
}

/// Maximum chroma of OKLCH `(lightness%, c, hue)` inside `gamut`.
///
/// # Errors
///
/// Returns [`Error::NonConvergence`] if the gamut test never rejects a
/// chroma, which means the membership primitive itself is broken.
pub fn max_chroma(lightness: f64, hue: f64, gamut: Gamut, tol: f64, eps: f64) -> Result<f64> {
    let probe = Color::from_percent(lightness, 0.0, hue);
    search_max_chroma(|c| probe.with_chroma(c).in_gamut(gamut, tol), eps, tol).ok_or(
        Error::NonConvergence {
            lightness,
            hue,
            iterations: MAX_DOUBLINGS,
        },
    )
}

// ─── Memoized bound ─────────────────────────────────────────────────────────

/// Cache key: `f64` bit patterns of lightness and hue. Gamut, tolerance and
/// epsilon are fixed per [`ChromaBound`], so they complete the key.
type BoundKey = (u64, u64);

/// Memoized [`max_chroma`] for one gamut/tolerance/epsilon setting.
///
/// Entries are never evicted; the key space is bounded by hues × lightness
/// points. Lookups take a read lock, so worker threads probing different
/// hues share it freely.
#[derive(Debug)]
pub struct ChromaBound {
    gamut: Gamut,
    tolerance: f64,
    epsilon: f64,
    cache: RwLock<HashMap<BoundKey, f64>>,
}

impl ChromaBound {
    #[must_use]
    pub fn new(gamut: Gamut, tolerance: f64, epsilon: f64) -> Self {
        Self {
            gamut,
            tolerance,
            epsilon,
            cache: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn gamut(&self) -> Gamut {
        self.gamut
    }

    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Maximum in-gamut chroma at `lightness` percent and `hue` degrees.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::NonConvergence`] from [`max_chroma`].
    pub fn get(&self, lightness: f64, hue: f64) -> Result<f64> {
        let key = (lightness.to_bits(), hue.to_bits());

        if let Some(&c) = self.read().get(&key) {
            return Ok(c);
        }

        let c = max_chroma(lightness, hue, self.gamut, self.tolerance, self.epsilon)?;
        trace!(lightness, hue, chroma = c, "gamut probe");
        self.cache
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key, c);
        Ok(c)
    }

    /// Number of memoized `(lightness, hue)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<BoundKey, f64>> {
        // A panic mid-insert cannot leave a half-written f64 behind.
        self.cache
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;
    const EPS: f64 = 1e-6;

    fn bound() -> ChromaBound {
        ChromaBound::new(Gamut::Srgb, TOL, EPS)
    }

    // ── search_max_chroma ───────────────────────────────────────────

    #[test]
    fn search_finds_threshold_within_eps() {
        let c = search_max_chroma(|c| c <= 0.237, EPS, 0.0).unwrap();
        assert!(c <= 0.237 && 0.237 - c <= EPS, "c = {c}");
    }

    #[test]
    fn search_seed_out_of_gamut_bisects_down() {
        let c = search_max_chroma(|c| c <= 0.03, EPS, 0.0).unwrap();
        assert!(c <= 0.03 && 0.03 - c <= EPS, "c = {c}");
    }

    #[test]
    fn search_nothing_in_gamut_returns_zero_bracket() {
        let c = search_max_chroma(|_| false, EPS, 0.0).unwrap();
        assert!(c == 0.0, "c = {c}");
    }

    #[test]
    fn search_gives_up_when_everything_is_in_gamut() {
        assert_eq!(search_max_chroma(|_| true, EPS, 0.0), None);
    }

    #[test]
    fn coarse_tolerance_stops_bisection_early() {
        let calls = std::cell::Cell::new(0);
        let fine = search_max_chroma(|c| { calls.set(calls.get() + 1); c <= 0.15 }, 1e-9, 0.0);
        let fine_calls = calls.replace(0);
        let coarse = search_max_chroma(|c| { calls.set(calls.get() + 1); c <= 0.15 }, 1e-9, 1e-3);
        assert!(calls.get() < fine_calls);
        assert!((fine.unwrap() - coarse.unwrap()).abs() <= 1e-3);
    }

    // ── max_chroma ──────────────────────────────────────────────────

    #[test]
    fn result_is_in_gamut() {
        for hue in [0.0, 29.0, 62.5, 104.0, 148.0, 262.0] {
            for l in (5..=95).step_by(5) {
                let l = f64::from(l);
                let c = max_chroma(l, hue, Gamut::Srgb, TOL, EPS).unwrap();
                let color = Color::from_percent(l, c, hue);
                assert!(color.in_gamut(Gamut::Srgb, TOL), "L={l} h={hue} c={c}");
            }
        }
    }

    #[test]
    fn result_is_tight() {
        let c = max_chroma(60.0, 148.0, Gamut::Srgb, TOL, EPS).unwrap();
        let past = Color::from_percent(60.0, c + 2.0 * EPS, 148.0);
        assert!(!past.in_gamut(Gamut::Srgb, TOL), "c = {c} not tight");
    }

    #[test]
    fn srgb_red_peak_near_primary() {
        // sRGB #ff0000 sits at roughly L=62.8 C=0.258 h=29.2.
        let c = max_chroma(62.8, 29.2, Gamut::Srgb, TOL, EPS).unwrap();
        assert!((c - 0.257).abs() < 0.01, "c = {c}");
    }

    #[test]
    fn extremes_have_little_chroma() {
        let dark = max_chroma(1.0, 262.0, Gamut::Srgb, TOL, EPS).unwrap();
        let light = max_chroma(99.0, 262.0, Gamut::Srgb, TOL, EPS).unwrap();
        let mid = max_chroma(50.0, 262.0, Gamut::Srgb, TOL, EPS).unwrap();
        assert!(dark < mid && light < mid);
        assert!(light < 0.02, "light = {light}");
    }

    #[test]
    fn bound_falls_away_from_peak_for_builtin_hues() {
        let bound = bound();
        for spec in crate::PaletteConfig::default().hues().unwrap() {
            let chroma: Vec<f64> = (0..=100)
                .map(|l| bound.get(f64::from(l), spec.hue).unwrap())
                .collect();
            let peak = chroma
                .iter()
                .enumerate()
                .fold(0, |best, (i, &c)| if c > chroma[best] { i } else { best });
            // Neighbours may differ by the bisection width in either direction.
            let slack = 2.0 * EPS;
            for l in 1..=peak {
                assert!(chroma[l - 1] <= chroma[l] + slack, "{} rises away from L={peak} at L={l}", spec.name);
            }
            for l in peak..100 {
                assert!(chroma[l + 1] <= chroma[l] + slack, "{} rises away from L={peak} at L={l}", spec.name);
            }
        }
    }

    // ── ChromaBound ─────────────────────────────────────────────────

    #[test]
    fn memoizes_by_lightness_and_hue() {
        let bound = bound();
        assert!(bound.is_empty());
        let a = bound.get(50.0, 29.0).unwrap();
        let b = bound.get(50.0, 29.0).unwrap();
        assert!(a.to_bits() == b.to_bits());
        assert_eq!(bound.len(), 1);
        bound.get(51.0, 29.0).unwrap();
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn shared_across_threads() {
        let bound = bound();
        std::thread::scope(|s| {
            for hue in [29.0, 104.0, 262.0] {
                let bound = &bound;
                s.spawn(move || bound.get(40.0, hue).unwrap());
            }
        });
        assert_eq!(bound.len(), 3);
    }
}
