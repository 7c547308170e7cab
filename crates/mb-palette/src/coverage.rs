//! Threshold-constrained accent assignment.
//!
//! For every monotone color, each accent hue contributes the *closest* of
//! its colors that still clears the distance threshold:
//!
//! ```text
//! tundra L20 ──┬── red    candidates: d = 0.31 0.37 0.41 0.46 ...   → 0.41
//!              ├── orange candidates: d = 0.28 0.39 0.40 0.44 ...   → 0.40
//!              └── blue   candidates: d = 0.12 0.18 0.25 0.33       → none
//!
//! one accent without a survivor drops the whole level
//! ```
//!
//! Coverage is a value, not an error: a sparse [`CoverageMap`] simply means
//! the threshold is aggressive for this palette.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use mb_color::Color;
use tracing::{debug, info};

use crate::distance::Metric;
use crate::error::Result;
use crate::palette::Palette;

/// An accent color chosen for one monotone level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swatch {
    /// Lightness percent of the accent color in the palette.
    pub lightness: u8,
    pub color: Color,
    /// Distance from the monotone base under the coverage metric.
    pub distance: f64,
}

/// Chosen accents at one monotone level, in accent order.
pub type LevelAccents = IndexMap<String, Swatch>;

/// monotone hue → lightness → accent hue → chosen swatch.
///
/// A level is present only when every accent hue has a swatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMap {
    threshold: f64,
    metric: Metric,
    levels: IndexMap<String, BTreeMap<u8, LevelAccents>>,
}

impl CoverageMap {
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Accents chosen for `monotone` at `lightness`, if that level is covered.
    #[must_use]
    pub fn get(&self, monotone: &str, lightness: u8) -> Option<&LevelAccents> {
        self.levels.get(monotone)?.get(&lightness)
    }

    /// Covered lightness levels of `monotone`, ascending.
    pub fn levels(&self, monotone: &str) -> impl Iterator<Item = u8> + '_ {
        self.levels.get(monotone).into_iter().flat_map(|m| m.keys().copied())
    }

    /// Monotone hues that have coverage at `lightness`.
    pub fn covered_at(&self, lightness: u8) -> impl Iterator<Item = &str> + '_ {
        self.levels
            .iter()
            .filter(move |(_, levels)| levels.contains_key(&lightness))
            .map(|(name, _)| name.as_str())
    }

    /// Monotone hue names, covered or not.
    pub fn monotones(&self) -> impl Iterator<Item = &str> + '_ {
        self.levels.keys().map(String::as_str)
    }

    /// Total number of covered (monotone, lightness) levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The closest candidate at or beyond `threshold`; the first one wins ties.
fn nearest_above(
    base: Color,
    candidates: &[(u8, Color)],
    threshold: f64,
    metric: Metric,
) -> Option<Swatch> {
    let mut best: Option<Swatch> = None;
    for &(lightness, color) in candidates {
        let distance = metric.distance(base, color);
        if distance < threshold || distance.is_nan() {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Swatch {
                lightness,
                color,
                distance,
            });
        }
    }
    best
}

/// Covered levels of one monotone hue.
fn monotone_levels(
    bases: &[(u8, Color)],
    accents: &[(&str, Vec<(u8, Color)>)],
    threshold: f64,
    metric: Metric,
) -> BTreeMap<u8, LevelAccents> {
    bases
        .iter()
        .filter_map(|&(lightness, base)| {
            let chosen = accents
                .iter()
                .map(|(name, candidates)| {
                    nearest_above(base, candidates, threshold, metric)
                        .map(|swatch| ((*name).to_string(), swatch))
                })
                .collect::<Option<LevelAccents>>()?;
            Some((lightness, chosen))
        })
        .collect()
}

/// Assign accents to every monotone level of `palette`.
///
/// `palette` should be rendered in [`Notation::Oklch`](crate::Notation::Oklch):
/// its strings are parsed back into colors before measuring.
///
/// # Errors
///
/// Returns [`Error::Color`](crate::Error::Color) if a palette string fails
/// to parse.
pub fn compute_coverage(
    palette: &Palette,
    monotone: &[&str],
    accent: &[&str],
    threshold: f64,
    metric: Metric,
) -> Result<CoverageMap> {
    let accents = accent
        .iter()
        .map(|&name| Ok((name, palette.parsed(name)?)))
        .collect::<Result<Vec<_>>>()?;
    let bases = monotone
        .iter()
        .map(|&name| palette.parsed(name))
        .collect::<Result<Vec<_>>>()?;

    let accents = &accents;
    let levels: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = bases
            .iter()
            .map(|bases| s.spawn(move || monotone_levels(bases, accents, threshold, metric)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let levels: IndexMap<_, _> = monotone
        .iter()
        .map(|name| (*name).to_string())
        .zip(levels)
        .collect();

    for (name, covered) in &levels {
        debug!(
            monotone = %name,
            levels = covered.len(),
            first = covered.keys().next().copied(),
            last = covered.keys().next_back().copied(),
            "monotone coverage"
        );
    }
    let map = CoverageMap {
        threshold,
        metric,
        levels,
    };
    info!(%metric, threshold, covered = map.len(), "computed accent coverage");
    Ok(map)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
