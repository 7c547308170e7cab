//! Interchangeable distance functions between a monotone base and an accent.

use std::fmt;
use std::str::FromStr;

use mb_color::{Color, contrast_ratio};

use crate::error::Error;

/// How far apart two palette colors are.
///
/// Every metric is non-negative and larger means more distinguishable, so
/// the accent assigner can treat them uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// Euclidean distance in OKLCH with hue unrolled (lightness on 0–1).
    #[default]
    Oklch,
    /// WCAG 2.1 contrast ratio, accent over monotone background.
    Wcag,
    /// Absolute lightness difference in percent.
    Lightness,
}

impl Metric {
    pub const ALL: [Self; 3] = [Self::Oklch, Self::Wcag, Self::Lightness];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Oklch => "oklch",
            Self::Wcag => "wcag",
            Self::Lightness => "lightness",
        }
    }

    /// Distance from the `monotone` base to `accent`.
    #[must_use]
    pub fn distance(self, monotone: Color, accent: Color) -> f64 {
        match self {
            Self::Oklch => monotone.oklch_distance(&accent),
            Self::Wcag => contrast_ratio(accent, monotone),
            Self::Lightness => (monotone.l - accent.l).abs() * 100.0,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownMetric { name: s.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
