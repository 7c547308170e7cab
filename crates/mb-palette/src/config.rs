//! Static palette configuration: hues, calibration, lightness range, roles.
//!
//! Everything here is plain data deserialized from TOML. [`PaletteConfig`]
//! defaults to the builtin monobiome calibration (see [`crate::builtin`]),
//! and a config file only needs to name the tables it overrides.
//!
//! ```toml
//! tolerance = 1e-9
//!
//! [lightness]
//! min = 10
//! max = 98
//!
//! [monotone]
//! alpine = { hue = 0.0, chroma = 0.0 }
//!
//! [accent]
//! red = { hue = 29.0 }
//!
//! [calibration]
//! red = { weight = 3.0, l_offset = 0.0, c_offset = 0.0 }
//! ```

use indexmap::IndexMap;
use mb_color::Gamut;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, HueKind, Result};

// ─── Lightness ──────────────────────────────────────────────────────────────

/// Lightness percentages the palette is published at, plus the coarse grid
/// used to locate each accent hue's chroma peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightnessRange {
    /// First published lightness (inclusive).
    pub min: u8,
    /// Last published lightness (inclusive).
    pub max: u8,
    /// Step of the peak-finding grid over 0..=100.
    pub grid_step: u8,
}

impl Default for LightnessRange {
    fn default() -> Self {
        Self {
            min: 10,
            max: 98,
            grid_step: 5,
        }
    }
}

impl LightnessRange {
    /// Published lightness points, `min..=max` at unit step.
    #[must_use]
    pub fn points(&self) -> Vec<u8> {
        (self.min..=self.max).collect()
    }

    /// Peak-finding grid, `0..=100` at `grid_step`.
    #[must_use]
    pub fn grid(&self) -> Vec<f64> {
        (0..=100u8)
            .step_by(usize::from(self.grid_step.max(1)))
            .map(f64::from)
            .collect()
    }

    /// Whether `lightness` is one of the published points.
    #[must_use]
    pub fn contains(&self, lightness: i32) -> bool {
        (i32::from(self.min)..=i32::from(self.max)).contains(&lightness)
    }
}

// ─── Hues ───────────────────────────────────────────────────────────────────

/// A neutral hue family with one flat chroma across lightness.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonotoneHue {
    pub hue: f64,
    #[serde(default)]
    pub chroma: f64,
}

/// A saturated hue family whose chroma follows a fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccentHue {
    pub hue: f64,
}

/// Per-accent adjustments to the fitted chroma curve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Calibration {
    /// Rational Bezier weight on the peak control point. Values above 1
    /// sharpen the chroma ridge.
    pub weight: f64,
    /// Shift of the peak control point along lightness (percent).
    pub l_offset: f64,
    /// Shift of the peak control point along chroma. May push the control
    /// point outside the gamut; clipping corrects the published curve.
    pub c_offset: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            weight: 1.0,
            l_offset: 0.0,
            c_offset: 0.0,
        }
    }
}

/// How a hue's chroma curve is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HueRole {
    Monotone { chroma: f64 },
    Accent(Calibration),
}

/// A resolved hue: name, angle and role, ready for curve building.
#[derive(Debug, Clone, PartialEq)]
pub struct HueSpec {
    pub name: String,
    pub hue: f64,
    pub role: HueRole,
}

impl HueSpec {
    #[must_use]
    pub const fn is_accent(&self) -> bool {
        matches!(self.role, HueRole::Accent(_))
    }
}

// ─── Roles ──────────────────────────────────────────────────────────────────

/// Ordered scheme-role → accent-hue mapping, e.g. `cyan = "green"`.
pub type RoleMap = IndexMap<String, String>;

/// The three role maps a full scheme is assembled from. A map left out of
/// the document keeps its builtin value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleMaps {
    /// Accents of the top-level (system) section.
    pub system: RoleMap,
    /// Accents of the `[term.normal]` and `[term.bright]` sections.
    pub terminal: RoleMap,
    /// Accents of the secondary application (`[vim]`) section.
    pub vim: RoleMap,
}

// ─── PaletteConfig ──────────────────────────────────────────────────────────

/// Complete static input to the palette engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    /// Target device gamut.
    #[serde(deserialize_with = "deserialize_gamut")]
    pub gamut: Gamut,
    /// Per-channel tolerance of the gamut membership test.
    pub tolerance: f64,
    /// Interval width at which the chroma binary search stops.
    pub epsilon: f64,
    /// Parameter samples along each Bezier curve.
    pub bezier_samples: usize,
    pub lightness: LightnessRange,
    pub monotone: IndexMap<String, MonotoneHue>,
    pub accent: IndexMap<String, AccentHue>,
    pub calibration: IndexMap<String, Calibration>,
    pub roles: RoleMaps,
}

fn deserialize_gamut<'de, D>(deserializer: D) -> std::result::Result<Gamut, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

impl PaletteConfig {
    /// Parse and validate a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns a TOML error for malformed input and a configuration error
    /// for anything [`validate`](Self::validate) rejects.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-table invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        let l = &self.lightness;
        if l.min > l.max || l.max > 100 {
            return Err(Error::invalid(format!(
                "lightness range {}..={} must lie within 0..=100",
                l.min, l.max
            )));
        }
        if l.grid_step == 0 {
            return Err(Error::invalid("lightness.grid_step must be positive"));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(Error::invalid("tolerance must be non-negative"));
        }
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err(Error::invalid("epsilon must be positive"));
        }
        if self.bezier_samples < 2 {
            return Err(Error::invalid("bezier_samples must be at least 2"));
        }
        if self.accent.is_empty() {
            return Err(Error::invalid("at least one accent hue is required"));
        }
        if self.monotone.is_empty() {
            return Err(Error::invalid("at least one monotone hue is required"));
        }

        if let Some(name) = self.monotone.keys().find(|name| self.accent.contains_key(*name)) {
            return Err(Error::DuplicateHue { name: name.clone() });
        }
        if let Some(name) = self.calibration.keys().find(|name| !self.accent.contains_key(*name)) {
            return Err(Error::unknown_hue(HueKind::Accent, name.clone()));
        }
        for role_map in [&self.roles.system, &self.roles.terminal, &self.roles.vim] {
            if let Some(target) = role_map.values().find(|hue| !self.accent.contains_key(*hue)) {
                return Err(Error::unknown_hue(HueKind::Accent, target.clone()));
            }
        }

        self.hues().map(|_| ())
    }

    /// All hues in output order: monotone families first, then accents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCalibration`] for an accent hue with no
    /// calibration entry.
    pub fn hues(&self) -> Result<Vec<HueSpec>> {
        let monotone = self.monotone.iter().map(|(name, m)| {
            Ok(HueSpec {
                name: name.clone(),
                hue: m.hue,
                role: HueRole::Monotone { chroma: m.chroma },
            })
        });
        let accent = self.accent.iter().map(|(name, a)| {
            let calibration = self
                .calibration
                .get(name)
                .ok_or_else(|| Error::MissingCalibration { hue: name.clone() })?;
            Ok(HueSpec {
                name: name.clone(),
                hue: a.hue,
                role: HueRole::Accent(*calibration),
            })
        });
        monotone.chain(accent).collect()
    }

    /// Hue angle for `name`, monotone or accent.
    #[must_use]
    pub fn hue_angle(&self, name: &str) -> Option<f64> {
        self.monotone
            .get(name)
            .map(|m| m.hue)
            .or_else(|| self.accent.get(name).map(|a| a.hue))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
