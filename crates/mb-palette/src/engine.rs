//! The engine context: one validated configuration and every cache derived
//! from it.
//!
//! Curves are built eagerly in [`Monobiome::new`]; palettes are compiled on
//! first request per notation; coverage maps are memoized per
//! `(threshold, metric)`. Nothing is ever evicted, and every cache is safe
//! to share across threads.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::info;

use crate::config::{PaletteConfig, RoleMap};
use crate::coverage::{CoverageMap, compute_coverage};
use crate::curve::{ChromaCurve, build_curves};
use crate::distance::Metric;
use crate::error::{Error, HueKind, Result};
use crate::gamut::ChromaBound;
use crate::palette::{Notation, Palette};
use crate::scheme::{self, CoverageShortfall, Deltas, PairGroups, Scheme, SchemeParams};

/// Threshold bits and metric.
type CoverageKey = (u64, Metric);

/// A palette engine bound to one [`PaletteConfig`].
#[derive(Debug)]
pub struct Monobiome {
    config: PaletteConfig,
    bound: ChromaBound,
    curves: Vec<ChromaCurve>,
    palettes: [OnceLock<Palette>; 2],
    coverage: RwLock<HashMap<CoverageKey, Arc<CoverageMap>>>,
}

impl Monobiome {
    /// Validate `config` and fit every hue's chroma curve.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from [`PaletteConfig::validate`] and
    /// [`Error::NonConvergence`] from the gamut search.
    pub fn new(config: PaletteConfig) -> Result<Self> {
        config.validate()?;
        let bound = ChromaBound::new(config.gamut, config.tolerance, config.epsilon);
        let hues = config.hues()?;
        let curves = build_curves(&hues, &config.lightness, config.bezier_samples, &bound)?;
        info!(
            hues = curves.len(),
            gamut = %config.gamut,
            probes = bound.len(),
            "built chroma curves"
        );

        Ok(Self {
            config,
            bound,
            curves,
            palettes: [OnceLock::new(), OnceLock::new()],
            coverage: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PaletteConfig {
        &self.config
    }

    /// The memoized gamut bound the curves were clipped against.
    #[must_use]
    pub const fn bound(&self) -> &ChromaBound {
        &self.bound
    }

    /// Every hue's final curve, monotone families first.
    #[must_use]
    pub fn curves(&self) -> &[ChromaCurve] {
        &self.curves
    }

    /// The curve of one hue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHue`] if no hue is called `name`.
    pub fn curve(&self, name: &str) -> Result<&ChromaCurve> {
        self.curves
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::unknown_hue(HueKind::Any, name))
    }

    pub fn monotone_names(&self) -> impl Iterator<Item = &str> {
        self.config.monotone.keys().map(String::as_str)
    }

    pub fn accent_names(&self) -> impl Iterator<Item = &str> {
        self.config.accent.keys().map(String::as_str)
    }

    /// The palette in `notation`, compiled on first use.
    #[must_use]
    pub fn palette(&self, notation: Notation) -> &Palette {
        let slot = match notation {
            Notation::Hex => &self.palettes[0],
            Notation::Oklch => &self.palettes[1],
        };
        slot.get_or_init(|| Palette::compile(&self.curves, notation))
    }

    /// Accent coverage at `threshold` under `metric`, memoized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Color`] if the OKLCH palette fails to parse back.
    pub fn coverage(&self, threshold: f64, metric: Metric) -> Result<Arc<CoverageMap>> {
        let key = (threshold.to_bits(), metric);
        if let Some(map) = self
            .coverage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(map));
        }

        let monotone: Vec<_> = self.monotone_names().collect();
        let accent: Vec<_> = self.accent_names().collect();
        let map = Arc::new(compute_coverage(
            self.palette(Notation::Oklch),
            &monotone,
            &accent,
            threshold,
            metric,
        )?);

        let mut cache = self.coverage.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(key).or_insert(map)))
    }

    /// One assembly of scheme pairs for `biome` at `l_base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHue`] for an unknown biome, plus coverage
    /// errors.
    pub fn assemble_groups(
        &self,
        biome: &str,
        l_base: i32,
        deltas: Deltas,
        threshold: f64,
        metric: Metric,
        roles: &RoleMap,
    ) -> Result<(PairGroups, Vec<CoverageShortfall>)> {
        if !self.config.monotone.contains_key(biome) {
            return Err(Error::unknown_hue(HueKind::Monotone, biome));
        }
        let coverage = self.coverage(threshold, metric)?;
        Ok(scheme::assemble_groups(biome, l_base, deltas, &coverage, roles))
    }

    /// A full scheme document for `params`, tagged with `version`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParam`] for out-of-range parameters,
    /// [`Error::UnknownHue`] for an unknown biome, plus coverage errors.
    pub fn scheme(&self, params: &SchemeParams, version: &str) -> Result<Scheme> {
        params.validate()?;
        if !self.config.monotone.contains_key(&params.biome) {
            return Err(Error::unknown_hue(HueKind::Monotone, params.biome.as_str()));
        }
        let coverage = self.coverage(params.distance, params.metric)?;
        scheme::assemble_scheme(
            params,
            &coverage,
            &self.config.roles,
            &self.config.lightness,
            version,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::scheme::{Mode, out_of_range};

    static ENGINE: LazyLock<Monobiome> =
        LazyLock::new(|| Monobiome::new(PaletteConfig::default()).unwrap());

    #[test]
    fn builtin_engine_builds_every_hue() {
        let names: Vec<_> = ENGINE.curves().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "alpine", "badlands", "chaparral", "savanna", "grassland", "tundra", "red",
                "orange", "yellow", "green", "blue",
            ]
        );
        assert!(ENGINE.curve("red").unwrap().is_accent());
        assert!(matches!(ENGINE.curve("teal"), Err(Error::UnknownHue { .. })));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = PaletteConfig::default();
        config.calibration.shift_remove("red");
        assert!(matches!(Monobiome::new(config), Err(Error::MissingCalibration { .. })));
    }

    #[test]
    fn palette_is_cached_per_notation() {
        let a = ENGINE.palette(Notation::Hex);
        let b = ENGINE.palette(Notation::Hex);
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.len(), 11);
        assert!(a.get("red", 50).unwrap().starts_with('#'));
        assert!(ENGINE.palette(Notation::Oklch).get("red", 50).unwrap().starts_with("oklch("));
    }

    #[test]
    fn coverage_is_memoized() {
        let a = ENGINE.coverage(0.40, Metric::Oklch).unwrap();
        let b = ENGINE.coverage(0.40, Metric::Oklch).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = ENGINE.coverage(0.40, Metric::Lightness).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn default_dark_scheme_is_complete() {
        let scheme = ENGINE.scheme(&SchemeParams::new(Mode::Dark, "grassland"), "0.1.0").unwrap();
        assert!(scheme.is_complete(), "{:?}", scheme.shortfalls);
        let keys: Vec<_> = scheme.term_normal.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["black", "grey", "white", "red", "yellow", "green", "cyan", "blue", "magenta"]
        );
    }

    #[test]
    fn unknown_biome_is_rejected() {
        let err = ENGINE.scheme(&SchemeParams::new(Mode::Light, "desert"), "0.1.0").unwrap_err();
        assert_eq!(err.to_string(), "unknown monotone hue: desert");
        let err = ENGINE
            .assemble_groups("red", 20, SchemeParams::new(Mode::Dark, "red").deltas(), 0.4, Metric::Oklch, &RoleMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownHue { kind: HueKind::Monotone, .. }));
    }

    #[test]
    fn impossible_threshold_degrades_to_warnings() {
        let params = SchemeParams {
            distance: 5.0,
            ..SchemeParams::new(Mode::Dark, "tundra")
        };
        let scheme = ENGINE.scheme(&params, "0.1.0").unwrap();
        assert!(!scheme.is_complete());
        assert_eq!(scheme.accent.len(), 3);
        assert!(
            scheme
                .shortfalls
                .iter()
                .any(|s| matches!(s, CoverageShortfall::BiomeUnsatisfiable { .. }))
        );
    }

    #[test]
    fn config_role_order_reaches_scheme() {
        let config = PaletteConfig::from_toml_str(
            r#"
            [roles.system]
            zeta = "red"
            alpha = "blue"
            mid = "green"
            "#,
        )
        .unwrap();
        assert_eq!(config.roles.terminal, PaletteConfig::default().roles.terminal);

        let engine = Monobiome::new(config).unwrap();
        let scheme = engine.scheme(&SchemeParams::new(Mode::Dark, "grassland"), "0.1.0").unwrap();
        let keys: Vec<_> = scheme.accent.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["black", "grey", "white", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn default_scheme_references_stay_in_range() {
        let params = SchemeParams::new(Mode::Dark, "tundra");
        let range = ENGINE.config().lightness;
        let scheme = ENGINE.scheme(&params, "0.1.0").unwrap();
        assert_eq!(out_of_range(scheme.references(), &range), vec![]);

        // The bright assembly's terminal group would reach L=100, but only
        // its accents are kept.
        let (bright, _) = ENGINE
            .assemble_groups("tundra", params.l_bright(), params.deltas(), 0.40, Metric::Oklch, &RoleMap::new())
            .unwrap();
        assert_eq!(out_of_range(&bright.term, &range), vec![("tundra".to_string(), 100)]);
    }

    #[test]
    fn oversized_parameters_are_rejected() {
        let params = SchemeParams {
            l_step: i32::MAX,
            ..SchemeParams::new(Mode::Dark, "tundra")
        };
        let err = ENGINE.scheme(&params, "0.1.0").unwrap_err();
        assert!(matches!(err, Error::InvalidParam { name: "l_step", .. }), "{err}");

        let params = SchemeParams {
            l_base: 120,
            ..SchemeParams::new(Mode::Light, "tundra")
        };
        let err = ENGINE.scheme(&params, "0.1.0").unwrap_err();
        assert_eq!(err.to_string(), "invalid scheme parameter l_base = 120 (expected 0..=100)");
    }
}
