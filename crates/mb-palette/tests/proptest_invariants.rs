//! Property-based invariant tests for the palette engine.
//!
//! 1. The gamut bound is itself in gamut.
//! 2. Final chroma lies in `[0, bound]` for any calibration.
//! 3. Monotone curves are flat wherever the gamut allows.
//! 4. Bezier inversion stays within the sampled chroma range.
//! 5. Palette compilation is deterministic.
//! 6. Raising the coverage threshold never adds a level.
//! 7. Every covered level holds every accent at or beyond the threshold.
//! 8. Light and dark schemes mirror each other around L=50.

use std::sync::LazyLock;

use mb_color::{Color, Gamut};
use mb_palette::bezier::{self, Point};
use mb_palette::config::{Calibration, HueRole, HueSpec};
use mb_palette::curve::build_curve;
use mb_palette::gamut::max_chroma;
use mb_palette::scheme::Pair;
use mb_palette::{
    ChromaBound, LightnessRange, Metric, Mode, Monobiome, Notation, Palette, PaletteConfig,
    PaletteFormat, SchemeParams, render_palette,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

static ENGINE: LazyLock<Monobiome> =
    LazyLock::new(|| Monobiome::new(PaletteConfig::default()).expect("builtin config"));

static BOUND: LazyLock<ChromaBound> = LazyLock::new(|| ChromaBound::new(Gamut::Srgb, 1e-9, 1e-6));

fn calibration_strategy() -> impl Strategy<Value = Calibration> {
    (0.5f64..8.0, -30.0f64..30.0, -0.1f64..0.2).prop_map(|(weight, l_offset, c_offset)| {
        Calibration {
            weight,
            l_offset,
            c_offset,
        }
    })
}

fn ref_lightness(value: &str) -> i32 {
    let start = value.rfind(".l").expect("reference") + 2;
    value[start..value.len() - 2].parse().expect("lightness")
}

fn biome_refs(pairs: &[Pair], biome: &str) -> Vec<(String, i32)> {
    pairs
        .iter()
        .filter(|(_, v)| v.contains(biome))
        .map(|(k, v)| (k.clone(), ref_lightness(v)))
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Gamut bound is in gamut
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bound_is_in_gamut(l in 1.0f64..99.0, h in 0.0f64..360.0) {
        let c = max_chroma(l, h, Gamut::Srgb, 1e-9, 1e-6).unwrap();
        prop_assert!(c >= 0.0);
        prop_assert!(
            Color::from_percent(l, c, h).in_gamut(Gamut::Srgb, 1e-9),
            "L={} h={} c={} out of gamut", l, h, c
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Clipping invariant
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn accent_curve_within_bound(h in 0.0f64..360.0, calibration in calibration_strategy()) {
        let spec = HueSpec { name: "probe".into(), hue: h, role: HueRole::Accent(calibration) };
        let curve = build_curve(&spec, &LightnessRange::default(), 400, &BOUND).unwrap();
        for (l, c) in curve.points() {
            let cmax = BOUND.get(f64::from(l), h).unwrap();
            prop_assert!(c >= 0.0 && c <= cmax, "L={} c={} bound={}", l, c, cmax);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Monotone curves are flat
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn monotone_curve_is_flat(h in 0.0f64..360.0, chroma in 0.0f64..0.05) {
        let spec = HueSpec { name: "probe".into(), hue: h, role: HueRole::Monotone { chroma } };
        let curve = build_curve(&spec, &LightnessRange::default(), 400, &BOUND).unwrap();
        for (l, c) in curve.points() {
            let expected = chroma.min(BOUND.get(f64::from(l), h).unwrap());
            prop_assert_eq!(c.to_bits(), expected.to_bits(), "L={}", l);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Bezier inversion is bounded by its samples
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bezier_inversion_within_samples(
        peak_l in 5.0f64..95.0,
        peak_c in 0.0f64..0.4,
        w in 0.5f64..8.0,
        x in -20.0f64..120.0,
    ) {
        let (p0, p1, p2) = (Point::new(0.0, 0.0), Point::new(peak_l, peak_c), Point::new(100.0, 0.0));
        let samples = bezier::sample(p0, p1, p2, w, 400);
        let hi = samples.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        let y = bezier::y_at_x(p0, p1, p2, w, &[x], 400)[0];
        prop_assert!((0.0..=hi + 1e-12).contains(&y), "y={} hi={}", y, hi);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Palette compilation is deterministic
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn palette_compilation_is_idempotent() {
    for notation in Notation::ALL {
        let a = Palette::compile(ENGINE.curves(), notation);
        let b = Palette::compile(ENGINE.curves(), notation);
        assert_eq!(&a, &b);
        assert_eq!(&a, ENGINE.palette(notation));
        for format in PaletteFormat::ALL {
            assert_eq!(
                render_palette(&a, format, "0.1.0").unwrap(),
                render_palette(&b, format, "0.1.0").unwrap()
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Coverage shrinks as the threshold grows
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn coverage_monotone_in_threshold(a in 0.0f64..0.8, b in 0.0f64..0.8) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let loose = ENGINE.coverage(lo, Metric::Oklch).unwrap();
        let strict = ENGINE.coverage(hi, Metric::Oklch).unwrap();
        for monotone in strict.monotones() {
            for l in strict.levels(monotone) {
                prop_assert!(
                    loose.get(monotone, l).is_some(),
                    "{}@{} covered at {} but not at {}", monotone, l, hi, lo
                );
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Covered levels are complete and qualifying
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn covered_levels_hold_every_accent(threshold in 0.0f64..30.0) {
        let accents: Vec<_> = ENGINE.accent_names().collect();
        let map = ENGINE.coverage(threshold, Metric::Lightness).unwrap();
        for monotone in map.monotones() {
            for l in map.levels(monotone) {
                let level = map.get(monotone, l).unwrap();
                let names: Vec<_> = level.keys().map(String::as_str).collect();
                prop_assert_eq!(&names, &accents);
                for swatch in level.values() {
                    prop_assert!(swatch.distance >= threshold);
                }
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Light/dark symmetry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn light_mirrors_dark(l_base in 15i32..30, l_step in 1i32..8) {
        let dark = SchemeParams { l_base, l_step, ..SchemeParams::new(Mode::Dark, "savanna") };
        let light = SchemeParams { l_base: 100 - l_base, l_step, ..SchemeParams::new(Mode::Light, "savanna") };
        let dark = ENGINE.scheme(&dark, "0.1.0").unwrap();
        let light = ENGINE.scheme(&light, "0.1.0").unwrap();

        let keys = |pairs: &[Pair]| pairs.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>();
        prop_assert_eq!(keys(&dark.term), keys(&light.term));
        prop_assert_eq!(keys(&dark.monotone), keys(&light.monotone));
        prop_assert_eq!(keys(&dark.vim_monotone), keys(&light.vim_monotone));

        for (d, l) in [(&dark.term, &light.term), (&dark.monotone, &light.monotone), (&dark.accent, &light.accent)] {
            for ((dk, dl), (lk, ll)) in biome_refs(d, "savanna").into_iter().zip(biome_refs(l, "savanna")) {
                prop_assert_eq!(&dk, &lk);
                prop_assert_eq!(dl + ll, 100, "{}", dk);
            }
        }
    }
}
