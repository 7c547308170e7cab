//! The builtin monobiome calibration: hue angles, chroma offsets and role
//! maps the stock palette and schemes are generated from.
//!
//! Monotone families share their hue angle with one accent each (badlands
//! with red, tundra with blue, ...), so a biome's neutrals lean toward the
//! accent they are named after. Alpine is the achromatic family.

use indexmap::IndexMap;
use mb_color::Gamut;

use crate::config::{
    AccentHue, Calibration, LightnessRange, MonotoneHue, PaletteConfig, RoleMap, RoleMaps,
};

/// `(name, hue, chroma)`
const MONOTONE: &[(&str, f64, f64)] = &[
    ("alpine", 0.0, 0.0),
    ("badlands", 29.0, 0.011),
    ("chaparral", 62.5, 0.011),
    ("savanna", 104.0, 0.011),
    ("grassland", 148.0, 0.011),
    ("tundra", 262.0, 0.011),
];

/// `(name, hue, weight, l_offset, c_offset)`
const ACCENT: &[(&str, f64, f64, f64, f64)] = &[
    ("red", 29.0, 3.0, 0.0, 0.0),
    ("orange", 62.5, 3.8, -5.5, -0.01),
    ("yellow", 104.0, 3.8, -13.5, -0.052),
    ("green", 148.0, 3.8, -11.0, -0.088),
    ("blue", 262.0, 3.4, 10.0, 0.0),
];

const SYSTEM_ROLES: &[(&str, &str)] = &[
    ("red", "red"),
    ("orange", "orange"),
    ("yellow", "yellow"),
    ("green", "green"),
    ("cyan", "green"),
    ("blue", "blue"),
    ("violet", "blue"),
    ("magenta", "orange"),
];

const TERMINAL_ROLES: &[(&str, &str)] = &[
    ("red", "red"),
    ("yellow", "yellow"),
    ("green", "green"),
    ("cyan", "blue"),
    ("blue", "blue"),
    ("magenta", "orange"),
];

const VIM_ROLES: &[(&str, &str)] = &[
    ("red", "red"),
    ("orange", "orange"),
    ("yellow", "yellow"),
    ("green", "green"),
    ("cyan", "green"),
    ("blue", "blue"),
    ("violet", "blue"),
    ("magenta", "red"),
];

fn role_map(pairs: &[(&str, &str)]) -> RoleMap {
    pairs
        .iter()
        .map(|&(role, hue)| (role.to_string(), hue.to_string()))
        .collect()
}

impl Default for RoleMaps {
    fn default() -> Self {
        Self {
            system: role_map(SYSTEM_ROLES),
            terminal: role_map(TERMINAL_ROLES),
            vim: role_map(VIM_ROLES),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let monotone: IndexMap<_, _> = MONOTONE
            .iter()
            .map(|&(name, hue, chroma)| (name.to_string(), MonotoneHue { hue, chroma }))
            .collect();
        let accent: IndexMap<_, _> = ACCENT
            .iter()
            .map(|&(name, hue, ..)| (name.to_string(), AccentHue { hue }))
            .collect();
        let calibration: IndexMap<_, _> = ACCENT
            .iter()
            .map(|&(name, _, weight, l_offset, c_offset)| {
                (
                    name.to_string(),
                    Calibration {
                        weight,
                        l_offset,
                        c_offset,
                    },
                )
            })
            .collect();

        Self {
            gamut: Gamut::Srgb,
            tolerance: 1e-9,
            epsilon: 1e-6,
            bezier_samples: 400,
            lightness: LightnessRange::default(),
            monotone,
            accent,
            calibration,
            roles: RoleMaps::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
