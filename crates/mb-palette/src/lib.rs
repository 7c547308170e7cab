//! # mb-palette: gamut-bounded palettes and threshold-driven schemes
//!
//! Builds the monobiome palette from a handful of named hues, then picks
//! accent colors that stay distinguishable from a chosen base to assemble
//! color schemes.
//!
//! # Architecture
//!
//! ```text
//! PaletteConfig (TOML or builtin)
//!     │
//!     ▼
//! gamut.rs:    max in-gamut chroma per (lightness, hue), memoized
//!     │
//!     ▼
//! curve.rs:    flat (monotone) or rational Bezier (accent) chroma curves,
//!     │        clipped to the gamut bound
//!     ▼
//! palette.rs:  hue → lightness → "#rrggbb" / "oklch(...)"
//!     │
//!     ▼
//! coverage.rs: closest accent at or beyond a distance threshold, per
//!     │        monotone level (distance.rs supplies the metric)
//!     ▼
//! scheme.rs:   role → "f{{hue.lN}}" pairs, sectioned scheme document
//! ```
//!
//! [`Monobiome`] owns one configuration and every cache derived from it.
//!
//! ```no_run
//! use mb_palette::{Metric, Mode, Monobiome, Notation, PaletteConfig, SchemeParams};
//!
//! let engine = Monobiome::new(PaletteConfig::default())?;
//! let hex = engine.palette(Notation::Hex);
//! assert!(hex.get("tundra", 20).is_some());
//!
//! let params = SchemeParams { metric: Metric::Wcag, distance: 4.5, ..SchemeParams::new(Mode::Dark, "tundra") };
//! println!("{}", engine.scheme(&params, "1.0.0")?.render());
//! # Ok::<(), mb_palette::Error>(())
//! ```

// Single-char math variables are standard in color science.
#![allow(clippy::many_single_char_names)]
// Lightness points are small integers cast to f64 everywhere.
#![allow(clippy::cast_precision_loss)]
// Hue/lightness/chroma variable names are inherently similar.
#![allow(clippy::similar_names)]

pub mod bezier;
pub mod builtin;
pub mod config;
pub mod coverage;
pub mod curve;
pub mod distance;
pub mod engine;
pub mod error;
pub mod gamut;
pub mod palette;
pub mod scheme;

pub use config::{HueSpec, LightnessRange, PaletteConfig, RoleMap, RoleMaps};
pub use coverage::{CoverageMap, Swatch};
pub use curve::ChromaCurve;
pub use distance::Metric;
pub use engine::Monobiome;
pub use error::{Error, HueKind, Result};
pub use gamut::ChromaBound;
pub use palette::{Notation, Palette, PaletteFormat, render_palette};
pub use scheme::{CoverageShortfall, Mode, Scheme, SchemeParams};
