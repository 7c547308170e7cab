//! Palette compilation and the palette documents.
//!
//! A [`Palette`] is every hue's final chroma curve rendered to strings in
//! one [`Notation`]:
//!
//! ```text
//! badlands ─┬─ 10 → "#1c1615"        (hex)
//!           ├─ 11 → "#1f1918"
//!           └─ ...
//! red ──────┬─ 10 → "oklch(10.0% 0.0301 29.0)"   (oklch)
//!           └─ ...
//! ```
//!
//! [`render_palette`] writes it out as TOML (one table per hue) or JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use indexmap::IndexMap;
use mb_color::Color;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::curve::ChromaCurve;
use crate::error::{Error, Result};

// ─── Notation ───────────────────────────────────────────────────────────────

/// Text form of a palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Notation {
    /// `#rrggbb`
    #[default]
    Hex,
    /// `oklch(L% C H)`, one decimal for L and H, four for C.
    Oklch,
}

impl Notation {
    pub const ALL: [Self; 2] = [Self::Hex, Self::Oklch];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Oklch => "oklch",
        }
    }

    #[must_use]
    pub fn render(self, color: Color) -> String {
        match self {
            Self::Hex => color.to_hex(),
            Self::Oklch => color.to_oklch_string(),
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Notation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownNotation { name: s.to_string() })
    }
}

// ─── Palette ────────────────────────────────────────────────────────────────

/// Rendered colors of every hue, keyed by hue name then lightness percent.
///
/// Hue order follows the configuration (monotone families first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    notation: Notation,
    hues: IndexMap<String, BTreeMap<u8, String>>,
}

impl Palette {
    /// Render every curve point in `notation`.
    #[must_use]
    pub fn compile(curves: &[ChromaCurve], notation: Notation) -> Self {
        let hues = curves
            .iter()
            .map(|curve| {
                let colors = curve
                    .points()
                    .map(|(l, c)| {
                        let color = Color::from_percent(f64::from(l), c, curve.hue);
                        (l, notation.render(color))
                    })
                    .collect();
                (curve.name.clone(), colors)
            })
            .collect();
        Self { notation, hues }
    }

    #[must_use]
    pub const fn notation(&self) -> Notation {
        self.notation
    }

    /// The rendered color of `hue` at `lightness` percent.
    #[must_use]
    pub fn get(&self, hue: &str, lightness: u8) -> Option<&str> {
        self.hues.get(hue)?.get(&lightness).map(String::as_str)
    }

    /// All colors of one hue, ascending lightness.
    #[must_use]
    pub fn hue(&self, name: &str) -> Option<&BTreeMap<u8, String>> {
        self.hues.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<u8, String>)> {
        self.hues.iter().map(|(name, colors)| (name.as_str(), colors))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hues.is_empty()
    }

    /// Parse one hue's rendered strings back into colors, ascending
    /// lightness.
    ///
    /// Distances are measured on what the palette publishes, so the OKLCH
    /// notation's rounding is part of the measurement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Color`] if a rendered string fails to parse.
    pub fn parsed(&self, hue: &str) -> Result<Vec<(u8, Color)>> {
        self.hues
            .get(hue)
            .into_iter()
            .flatten()
            .map(|(&l, s)| Ok((l, s.parse::<Color>()?)))
            .collect()
    }
}

// ─── Documents ──────────────────────────────────────────────────────────────

/// Palette document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaletteFormat {
    #[default]
    Toml,
    Json,
}

impl PaletteFormat {
    pub const ALL: [Self; 2] = [Self::Toml, Self::Json];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for PaletteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PaletteFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownFormat { name: s.to_string() })
    }
}

/// Write `palette` as a document tagged with `version`.
///
/// # Errors
///
/// Returns [`Error::Json`] if JSON serialization fails.
pub fn render_palette(palette: &Palette, format: PaletteFormat, version: &str) -> Result<String> {
    match format {
        PaletteFormat::Toml => Ok(render_toml(palette, version)),
        PaletteFormat::Json => render_json(palette, version),
    }
}

fn render_toml(palette: &Palette, version: &str) -> String {
    let mut out = format!("version = \"{version}\"\n\n");
    for (hue, colors) in palette.iter() {
        let _ = writeln!(out, "[{hue}]");
        for (l, color) in colors {
            let _ = writeln!(out, "l{l} = \"{color}\"");
        }
        out.push('\n');
    }
    out
}

fn render_json(palette: &Palette, version: &str) -> Result<String> {
    let mut doc = serde_json::Map::new();
    for (hue, colors) in palette.iter() {
        let colors: serde_json::Map<_, _> = colors
            .iter()
            .map(|(l, color)| (l.to_string(), serde_json::Value::from(color.as_str())))
            .collect();
        doc.insert(hue.to_string(), serde_json::Value::Object(colors));
    }
    doc.insert("version".into(), serde_json::Value::from(version));

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
