// SPDX-License-Identifier: MIT
//
// mb-color color system: OKLCH points and the sRGB device space.
//
// Single-character variable names (r, g, b, l, c, h, a, s, m) are the
// standard mathematical convention in color science. Renaming them would
// make the code harder to compare against reference implementations.
#![allow(clippy::many_single_char_names)]
//
// Palette synthesis works in OKLCH: lightness and chroma are perceptually
// near-uniform and hue is an angle, so a chroma curve drawn over lightness
// means the same thing for every hue. The device space only matters at the
// edges: gamut membership while probing chroma, and hex output.
//
// Conversion pipeline:
//
//   OKLCH → Oklab → Linear sRGB → sRGB → hex
//
// Everything here is f64. The gamut search narrows chroma down to 1e-6 and
// tests membership at 1e-9, which f32 cannot resolve.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// ─── Gamut ───────────────────────────────────────────────────────────────────

/// A device color space whose gamut can bound OKLCH chroma.
///
/// Only sRGB is supported; the enum exists so the gamut travels through
/// configuration and cache keys as a value rather than an implicit global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gamut {
    #[default]
    Srgb,
}

impl Gamut {
    /// Canonical lowercase name, as used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Srgb => "srgb",
        }
    }
}

impl fmt::Display for Gamut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gamut {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "srgb" => Ok(Self::Srgb),
            _ => Err(ParseColorError::UnknownGamut(s.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failure to parse a color or gamut from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    /// Not `oklch(L% C H)`.
    #[error("malformed color: {0:?}")]
    Malformed(String),

    #[error("unknown gamut: {0:?}")]
    UnknownGamut(String),
}

// ─── Color ───────────────────────────────────────────────────────────────────

/// A perceptual color stored in OKLCH space.
///
/// # Examples
///
/// ```
/// use mb_color::{Color, Gamut};
///
/// let red = Color::oklch(0.63, 0.20, 29.0);
/// assert!(red.in_gamut(Gamut::Srgb, 1e-9));
/// assert_eq!(red.to_oklch_string(), "oklch(63.0% 0.2000 29.0)");
///
/// let vivid = red.with_chroma(0.4);
/// assert!(!vivid.in_gamut(Gamut::Srgb, 1e-9));
/// ```
#[derive(Clone, Copy)]
pub struct Color {
    /// Lightness: 0.0 (black) to 1.0 (white).
    pub l: f64,

    /// Chroma: 0.0 (gray) upward. sRGB tops out around 0.32.
    pub c: f64,

    /// Hue angle in degrees, 0.0 to 360.0.
    pub h: f64,
}

impl Color {
    // ─── Constructors ────────────────────────────────────────────────────

    /// Create a color from OKLCH values.
    ///
    /// - `l`: Lightness, 0.0 to 1.0
    /// - `c`: Chroma, >= 0.0
    /// - `h`: Hue angle in degrees
    #[inline]
    #[must_use]
    pub const fn oklch(l: f64, c: f64, h: f64) -> Self {
        Self { l, c, h }
    }

    /// Create a color from a lightness percentage (0–100), chroma and hue.
    ///
    /// Palette code addresses lightness in percent; this keeps the `/ 100`
    /// in one place.
    #[inline]
    #[must_use]
    pub fn from_percent(lightness: f64, c: f64, h: f64) -> Self {
        Self::oklch(lightness / 100.0, c, h)
    }

    /// Pure black.
    pub const BLACK: Self = Self::oklch(0.0, 0.0, 0.0);

    /// Pure white.
    pub const WHITE: Self = Self::oklch(1.0, 0.0, 0.0);

    /// Return a copy with the given chroma.
    #[inline]
    #[must_use]
    pub const fn with_chroma(self, c: f64) -> Self {
        Self { c, ..self }
    }

    /// Lightness as a percentage (0–100).
    #[inline]
    #[must_use]
    pub fn lightness_percent(self) -> f64 {
        self.l * 100.0
    }

    /// Whether this color is achromatic (no visible chroma).
    #[inline]
    #[must_use]
    pub fn is_achromatic(self) -> bool {
        self.c.abs() < 1e-8
    }

    // ─── Distance ────────────────────────────────────────────────────────

    /// Euclidean distance in OKLCH, with hue unrolled to Cartesian a/b.
    ///
    /// Both colors are already OKLCH, so no round trip through another
    /// space is needed: `(l, c·cos h, c·sin h)` is exactly Oklab.
    #[must_use]
    pub fn oklch_distance(self, other: &Self) -> f64 {
        let (l1, a1, b1) = oklch_to_oklab(self.l, self.c, self.h);
        let (l2, a2, b2) = oklch_to_oklab(other.l, other.c, other.h);
        let dl = l1 - l2;
        let da = a1 - a2;
        let db = b1 - b2;
        db.mul_add(db, dl.mul_add(dl, da * da)).sqrt()
    }

    // ─── Device Space ────────────────────────────────────────────────────

    /// Convert to gamma-encoded sRGB without clamping.
    ///
    /// Out-of-gamut colors produce components outside 0.0–1.0.
    #[must_use]
    pub fn to_srgb_unclamped(self) -> (f64, f64, f64) {
        oklch_to_srgb(self.l, self.c, self.h)
    }

    /// Convert to sRGB clamped into 0.0–1.0.
    #[must_use]
    pub fn to_srgb(self) -> (f64, f64, f64) {
        let (r, g, b) = self.to_srgb_unclamped();
        (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
    }

    /// Convert to 8-bit sRGB (clamped).
    #[must_use]
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let (r, g, b) = self.to_srgb();
        (to_u8(r), to_u8(g), to_u8(b))
    }

    /// Whether this color lies within `gamut`, allowing each channel to
    /// stray up to `tolerance` outside the unit interval.
    #[must_use]
    pub fn in_gamut(self, gamut: Gamut, tolerance: f64) -> bool {
        match gamut {
            Gamut::Srgb => {
                let (r, g, b) = self.to_srgb_unclamped();
                let range = -tolerance..=1.0 + tolerance;
                range.contains(&r) && range.contains(&g) && range.contains(&b)
            }
        }
    }

    // ─── Notation ────────────────────────────────────────────────────────

    /// Hex string `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// CSS-style OKLCH notation: lightness percent and hue to one decimal,
    /// chroma to four.
    #[must_use]
    pub fn to_oklch_string(self) -> String {
        format!(
            "oklch({:.1}% {:.4} {:.1})",
            self.lightness_percent(),
            self.c,
            self.h
        )
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color::oklch({:.4}, {:.4}, {:.1})", self.l, self.c, self.h)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_oklch_string())
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        const EPS: f64 = 1e-9;
        (self.l - other.l).abs() < EPS
            && (self.c - other.c).abs() < EPS
            && (self.is_achromatic()
                || other.is_achromatic()
                || hue_diff(self.h, other.h) < EPS)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

static OKLCH_NOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^oklch\(\s*([-+0-9.eE]+)(%?)\s+([-+0-9.eE]+)\s+([-+0-9.eE]+)\s*\)$",
    )
    .expect("static regex")
});

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parse `oklch(L% C H)`. Lightness may also be given as a 0–1
    /// fraction without `%`. Hex is output-only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || ParseColorError::Malformed(s.to_string());

        let caps = OKLCH_NOTATION.captures(s).ok_or_else(malformed)?;
        let num = |i: usize| caps[i].parse::<f64>().map_err(|_| malformed());
        let l = num(1)?;
        let l = if caps[2].is_empty() { l } else { l / 100.0 };
        Ok(Self::oklch(l, num(3)?, normalize_hue(num(4)?)))
    }
}

// ─── Color Space Conversion Functions ────────────────────────────────────────
//
// Oklab math by Björn Ottosson.
// Reference: https://bottosson.github.io/posts/oklab/

/// Normalize a hue angle to the range [0, 360).
#[inline]
fn normalize_hue(h: f64) -> f64 {
    let h = h % 360.0;
    if h < 0.0 { h + 360.0 } else { h }
}

/// Absolute hue difference (shortest arc on the color wheel).
#[inline]
fn hue_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    if d > 180.0 { 360.0 - d } else { d }
}

// ─── OKLCH → Oklab ──────────────────────────────────────────────────────────

#[inline]
fn oklch_to_oklab(l: f64, c: f64, h: f64) -> (f64, f64, f64) {
    let h_rad = h.to_radians();
    (l, c * h_rad.cos(), c * h_rad.sin())
}


// ─── Oklab → Linear sRGB ────────────────────────────────────────────────────

/// Convert Oklab (L, a, b) to linear sRGB.
#[inline]
fn oklab_to_linear_srgb(l_ok: f64, a: f64, b: f64) -> (f64, f64, f64) {
    // Oklab → LMS (cube roots)
    let l_ = 0.215_803_757_3f64.mul_add(b, 0.396_337_777_4f64.mul_add(a, l_ok));
    let m_ = 0.063_854_172_8f64.mul_add(-b, 0.105_561_345_8f64.mul_add(-a, l_ok));
    let s_ = 1.291_485_548_0f64.mul_add(-b, 0.089_484_177_5f64.mul_add(-a, l_ok));

    let l = l_ * l_ * l_;
    let m = m_ * m_ * m_;
    let s = s_ * s_ * s_;

    // LMS → Linear sRGB
    let r = 0.230_969_929_2f64.mul_add(s, 4.076_741_662_1f64.mul_add(l, -(3.307_711_591_3 * m)));
    let g = 0.341_319_396_5f64.mul_add(-s, (-1.268_438_004_6f64).mul_add(l, 2.609_757_401_1 * m));
    let bl = 1.707_614_701_0f64.mul_add(s, (-0.004_196_086_3f64).mul_add(l, -(0.703_418_614_7 * m)));

    (r, g, bl)
}

// ─── Linear sRGB ↔ sRGB (Gamma) ─────────────────────────────────────────────
//
// The transfer functions are extended to negative values by symmetry so an
// out-of-gamut linear component stays out of gamut after encoding.

/// Convert a single linear sRGB component to sRGB (apply gamma).
#[inline]
#[must_use]
pub fn linear_to_srgb(c: f64) -> f64 {
    let abs = c.abs();
    let v = if abs <= 0.003_130_8 {
        abs * 12.92
    } else {
        1.055f64.mul_add(abs.powf(1.0 / 2.4), -0.055)
    };
    v.copysign(c)
}

/// Convert a single sRGB component to linear sRGB (remove gamma).
#[inline]
#[must_use]
pub fn srgb_to_linear(c: f64) -> f64 {
    let abs = c.abs();
    let v = if abs <= 0.040_45 {
        abs / 12.92
    } else {
        ((abs + 0.055) / 1.055).powf(2.4)
    };
    v.copysign(c)
}

// ─── Composite Conversions ───────────────────────────────────────────────────

fn oklch_to_srgb(l: f64, c: f64, h: f64) -> (f64, f64, f64) {
    let (l, a, b) = oklch_to_oklab(l, c, h);
    let (lr, lg, lb) = oklab_to_linear_srgb(l, a, b);
    (linear_to_srgb(lr), linear_to_srgb(lg), linear_to_srgb(lb))
}

/// Convert a float (0.0–1.0) to a u8 (0–255) with rounding.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f64) -> u8 {
    // Clamp guarantees 0.0 <= value <= 255.0 before truncation.
    v.mul_add(255.0, 0.5).clamp(0.0, 255.0) as u8
}

// ─── Tests ───────────────────────────────────────────────────────────────────
