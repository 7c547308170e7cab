// SPDX-License-Identifier: MIT

//! WCAG 2.1 relative luminance and contrast ratio.
//!
//! Contrast is measured in sRGB relative luminance (the WCAG definition),
//! not in OKLCH. The scheme engine treats it as one more distance metric:
//! an accent qualifies once its ratio against the monotone base clears the
//! configured threshold (e.g. 4.5 for WCAG AA body text).

use crate::color::{Color, srgb_to_linear};

/// Luminance `Y` of `color`: linearized sRGB channels weighted
/// 0.2126 / 0.7152 / 0.0722. Black is 0, white is 1.
#[must_use]
pub fn relative_luminance(color: Color) -> f64 {
    let (r, g, b) = color.to_srgb();
    let (r, g, b) = (srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b));
    0.2126f64.mul_add(r, 0.7152f64.mul_add(g, 0.0722 * b))
}

/// WCAG ratio `(Y_hi + 0.05) / (Y_lo + 0.05)`, between 1 and 21.
///
/// The luminances are ordered before dividing, so the result does not depend
/// on which argument is the foreground. The names only document call sites.
#[must_use]
pub fn contrast_ratio(fg: Color, bg: Color) -> f64 {
    let (y_fg, y_bg) = (relative_luminance(fg), relative_luminance(bg));
    (y_fg.max(y_bg) + 0.05) / (y_fg.min(y_bg) + 0.05)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
