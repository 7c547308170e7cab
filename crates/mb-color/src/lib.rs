// SPDX-License-Identifier: MIT

//! # mb-color: OKLCH color primitives for monobiome
//!
//! The small color library the palette engine is built on:
//!
//! - [`Color`]: an OKLCH point with conversion to sRGB
//! - [`Gamut`]: device gamut membership with a per-channel tolerance
//! - hex output, and `oklch(L% C H)` notation both ways
//! - [`contrast`]: WCAG 2.1 relative luminance and contrast ratio
//!
//! Nothing here caches or allocates beyond the returned strings; the
//! palette crate layers memoization on top.

pub mod color;
pub mod contrast;

pub use color::{Color, Gamut, ParseColorError};
pub use contrast::contrast_ratio;
