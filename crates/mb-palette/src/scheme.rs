//! Scheme assembly: semantic roles → `hue.lightness` palette references.
//!
//! One assembly at base lightness `b` (signed step `s`, gaps `fg`, `grey`,
//! `tfg`) yields three pair groups:
//!
//! ```text
//! term      background b        selection_bg b+s     selection_fg b+tfg-s
//!           foreground b+tfg    cursor b+tfg-s       cursor_text  b+s
//! monotone  bg0..bg3  b, b+s, b+2s, b+3s
//!           fg3..fg0  b+fg, b+fg+s, b+fg+2s, b+fg+3s
//! accent    black b   grey b+grey   white b+tfg-2s
//!           <role>    nearest covered accent of the mapped hue
//! ```
//!
//! A full [`Scheme`] runs four assemblies: system colors at `l_base`,
//! terminal colors at `l_base + s`, bright terminal accents ten steps of
//! lightness further, and the vim section at `l_base + s`. Light mode flips
//! the sign of every delta and reuses the same formulas.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::config::{LightnessRange, RoleMap, RoleMaps};
use crate::coverage::CoverageMap;
use crate::distance::Metric;
use crate::error::{Error, HueKind, Result};

/// Lightness offset of the bright terminal accents from the normal ones.
pub const BRIGHT_OFFSET: i32 = 10;

/// Largest accepted magnitude of a step or gap.
pub const MAX_DELTA: i32 = 100;

// ─── Parameters ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Dark,
    Light,
}

impl Mode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Direction foregrounds move away from the background.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Dark => 1,
            Self::Light => -1,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(Error::UnknownMode { name: s.to_string() }),
        }
    }
}

/// Signed lightness deltas of one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deltas {
    pub l_step: i32,
    pub fg_gap: i32,
    pub grey_gap: i32,
    pub term_fg_gap: i32,
}

/// Everything a scheme is generated from, with deltas as magnitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeParams {
    pub mode: Mode,
    pub biome: String,
    pub metric: Metric,
    pub distance: f64,
    pub l_base: i32,
    pub l_step: i32,
    pub fg_gap: i32,
    pub grey_gap: i32,
    pub term_fg_gap: i32,
}

impl SchemeParams {
    /// Default parameters for `biome`: oklch metric at 0.40, base 20,
    /// step 5, gaps 50/30/65.
    #[must_use]
    pub fn new(mode: Mode, biome: impl Into<String>) -> Self {
        Self {
            mode,
            biome: biome.into(),
            metric: Metric::Oklch,
            distance: 0.40,
            l_base: 20,
            l_step: 5,
            fg_gap: 50,
            grey_gap: 30,
            term_fg_gap: 65,
        }
    }

    /// Reject a base outside `0..=100`, a step or gap larger than
    /// [`MAX_DELTA`], and a distance that is negative or not finite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParam`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !(0..=100).contains(&self.l_base) {
            return Err(invalid("l_base", self.l_base, "0..=100"));
        }
        for (name, value) in [
            ("l_step", self.l_step),
            ("fg_gap", self.fg_gap),
            ("grey_gap", self.grey_gap),
            ("term_fg_gap", self.term_fg_gap),
        ] {
            if !(-MAX_DELTA..=MAX_DELTA).contains(&value) {
                return Err(invalid(name, value, "-100..=100"));
            }
        }
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(invalid("distance", self.distance, "a non-negative number"));
        }
        Ok(())
    }

    /// Deltas with the mode's sign applied.
    #[must_use]
    pub const fn deltas(&self) -> Deltas {
        let sign = self.mode.sign();
        Deltas {
            l_step: self.l_step.saturating_mul(sign),
            fg_gap: self.fg_gap.saturating_mul(sign),
            grey_gap: self.grey_gap.saturating_mul(sign),
            term_fg_gap: self.term_fg_gap.saturating_mul(sign),
        }
    }

    /// Base lightness of the terminal and vim sections.
    #[must_use]
    pub const fn l_app(&self) -> i32 {
        self.l_base.saturating_add(self.deltas().l_step)
    }

    /// Base lightness of the bright terminal accents.
    #[must_use]
    pub const fn l_bright(&self) -> i32 {
        self.l_app().saturating_add(self.mode.sign() * BRIGHT_OFFSET)
    }
}

fn invalid(name: &'static str, value: impl fmt::Display, expected: &'static str) -> Error {
    Error::InvalidParam {
        name,
        value: value.to_string(),
        expected,
    }
}

// ─── Shortfalls ─────────────────────────────────────────────────────────────

/// A coverage gap met while assembling. Never fatal.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageShortfall {
    /// Some monotone hues have no coverage at this base lightness.
    Partial {
        l_base: i32,
        distance: f64,
        covered: usize,
        total: usize,
    },
    /// The chosen biome has no coverage at this base lightness; its role
    /// accents are left out.
    BiomeUnsatisfiable {
        biome: String,
        metric: Metric,
        l_base: i32,
    },
}

impl fmt::Display for CoverageShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial {
                l_base,
                distance,
                covered,
                total,
            } => write!(
                f,
                "partial scheme coverage for l_base={l_base} at distance={distance}: \
                 {covered} of {total} biomes covered"
            ),
            Self::BiomeUnsatisfiable {
                biome,
                metric,
                l_base,
            } => write!(
                f,
                "biome {biome} unable to meet {metric} constraints at l_base={l_base}"
            ),
        }
    }
}

// ─── Assembly ───────────────────────────────────────────────────────────────

/// `(role, value)` as written to the scheme file.
pub type Pair = (String, String);

/// The three pair groups of one assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairGroups {
    pub term: Vec<Pair>,
    pub monotone: Vec<Pair>,
    pub accent: Vec<Pair>,
}

/// Template reference to `hue` at `lightness`, e.g. `f{{red.l65}}`.
fn reference(hue: &str, lightness: i32) -> String {
    format!("f{{{{{hue}.l{lightness}}}}}")
}

/// Inverse of [`reference`]: `f{{red.l65}}` → `("red", 65)`.
fn parse_reference(value: &str) -> Option<(&str, i32)> {
    let inner = value.strip_prefix("f{{")?.strip_suffix("}}")?;
    let (hue, lightness) = inner.rsplit_once(".l")?;
    Some((hue, lightness.parse().ok()?))
}

/// `base` plus every term, saturating at the `i32` bounds.
fn offset(base: i32, terms: &[i32]) -> i32 {
    terms.iter().fold(base, |l, &t| l.saturating_add(t))
}

/// Assemble the role pairs for `biome` at base lightness `l_base`.
///
/// Shortfalls are returned rather than raised; the accent group then
/// carries only `black`, `grey` and `white`. References are not checked
/// against the palette range; see [`out_of_range`].
#[must_use]
pub fn assemble_groups(
    biome: &str,
    l_base: i32,
    deltas: Deltas,
    coverage: &CoverageMap,
    roles: &RoleMap,
) -> (PairGroups, Vec<CoverageShortfall>) {
    let Deltas {
        l_step: s,
        fg_gap: fg,
        grey_gap: grey,
        term_fg_gap: tfg,
    } = deltas;
    let b = l_base;
    let mono = |terms: &[i32]| reference(biome, offset(b, terms));

    let mut shortfalls = Vec::new();
    let key = u8::try_from(l_base).ok();
    let total = coverage.monotones().count();
    let covered = key.map_or(0, |k| coverage.covered_at(k).count());
    if covered < total {
        shortfalls.push(CoverageShortfall::Partial {
            l_base,
            distance: coverage.threshold(),
            covered,
            total,
        });
    }
    let accents = key.and_then(|k| coverage.get(biome, k));
    if accents.is_none() {
        shortfalls.push(CoverageShortfall::BiomeUnsatisfiable {
            biome: biome.to_string(),
            metric: coverage.metric(),
            l_base,
        });
    }

    let term = vec![
        ("background".into(), mono(&[])),
        ("selection_bg".into(), mono(&[s])),
        ("selection_fg".into(), mono(&[tfg, s.saturating_neg()])),
        ("foreground".into(), mono(&[tfg])),
        ("cursor".into(), mono(&[tfg, s.saturating_neg()])),
        ("cursor_text".into(), mono(&[s])),
    ];

    let monotone = (0..4)
        .map(|i| (format!("bg{i}"), mono(&[s.saturating_mul(i)])))
        .chain((0..4).map(|i| (format!("fg{}", 3 - i), mono(&[fg, s.saturating_mul(i)]))))
        .collect();

    let mut accent = vec![
        ("black".into(), mono(&[])),
        ("grey".into(), mono(&[grey])),
        ("white".into(), mono(&[tfg, s.saturating_mul(-2)])),
    ];
    if let Some(accents) = accents {
        for (role, hue) in roles {
            // Role targets are validated against the accent family, and a
            // covered level holds every accent.
            if let Some(swatch) = accents.get(hue) {
                accent.push((role.clone(), reference(hue, i32::from(swatch.lightness))));
            }
        }
    }

    (
        PairGroups {
            term,
            monotone,
            accent,
        },
        shortfalls,
    )
}

/// Distinct `(hue, lightness)` references in `pairs` that fall outside
/// `range`, in first-seen order.
#[must_use]
pub fn out_of_range<'a>(
    pairs: impl IntoIterator<Item = &'a Pair>,
    range: &LightnessRange,
) -> Vec<(String, i32)> {
    let mut found: Vec<(String, i32)> = Vec::new();
    for (hue, lightness) in pairs.into_iter().filter_map(|(_, v)| parse_reference(v)) {
        if !range.contains(lightness) && !found.iter().any(|(h, l)| h == hue && *l == lightness) {
            found.push((hue.to_string(), lightness));
        }
    }
    found
}

// ─── Scheme ─────────────────────────────────────────────────────────────────

/// A fully assembled scheme document.
#[derive(Debug, Clone, PartialEq)]
pub struct Scheme {
    pub version: String,
    pub meta: Vec<Pair>,
    pub monotone: Vec<Pair>,
    pub accent: Vec<Pair>,
    pub term: Vec<Pair>,
    pub term_normal: Vec<Pair>,
    pub term_bright: Vec<Pair>,
    pub vim_monotone: Vec<Pair>,
    pub vim_accent: Vec<Pair>,
    /// Distinct shortfalls met across all assemblies, in order.
    pub shortfalls: Vec<CoverageShortfall>,
}

/// Assemble a full scheme for `params` from a coverage map computed at
/// `params.distance` and `params.metric`.
///
/// Shortfalls are logged at warn level and kept on the result, as are
/// references in the finished document that lie outside `range`.
///
/// # Errors
///
/// Returns [`Error::InvalidParam`] for parameters
/// [`SchemeParams::validate`] rejects, and [`Error::UnknownHue`] if the
/// biome is not a monotone hue.
pub fn assemble_scheme(
    params: &SchemeParams,
    coverage: &CoverageMap,
    roles: &RoleMaps,
    range: &LightnessRange,
    version: &str,
) -> Result<Scheme> {
    params.validate()?;
    let biome = params.biome.as_str();
    if !coverage.monotones().any(|m| m == biome) {
        return Err(Error::unknown_hue(HueKind::Monotone, biome));
    }

    let deltas = params.deltas();
    let mut shortfalls = Vec::new();
    let mut assemble = |l_base: i32, map: &RoleMap| {
        let (groups, found) = assemble_groups(biome, l_base, deltas, coverage, map);
        for shortfall in found {
            if !shortfalls.contains(&shortfall) {
                warn!("{shortfall}");
                shortfalls.push(shortfall);
            }
        }
        groups
    };

    let system = assemble(params.l_base, &roles.system);
    let normal = assemble(params.l_app(), &roles.terminal);
    let bright = assemble(params.l_bright(), &roles.terminal);
    let vim = assemble(params.l_app(), &roles.vim);

    let meta = [
        ("version", version.to_string()),
        ("mode", params.mode.to_string()),
        ("biome", params.biome.clone()),
        ("metric", params.metric.to_string()),
        ("distance", format!("{:?}", params.distance)),
        ("l_base", params.l_base.to_string()),
        ("l_step", deltas.l_step.to_string()),
        ("fg_gap", deltas.fg_gap.to_string()),
        ("grey_gap", deltas.grey_gap.to_string()),
        ("term_fg_gap", deltas.term_fg_gap.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let scheme = Scheme {
        version: version.to_string(),
        meta,
        monotone: system.monotone,
        accent: system.accent,
        term: normal.term,
        term_normal: normal.accent,
        term_bright: bright.accent,
        vim_monotone: vim.monotone,
        vim_accent: vim.accent,
        shortfalls,
    };
    for (hue, lightness) in out_of_range(scheme.references(), range) {
        warn!(hue, lightness, "scheme references a lightness outside the palette");
    }
    Ok(scheme)
}

impl Scheme {
    /// Render the scheme file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![
            "# ++ monobiome scheme file ++".to_string(),
            format!("# ++ generated CLI @ {} ++", self.version),
        ];
        push_pairs(&mut lines, &self.meta);
        push_pairs(&mut lines, &self.monotone);
        push_pairs(&mut lines, &self.accent);
        for (header, sections) in [
            ("[term]", [&self.term[..], &[]]),
            ("[term.normal]", [&self.term_normal[..], &[]]),
            ("[term.bright]", [&self.term_bright[..], &[]]),
            ("[vim]", [&self.vim_monotone[..], &self.vim_accent[..]]),
        ] {
            lines.push(String::new());
            lines.push(header.to_string());
            for section in sections {
                push_pairs(&mut lines, section);
            }
        }
        lines.join("\n")
    }

    /// Every role pair of the document, excluding the metadata header.
    pub fn references(&self) -> impl Iterator<Item = &Pair> {
        [
            &self.monotone,
            &self.accent,
            &self.term,
            &self.term_normal,
            &self.term_bright,
            &self.vim_monotone,
            &self.vim_accent,
        ]
        .into_iter()
        .flatten()
    }

    /// Whether every assembly found full coverage.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

fn push_pairs(lines: &mut Vec<String>, pairs: &[Pair]) {
    lines.extend(pairs.iter().map(|(k, v)| format!("{k:<12} = \"{v}\"")));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
