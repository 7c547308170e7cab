use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use mb_palette::{
    CoverageMap, Metric, Mode, Monobiome, Notation, PaletteConfig, PaletteFormat, SchemeParams,
    render_palette,
};
use tracing::{Level, debug};

/// Version tag written into palette and scheme documents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
    name = "monobiome",
    about = "Generate gamut-bounded OKLCH palettes and monobiome color schemes",
    version
)]
pub struct Cli {
    /// Palette configuration (TOML). Defaults to the builtin calibration.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<Level>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the primary palette.
    Palette(PaletteArgs),

    /// Create a scheme variant for one biome.
    Scheme(SchemeArgs),

    /// List the lightness levels where every accent clears the threshold.
    Coverage(CoverageArgs),
}

#[derive(Debug, Args)]
pub struct PaletteArgs {
    /// Color notation (hex or oklch).
    #[arg(short, long, default_value = "hex")]
    pub notation: Notation,

    /// Document format (toml or json).
    #[arg(short, long, default_value = "toml")]
    pub format: PaletteFormat,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SchemeArgs {
    /// Scheme mode (dark or light).
    pub mode: Mode,

    /// Monotone hue the scheme is built on.
    pub biome: String,

    /// Metric for swatch distances (oklch, wcag or lightness).
    #[arg(short, long, default_value = "oklch")]
    pub metric: Metric,

    /// Distance threshold in the metric's units, e.g. oklch 0.40, wcag 4.5,
    /// lightness 40.
    #[arg(short, long, default_value_t = 0.40)]
    pub distance: f64,

    /// Base lightness.
    #[arg(short, long, default_value_t = 20)]
    pub l_base: i32,

    /// Lightness step.
    #[arg(long, default_value_t = 5)]
    pub l_step: i32,

    /// Foreground lightness gap.
    #[arg(long, default_value_t = 50)]
    pub fg_gap: i32,

    /// Grey lightness gap.
    #[arg(long, default_value_t = 30)]
    pub grey_gap: i32,

    /// Terminal foreground lightness gap.
    #[arg(long, default_value_t = 65)]
    pub term_fg_gap: i32,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SchemeArgs {
    fn params(&self) -> SchemeParams {
        SchemeParams {
            mode: self.mode,
            biome: self.biome.clone(),
            metric: self.metric,
            distance: self.distance,
            l_base: self.l_base,
            l_step: self.l_step,
            fg_gap: self.fg_gap,
            grey_gap: self.grey_gap,
            term_fg_gap: self.term_fg_gap,
        }
    }
}

#[derive(Debug, Args)]
pub struct CoverageArgs {
    /// Metric for swatch distances (oklch, wcag or lightness).
    #[arg(short, long, default_value = "oklch")]
    pub metric: Metric,

    /// Distance threshold in the metric's units.
    #[arg(short, long, default_value_t = 0.40)]
    pub distance: f64,
}

/// Read and validate `path`, or fall back to the builtin calibration.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PaletteConfig> {
    let Some(path) = path else {
        return Ok(PaletteConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    PaletteConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let engine = Monobiome::new(config)?;

    match cli.command {
        Commands::Palette(args) => {
            let palette = engine.palette(args.notation);
            let text = render_palette(palette, args.format, VERSION)?;
            emit(&text, args.output.as_deref())
        }
        Commands::Scheme(args) => {
            let scheme = engine.scheme(&args.params(), VERSION)?;
            emit(&scheme.render(), args.output.as_deref())
        }
        Commands::Coverage(args) => {
            let map = engine.coverage(args.distance, args.metric)?;
            print!("{}", coverage_report(&map));
            Ok(())
        }
    }
}

fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), bytes = text.len(), "wrote document");
            Ok(())
        }
    }
}

/// Per monotone hue, its covered lightness levels as runs, e.g.
/// `tundra     10-34 61-98`.
pub fn coverage_report(map: &CoverageMap) -> String {
    let mut out = format!("# {} >= {}\n", map.metric(), map.threshold());
    for monotone in map.monotones() {
        let runs = level_runs(map.levels(monotone));
        let runs = if runs.is_empty() { "-".to_string() } else { runs };
        let _ = writeln!(out, "{monotone:<12} {runs}");
    }
    out
}

/// Collapse ascending levels into `a-b` runs separated by spaces.
fn level_runs(levels: impl Iterator<Item = u8>) -> String {
    let mut runs: Vec<(u8, u8)> = Vec::new();
    for l in levels {
        match runs.last_mut() {
            Some((_, end)) if u16::from(*end) + 1 == u16::from(l) => *end = l,
            _ => runs.push((l, l)),
        }
    }
    runs.iter()
        .map(|&(a, b)| if a == b { a.to_string() } else { format!("{a}-{b}") })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
