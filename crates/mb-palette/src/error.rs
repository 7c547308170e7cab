use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal failures. Coverage shortfalls are not errors; see
/// [`crate::scheme::CoverageShortfall`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown {kind} hue: {name}")]
    UnknownHue { kind: HueKind, name: String },

    #[error("unknown metric: {name} (expected oklch, wcag or lightness)")]
    UnknownMetric { name: String },

    #[error("unknown notation: {name} (expected hex or oklch)")]
    UnknownNotation { name: String },

    #[error("unknown palette format: {name} (expected toml or json)")]
    UnknownFormat { name: String },

    #[error("unknown scheme mode: {name} (expected dark or light)")]
    UnknownMode { name: String },

    #[error("accent hue {hue} has no calibration entry")]
    MissingCalibration { hue: String },

    #[error("hue {name} is declared more than once")]
    DuplicateHue { name: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid scheme parameter {name} = {value} (expected {expected})")]
    InvalidParam {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error(
        "gamut search did not converge at L={lightness} h={hue} after {iterations} doublings"
    )]
    NonConvergence {
        lightness: f64,
        hue: f64,
        iterations: u32,
    },

    #[error("palette color does not parse back: {0}")]
    Color(#[from] mb_color::ParseColorError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which family a hue name was looked up in, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HueKind {
    Monotone,
    Accent,
    Any,
}

impl std::fmt::Display for HueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Monotone => "monotone",
            Self::Accent => "accent",
            Self::Any => "palette",
        })
    }
}

impl Error {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unknown_hue(kind: HueKind, name: impl Into<String>) -> Self {
        Self::UnknownHue {
            kind,
            name: name.into(),
        }
    }

    /// Whether this error comes from bad input rather than an internal
    /// failure of the engine.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        !matches!(self, Self::NonConvergence { .. } | Self::Color(_))
    }
}
