//! Layout and extraction flags shared by every subcommand.

use std::path::PathBuf;

use pdf::ExtractOptions;
use unredact_core::{BaselinePolicy, LayoutConfig};

use crate::prelude::*;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Baseline {
    /// Keep the first word's top edge as the line baseline
    Fixed,
    /// Track the mean top edge of the words seen so far
    RunningMean,
}

impl From<Baseline> for BaselinePolicy {
    fn from(b: Baseline) -> Self {
        match b {
            Baseline::Fixed => BaselinePolicy::Fixed,
            Baseline::RunningMean => BaselinePolicy::RunningMean,
        }
    }
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct LayoutArgs {
    /// TOML file with layout settings (kebab-case keys); flags override it
    #[arg(long, env = "UNREDACT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Line grouping tolerance in points. Try 1.5 to 4.0
    #[arg(long = "line-tol", env = "UNREDACT_LINE_TOL")]
    pub line_tolerance: Option<f64>,

    /// How the line baseline is tracked
    #[arg(long, env = "UNREDACT_BASELINE")]
    pub baseline: Option<Baseline>,

    /// Multiplier on the inferred character width per inserted space (bigger means fewer spaces)
    #[arg(long, env = "UNREDACT_SPACE_UNIT")]
    pub space_unit: Option<f64>,

    /// Fixed character width in points instead of the per-line median
    #[arg(long, env = "UNREDACT_CHAR_WIDTH")]
    pub char_width: Option<f64>,

    /// Minimum spaces between words when a gap exists
    #[arg(long, env = "UNREDACT_MIN_SPACES")]
    pub min_spaces: Option<u32>,

    /// Minimum fraction of a word's area under a box for it to count as hidden
    #[arg(long = "overlap", env = "UNREDACT_OVERLAP")]
    pub overlap_fraction: Option<f64>,

    /// Minimum area of a filled shape for it to count as a redaction box
    #[arg(long, env = "UNREDACT_MIN_BOX_AREA")]
    pub min_box_area: Option<f64>,

    /// Largest horizontal jump (points) between glyphs of one word
    #[arg(long, default_value = "3.0")]
    pub x_tolerance: f64,

    /// Largest vertical jump (points) between glyphs of one word
    #[arg(long, default_value = "3.0")]
    pub y_tolerance: f64,
}

impl LayoutArgs {
    /// Defaults, then the `--config` file, then flags.  The result is
    /// validated.
    pub fn layout_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let source = std::fs::read_to_string(path)
                    .wrap_err_with(|| f!("Failed to read config file {}", path.display()))?;
                LayoutConfig::from_toml_str(&source)
                    .wrap_err_with(|| f!("Invalid config file {}", path.display()))?
            }
            None => LayoutConfig::default(),
        };

        if let Some(v) = self.line_tolerance {
            config.line_tolerance = v;
        }
        if let Some(v) = self.baseline {
            config.baseline = v.into();
        }
        if let Some(v) = self.space_unit {
            config.space_unit = v;
        }
        if let Some(v) = self.char_width {
            config.char_width = Some(v);
        }
        if let Some(v) = self.min_spaces {
            config.min_spaces = v;
        }
        if let Some(v) = self.overlap_fraction {
            config.overlap_fraction = v;
        }
        if let Some(v) = self.min_box_area {
            config.min_box_area = v;
        }

        config.validate()?;
        log::debug!("layout config: {config:?}");
        Ok(config)
    }

    /// Word-building tolerances from the flags, validated.
    pub fn extract_options(&self) -> Result<ExtractOptions> {
        let options = ExtractOptions {
            x_tolerance: self.x_tolerance,
            y_tolerance: self.y_tolerance,
        };
        options.validate()?;
        Ok(options)
    }
}
