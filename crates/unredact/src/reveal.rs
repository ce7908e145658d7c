use std::path::{Path, PathBuf};

use pdf::{RenderMode, RenderOptions};

use crate::analysis::analyze_file;
use crate::prelude::{println, *};
use crate::report::{print_stats, write_stats_json};
use crate::settings::LayoutArgs;

/// Name of the directory, next to the input, that default outputs go to.
const OUTPUT_DIR: &str = "unredacted";

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Mode {
    /// Original page on the left, rebuilt text on the right
    #[value(alias = "side_by_side")]
    SideBySide,
    /// Rebuilt text drawn in white over the original page
    #[value(alias = "overlay_white")]
    OverlayWhite,
}

impl From<Mode> for RenderMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::SideBySide => RenderMode::SideBySide,
            Mode::OverlayWhite => RenderMode::OverlayWhite,
        }
    }
}

#[derive(Debug, clap::Args, Clone)]
pub struct RevealOptions {
    /// Path to the input PDF
    pub input: PathBuf,

    /// Output PDF path (default: <input dir>/unredacted/<name>_<mode>.pdf)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How the rebuilt text is laid out
    #[arg(long, env = "UNREDACT_MODE", default_value = "side-by-side")]
    pub mode: Mode,

    /// Match the original fonts to the closest standard PDF font
    #[arg(long)]
    pub match_font: bool,

    /// Display unredaction statistics
    #[arg(long)]
    pub stats: bool,

    /// Write unredaction statistics to a JSON file
    #[arg(long, value_name = "FILE")]
    pub stats_json: Option<PathBuf>,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

/// Default output path for `input` rendered in `mode`, creating the output
/// directory when it does not exist.
pub fn default_output_path(input: &Path, mode: RenderMode) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| Error::NoFileName(input.display().to_string()))?;

    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join(OUTPUT_DIR);
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| f!("Failed to create output directory {}", dir.display()))?;

    let mut name = stem.to_os_string();
    name.push(mode.file_suffix());
    Ok(dir.join(name))
}

pub fn run(options: RevealOptions) -> Result<()> {
    let (source, analysis) = analyze_file(&options.input, &options.layout)?;

    let render_options = RenderOptions {
        mode: options.mode.into(),
        match_font: options.match_font,
    };
    let output = match options.output {
        Some(path) => path,
        None => default_output_path(&options.input, render_options.mode)?,
    };

    let bytes = source
        .render(&analysis.pages, &render_options)
        .wrap_err("Failed to render output PDF")?;
    std::fs::write(&output, bytes).wrap_err_with(|| f!("Failed to write {}", output.display()))?;
    println!("Wrote: {}", output.display());

    if options.stats {
        print_stats(&analysis.stats);
    }
    if let Some(path) = &options.stats_json {
        write_stats_json(path, &analysis.stats)?;
    }

    Ok(())
}
