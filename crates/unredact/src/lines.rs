use std::path::PathBuf;

use colored::Colorize;
use unredact_core::{DocumentAnalysis, RebuiltLine};

use crate::analysis::analyze_file;
use crate::prelude::{println, *};
use crate::settings::LayoutArgs;

#[derive(Debug, clap::Args, Clone)]
pub struct LinesOptions {
    /// Path to the input PDF
    pub input: PathBuf,

    /// Only print this page (1-indexed)
    #[arg(short, long)]
    pub page: Option<usize>,

    /// Only print lines that contain at least one hidden word
    #[arg(long)]
    pub hidden: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

/// The lines selected by `options`, in page order.
pub fn select_lines<'a>(analysis: &'a DocumentAnalysis, options: &LinesOptions) -> Vec<&'a RebuiltLine> {
    analysis
        .pages
        .iter()
        .filter(|p| options.page.map_or(true, |n| p.page_index + 1 == n))
        .flat_map(|p| {
            p.lines
                .iter()
                .filter(move |line| !options.hidden || p.line_has_hidden_word(line))
        })
        .collect()
}

pub fn run(options: LinesOptions) -> Result<()> {
    let (_, analysis) = analyze_file(&options.input, &options.layout)?;

    if let Some(page) = options.page {
        if page == 0 || !analysis.pages.iter().any(|p| p.page_index + 1 == page) {
            return Err(eyre!("Page {} not found in {}", page, options.input.display()));
        }
    }

    let lines = select_lines(&analysis, &options);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    let mut current_page = None;
    for line in lines {
        if current_page != Some(line.page_index) {
            current_page = Some(line.page_index);
            println!("\n{}", f!("Page {}", line.page_index + 1).bold());
        }
        println!("{}", line.text);
    }

    Ok(())
}
