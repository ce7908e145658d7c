use std::path::PathBuf;

use crate::analysis::analyze_file;
use crate::prelude::{println, *};
use crate::report::{print_stats, stats_json, write_stats_json};
use crate::settings::LayoutArgs;

#[derive(Debug, clap::Args, Clone)]
pub struct StatsOptions {
    /// Path to the input PDF
    pub input: PathBuf,

    /// Print the statistics as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the statistics to a JSON file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub layout: LayoutArgs,
}

pub fn run(options: StatsOptions) -> Result<()> {
    let (_, analysis) = analyze_file(&options.input, &options.layout)?;

    if options.json {
        println!("{}", stats_json(&analysis.stats)?);
    } else {
        print_stats(&analysis.stats);
    }

    if let Some(path) = &options.output {
        write_stats_json(path, &analysis.stats)?;
    }

    Ok(())
}
