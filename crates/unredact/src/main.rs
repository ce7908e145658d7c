use crate::prelude::*;
use clap::Parser;

mod analysis;
mod error;
mod lines;
mod prelude;
mod report;
mod reveal;
mod settings;
mod stats;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Recover text left underneath black-bar redactions in PDF files"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Write a PDF that shows the text hidden under redaction boxes
    Reveal(crate::reveal::RevealOptions),

    /// Report how much text is hidden under redaction boxes
    Stats(crate::stats::StatsOptions),

    /// Print the rebuilt text lines of each page
    Lines(crate::lines::LinesOptions),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Reveal(options) => crate::reveal::run(options),
        SubCommands::Stats(options) => crate::stats::run(options),
        SubCommands::Lines(options) => crate::lines::run(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        App::command().debug_assert();
    }

    #[test]
    fn test_reveal_flags_parse() {
        let app = App::try_parse_from([
            "unredact",
            "reveal",
            "files/doc.pdf",
            "--mode",
            "overlay_white",
            "--line-tol",
            "3.5",
            "--min-spaces",
            "2",
            "--baseline",
            "running-mean",
            "--stats",
            "--stats-json",
            "stats.json",
        ])
        .unwrap();

        let SubCommands::Reveal(options) = app.command else {
            panic!("expected reveal");
        };
        assert!(matches!(options.mode, crate::reveal::Mode::OverlayWhite));
        assert_eq!(options.layout.line_tolerance, Some(3.5));
        assert_eq!(options.layout.min_spaces, Some(2));
        assert!(options.stats);
        assert_eq!(options.layout.x_tolerance, 3.0);

        let config = options.layout.layout_config().unwrap();
        assert_eq!(config.baseline, unredact_core::BaselinePolicy::RunningMean);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(App::try_parse_from(["unredact", "reveal", "a.pdf", "--mode", "sideways"]).is_err());
    }
}
