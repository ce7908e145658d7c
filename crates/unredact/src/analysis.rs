use std::path::Path;

use colored::Colorize;
use pdf::SourceDocument;
use unredact_core::DocumentAnalysis;

use crate::prelude::{eprintln, *};
use crate::settings::LayoutArgs;

/// Load a PDF and run the layout analysis over every page.
///
/// Skipped pages are reported on stderr.  A document where no page could be
/// read is an error.
pub fn analyze_file(input: &Path, layout: &LayoutArgs) -> Result<(SourceDocument, DocumentAnalysis)> {
    if !input.exists() {
        return Err(Error::InputNotFound(input.display().to_string()).into());
    }

    let config = layout.layout_config()?;
    let options = layout.extract_options()?;
    let source = SourceDocument::open(input)
        .wrap_err_with(|| f!("Failed to load {}", input.display()))?;
    let analysis = source
        .analyze(&options, &config)
        .wrap_err_with(|| f!("Failed to analyze {}", input.display()))?;

    for failure in &analysis.skipped {
        eprintln!(
            "{} page {}: {}",
            "warning:".yellow().bold(),
            failure.page_index + 1,
            failure.reason
        );
    }

    if analysis.pages.is_empty() && !analysis.skipped.is_empty() {
        return Err(Error::NoPages(input.display().to_string()).into());
    }

    log::info!(
        "{}: {} pages, {} words, {} boxes",
        input.display(),
        analysis.pages.len(),
        analysis.stats.words_total,
        analysis.stats.boxes_found
    );
    Ok((source, analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_is_reported() {
        let layout = LayoutArgs {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            ..LayoutArgs::default()
        };
        let err = analyze_file(Path::new("/nonexistent/input.pdf"), &layout).unwrap_err();
        assert!(f!("{err}").contains("Input file not found"));
    }

    #[test]
    fn test_non_pdf_input_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text, not a PDF").unwrap();

        let layout = LayoutArgs {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            ..LayoutArgs::default()
        };
        let err = analyze_file(&path, &layout).unwrap_err();
        assert!(f!("{err}").contains("Failed to load"));
    }

    #[test]
    fn test_bad_tolerance_rejected_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, b"plain text, not a PDF").unwrap();

        let layout = LayoutArgs {
            x_tolerance: 3.0,
            y_tolerance: -1.0,
            ..LayoutArgs::default()
        };
        let err = analyze_file(&path, &layout).unwrap_err();
        assert!(f!("{err}").contains("y-tolerance"));
    }
}
