use std::path::Path;

use thiserror::Error;
use unredact_core::{
    analyze_document, ConfigError, DocumentAnalysis, LayoutConfig, PageAnalysis, PageFailure,
    PageGeometry,
};

use parser::backend::LopdfBackend;

pub mod parser;
pub mod render;

#[cfg(test)]
mod test_support;

pub use parser::backend::{PageBox, PdfBackend};
pub use parser::ExtractOptions;
pub use render::{RenderMode, RenderOptions};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("PDF writing error: {0}")]
    Write(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded source PDF.
///
/// Constructed via [`SourceDocument::from_bytes`].  Extraction and rendering
/// share the parsed document, so the input is only parsed once.
#[derive(Debug)]
pub struct SourceDocument {
    backend: LopdfBackend,
}

impl SourceDocument {
    /// Parse PDF bytes.  Encrypted documents are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let backend = LopdfBackend::load_bytes(bytes)?;
        log::debug!("loaded PDF with {} pages", backend.page_count());
        Ok(SourceDocument { backend })
    }

    /// Read and parse a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// Page geometry, one page at a time, in page order.
    pub fn pages<'a>(
        &'a self,
        options: &'a ExtractOptions,
    ) -> impl Iterator<Item = Result<PageGeometry, PageFailure>> + 'a {
        parser::extract_pages(&self.backend, options)
    }

    /// Extract every page and run the layout analysis over it.
    ///
    /// Both the extraction options and the layout configuration are
    /// validated before the first page is read.
    pub fn analyze(
        &self,
        options: &ExtractOptions,
        config: &LayoutConfig,
    ) -> Result<DocumentAnalysis, PdfError> {
        options.validate()?;
        Ok(analyze_document(self.pages(options), config)?)
    }

    /// Write the rebuilt lines into a copy of this document.
    pub fn render(
        &self,
        pages: &[PageAnalysis],
        options: &RenderOptions,
    ) -> Result<Vec<u8>, PdfError> {
        render::render_document(&self.backend, pages, options)
    }
}

// ---------------------------------------------------------------------------
// Convenience free functions (stateless, re-parse each call)
// ---------------------------------------------------------------------------

/// Analyze PDF bytes with default extraction options.
pub fn analyze(bytes: &[u8], config: &LayoutConfig) -> Result<DocumentAnalysis, PdfError> {
    SourceDocument::from_bytes(bytes)?.analyze(&ExtractOptions::default(), config)
}

/// Analyze PDF bytes and render the result.
pub fn unredact(
    bytes: &[u8],
    config: &LayoutConfig,
    options: &RenderOptions,
) -> Result<(DocumentAnalysis, Vec<u8>), PdfError> {
    let source = SourceDocument::from_bytes(bytes)?;
    let analysis = source.analyze(&ExtractOptions::default(), config)?;
    let rendered = source.render(&analysis.pages, options)?;
    Ok((analysis, rendered))
}
