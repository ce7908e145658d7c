//! Core library for unredact
//!
//! This crate implements the **Functional Core** of the unredact tool,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The unredact project uses a three-crate architecture:
//!
//! - **`unredact_core`** (this crate): Pure layout reconstruction with zero I/O
//! - **`pdf`**: Reads word and shape geometry out of PDF files and renders
//!   the reconstructed text back into PDF pages
//! - **`unredact`**: The command line shell that wires the two together
//!
//! ## Functional Core Principles
//!
//! Everything in this crate is a function of its inputs and a
//! [`LayoutConfig`]. Nothing here opens files, reads the clock or touches
//! global state, so every stage can be tested with hand-written geometry.
//! The only side effect is `log` output, which never changes a result.
//!
//! # Module Organization
//!
//! - [`geometry`]: Axis-aligned boxes in top-left page coordinates
//! - [`config`]: Tunable parameters and their validation
//! - [`normalize`]: Cleans and orders raw word records
//! - [`lines`]: Groups words into visual lines
//! - [`spacing`]: Rebuilds line text with proportional spacing
//! - [`redaction`]: Picks redaction bars out of the drawn shapes
//! - [`overlap`]: Classifies words as hidden or visible
//! - [`stats`]: Recovery counters and the summary report
//! - [`pipeline`]: Runs all of the above per page and merges the pages
//!
//! # Example Usage
//!
//! ```rust
//! use unredact_core::{analyze_document, BBox, Fill, LayoutConfig, PageGeometry, RawShape, RawWord};
//!
//! let page = PageGeometry {
//!     page_index: 0,
//!     width: 612.0,
//!     height: 792.0,
//!     words: vec![
//!         RawWord::new("Alice", BBox::new(10.0, 100.0, 40.0, 110.0), 0),
//!         RawWord::new("Bob", BBox::new(52.0, 100.0, 70.0, 110.0), 0),
//!     ],
//!     shapes: vec![RawShape::drawing(
//!         BBox::new(50.0, 98.0, 75.0, 112.0),
//!         0,
//!         Fill::Gray(0.0),
//!     )],
//! };
//!
//! let analysis = analyze_document(vec![Ok(page)], &LayoutConfig::default()).unwrap();
//! assert_eq!(analysis.stats.boxes_found, 1);
//! assert_eq!(analysis.stats.words_recovered, 1);
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod lines;
pub mod normalize;
pub mod overlap;
pub mod pipeline;
pub mod redaction;
pub mod spacing;
pub mod stats;

pub use config::{BaselinePolicy, LayoutConfig};
pub use error::{ConfigError, PageFailure};
pub use geometry::BBox;
pub use lines::{group_words_into_lines, Line};
pub use normalize::{normalize_words, RawWord, Word};
pub use overlap::{analyze_overlaps, BoxLookup, OverlapResult};
pub use pipeline::{analyze_document, analyze_page, DocumentAnalysis, PageAnalysis, PageGeometry};
pub use redaction::{detect_redaction_boxes, BoxId, Fill, RawShape, RedactionBox, ShapeOrigin};
pub use spacing::{rebuild_line, rebuild_lines, RebuiltLine};
pub use stats::{aggregate, StatsReport};
