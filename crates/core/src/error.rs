use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A tunable parameter is outside its documented range, or the configuration
/// document could not be read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: `{parameter}` = {value} (expected {expected})")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("invalid configuration: `{parameter}` = {value} (expected {expected})")]
    InvalidValue {
        parameter: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("invalid configuration file: {0}")]
    Parse(String),
}

/// The word or shape source could not provide geometry for one page.
///
/// This is a recovered condition: the page is reported as skipped and the
/// rest of the document is still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("page {page_index} skipped: {reason}")]
pub struct PageFailure {
    pub page_index: usize,
    pub reason: String,
}

impl PageFailure {
    pub fn new(page_index: usize, reason: impl Into<String>) -> Self {
        PageFailure {
            page_index,
            reason: reason.into(),
        }
    }
}
