#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Input path has no file name: {0}")]
    NoFileName(String),

    #[error("No pages could be read from {0}")]
    NoPages(String),
}
