use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Failed to decode signature image: {0}")]
    DecodeError(String),

    #[error("Compositing failed: {0}")]
    CompositingError(String),
}
