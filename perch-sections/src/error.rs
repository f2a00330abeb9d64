use std::io;

use thiserror::Error;

/// Errors produced by section storage backends.
#[derive(Debug, Error)]
pub enum SectionsError {
    #[error("sections IO failed: {0}")]
    Io(#[from] io::Error),

    #[error("sections JSON failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sections storage unavailable: {0}")]
    Unavailable(String),
}

/// Returned when a string does not name one of the three sections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section name `{0}`")]
pub struct ParseSectionNameError(pub String);
