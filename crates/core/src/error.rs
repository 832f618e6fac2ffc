//! Error types for the cleaning pipeline

use crate::validation::ValidationError;
use thiserror::Error;

/// Core pipeline errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Format error: {0}")]
    Format(#[from] cleanset_formats::Error),

    #[error("Filter error: {0}")]
    Filter(#[from] cleanset_filters::Error),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
