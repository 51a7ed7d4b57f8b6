//! Error types for the scene optimizer

use thiserror::Error;

/// Main error type for the crate
///
/// Only configuration IO and explicit resource construction surface errors.
/// The per-frame path logs and falls back instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Missing resource: {0}")]
    MissingResource(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}
