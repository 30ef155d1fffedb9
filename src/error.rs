use thiserror::Error;

/// KAZE error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "Image shape mismatch: expected {expected_width}x{expected_height}, got {actual_width}x{actual_height}"
    )]
    ImageShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
