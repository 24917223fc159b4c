//! # Error Types
//!
//! Custom error types for Stick Cal using `thiserror`.

use thiserror::Error;

/// Main error type for Stick Cal
#[derive(Debug, Error)]
pub enum CalError {
    /// Non-volatile storage faults (erase/write/read failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Erase or write attempted while the flash page is locked
    #[error("Flash page is locked")]
    FlashLocked,

    /// Persisted record does not fit into the backing page
    #[error("Record of {len} bytes does not fit into a {capacity} byte flash page")]
    RecordTooLarge { len: usize, capacity: usize },

    /// Controller device errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// No usable controller device was found
    #[error("No compatible controller found")]
    ControllerNotFound,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Stick Cal
pub type Result<T> = std::result::Result<T, CalError>;
