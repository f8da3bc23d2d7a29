//! Error types for the overlay controller
//!
//! The public controller API never surfaces these; they are logged and
//! absorbed at the boundary. Internal helpers propagate them with `?`.

use std::path::PathBuf;

use safekey_platform::{FieldId, PlatformError};
use thiserror::Error;

/// Overlay controller errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Field was bound a second time; the newer binding wins
    #[error("{0} is already bound")]
    AlreadyBound(FieldId),

    /// Field is not bound to this controller
    #[error("{0} is not bound")]
    UnknownField(FieldId),

    /// Field is taller than the space left above the overlay
    #[error("{0} cannot fit above the overlay")]
    CannotFit(FieldId),

    /// Native keyboard could not be suppressed
    #[error("failed to suppress native input for {field}")]
    Suppression {
        field: FieldId,
        #[source]
        source: PlatformError,
    },

    /// Key code not on any layout
    #[error("unknown key code {0}")]
    UnknownKey(i32),

    /// Controller was released
    #[error("controller has been released")]
    Released,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("invalid overlay config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;
