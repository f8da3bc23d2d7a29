//! Platform error types

use thiserror::Error;

/// Errors reported by host-provided capabilities
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The native keyboard could not be hidden or disabled for a field
    #[error("Native keyboard suppression failed: {0}")]
    SuppressionFailed(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
