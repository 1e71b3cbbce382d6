//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Numeric sample kind that does not map to any known probe.
    #[error("invalid sample kind: {0}")]
    InvalidSampleKind(u32),
}
