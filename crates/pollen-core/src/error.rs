//! Unified error type exposed by **`pollen-core`**.
//!
//! Provider crates should convert their internal errors into one of these
//! variants before bubbling them up to the [`crate::PollenClient`].

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PollenError>;

#[derive(Debug, Error)]
pub enum PollenError {
    /// Failure while serialising or deserialising JSON payloads sent to / received
    /// from the LLM provider.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic forwarding of any backend-specific error that doesn’t fit another
    /// category.
    #[error("backend returned an error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid: {0}")]
    Invalid(String),
}

impl PollenError {
    /// Borrow the backend error, if any, as a concrete type.
    ///
    /// ```rust
    /// use pollen_core::error::PollenError;
    ///
    /// let err = PollenError::Backend(Box::new(std::fmt::Error));
    /// assert!(err.backend_error::<std::fmt::Error>().is_some());
    /// ```
    pub fn backend_error<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            PollenError::Backend(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}
