//! Error taxonomy for registry operations.
//!
//! Every core operation either returns a value or fails with exactly one
//! [`RegistryError`] kind. Backend and signer failures are mapped into the
//! taxonomy before they cross the service boundary, so callers never see
//! transport or storage detail.

use pcr_types::TextError;

/// Failures surfaced by the underlying data store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
    #[error("failed to read seed data: {0}")]
    SeedRead(#[source] std::io::Error),
    #[error("failed to parse seed data: {0}")]
    SeedParse(#[source] serde_json::Error),
}

/// The single error type returned by every core service operation.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Malformed or out-of-enum input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The signing step was declined, unavailable, or timed out.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// A status transition was attempted from a state that does not permit it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The underlying persistence layer failed; retryable by the caller.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl RegistryError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<TextError> for RegistryError {
    fn from(err: TextError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
