//! Error types for the view state protocol.

use thiserror::Error;

/// Errors raised while writing or reading view state.
#[derive(Debug, Error)]
pub enum ViewStateError {
    /// The token failed authentication under this session's key
    #[error("Unable to decrypt input value")]
    Tampered,

    /// The render artifact could not be serialized
    #[error("Unable to encode view state: {0}")]
    Encode(#[from] serde_json::Error),

    /// The cipher refused to seal the payload
    #[error("Unable to encrypt view state")]
    Encrypt,
}
