//! Error types for destination resolution.

use thiserror::Error;

/// Errors raised by destination resolvers and views.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// The destination cannot name a view
    #[error("Invalid destination '{destination}': {reason}")]
    InvalidDestination { destination: String, reason: String },
}
