//! Error types for navigation outcome resolution.

use thiserror::Error;

/// Errors raised while resolving a navigation outcome.
///
/// All variants indicate a configuration or programming defect rather than a
/// per-request condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    /// More than one resolver claims the outcome
    #[error("Ambiguous navigation outcome '{outcome}': {count} resolvers can handle it")]
    ResolutionAmbiguous { outcome: String, count: usize },

    /// `resolve` called although no resolver claims the outcome
    #[error("Unable to resolve navigation outcome '{outcome}'")]
    ResolutionMissing { outcome: String },

    /// An implicit navigation prefix matched but nothing followed it
    #[error("The destination must be specified for an implicit navigation prefixed '{prefix}'")]
    MissingDestinationText { prefix: String },
}
