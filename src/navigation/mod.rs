//! Navigation outcome resolution.
//!
//! A logical outcome produced by a UI action is mapped to a concrete
//! destination by exactly one registered [`NavigationOutcomeResolver`].

mod chain;
mod error;
mod implicit;
mod mapped;
mod outcome;

pub use chain::{NavigationOutcomeResolver, NavigationOutcomeResolverChain};
pub use error::NavigationError;
pub use implicit::{ImplicitNavigationOutcomeResolver, DEFAULT_IMPLICIT_PREFIX};
pub use mapped::{MappedNavigationOutcomeResolver, NavigationMapping};
pub use outcome::{NavigationContext, NavigationOutcome};
