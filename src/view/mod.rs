//! Destination resolution and the views it produces.
//!
//! Destinations are resolved by a first-match chain of
//! [`DestinationViewResolver`]s; later members act as fallbacks for earlier
//! ones.

mod artifact;
mod chain;
mod error;
mod resolvers;
mod views;

pub use artifact::ViewArtifact;
pub use chain::{DestinationViewResolver, DestinationViewResolverChain};
pub use error::ViewError;
pub use resolvers::{
    NamedDestinationViewResolver, RedirectDestinationViewResolver, TemplateDestinationViewResolver,
    DEFAULT_REDIRECT_PREFIX, DEFAULT_TEMPLATE_PREFIX, DEFAULT_TEMPLATE_SUFFIX,
};
pub use views::{BookmarkableView, TemplateView, View};
