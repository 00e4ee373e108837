//! First-match destination resolver chain.

use std::sync::Arc;

use super::error::ViewError;
use super::views::View;

/// Resolves a destination identifier to a view. Resolvers are evaluated in
/// order; first match wins.
pub trait DestinationViewResolver: Send + Sync {
    /// Returns `Ok(None)` when this resolver does not handle the destination.
    fn resolve_destination(
        &self,
        destination: &str,
        locale: &str,
    ) -> Result<Option<Arc<dyn View>>, ViewError>;
}

/// Ordered list of destination resolvers.
///
/// Several members may be capable of handling the same destination; the
/// earliest one wins and later members are not consulted.
#[derive(Clone, Default)]
pub struct DestinationViewResolverChain {
    resolvers: Vec<Arc<dyn DestinationViewResolver>>,
}

impl DestinationViewResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn DestinationViewResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl DestinationViewResolver for DestinationViewResolverChain {
    fn resolve_destination(
        &self,
        destination: &str,
        locale: &str,
    ) -> Result<Option<Arc<dyn View>>, ViewError> {
        for resolver in &self.resolvers {
            if let Some(view) = resolver.resolve_destination(destination, locale)? {
                tracing::debug!(destination = %destination, view = ?view, "Resolved destination");
                return Ok(Some(view));
            }
        }
        tracing::debug!(destination = %destination, "No resolver handled destination");
        Ok(None)
    }
}
