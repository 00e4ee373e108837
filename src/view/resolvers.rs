//! Built-in destination resolvers.

use std::collections::HashMap;
use std::sync::Arc;

use super::chain::DestinationViewResolver;
use super::error::ViewError;
use super::views::{BookmarkableView, TemplateView, View};
use crate::url::is_external_url;

pub const DEFAULT_REDIRECT_PREFIX: &str = "redirect:";
pub const DEFAULT_TEMPLATE_PREFIX: &str = "/WEB-INF/views/";
pub const DEFAULT_TEMPLATE_SUFFIX: &str = ".xhtml";

/// Turns `redirect:/hotels/{id}` into a context relative [`BookmarkableView`].
///
/// Targets on another origin (`redirect:https://...`, `redirect://host`) are
/// rejected.
#[derive(Debug, Clone)]
pub struct RedirectDestinationViewResolver {
    prefix: String,
}

impl Default for RedirectDestinationViewResolver {
    fn default() -> Self {
        Self::new(DEFAULT_REDIRECT_PREFIX)
    }
}

impl RedirectDestinationViewResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl DestinationViewResolver for RedirectDestinationViewResolver {
    fn resolve_destination(
        &self,
        destination: &str,
        _locale: &str,
    ) -> Result<Option<Arc<dyn View>>, ViewError> {
        let Some(url) = destination.strip_prefix(self.prefix.as_str()) else {
            return Ok(None);
        };
        let url = url.trim();
        if url.is_empty() {
            return Err(ViewError::InvalidDestination {
                destination: destination.to_string(),
                reason: "redirect URL is empty".to_string(),
            });
        }
        if is_external_url(url) {
            return Err(ViewError::InvalidDestination {
                destination: destination.to_string(),
                reason: "redirect URL must stay within the application".to_string(),
            });
        }
        Ok(Some(Arc::new(BookmarkableView::new(url))))
    }
}

/// Explicit name → view registry.
#[derive(Debug, Clone, Default)]
pub struct NamedDestinationViewResolver {
    views: HashMap<String, Arc<dyn View>>,
}

impl NamedDestinationViewResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, view: Arc<dyn View>) -> Self {
        self.views.insert(name.into(), view);
        self
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl DestinationViewResolver for NamedDestinationViewResolver {
    fn resolve_destination(
        &self,
        destination: &str,
        _locale: &str,
    ) -> Result<Option<Arc<dyn View>>, ViewError> {
        Ok(self.views.get(destination).cloned())
    }
}

/// Fallback resolver mapping any destination onto a template path.
///
/// `hotels/list` becomes `/WEB-INF/views/hotels/list.xhtml` with the default
/// prefix and suffix. Place it last in the chain.
#[derive(Debug, Clone)]
pub struct TemplateDestinationViewResolver {
    prefix: String,
    suffix: String,
}

impl Default for TemplateDestinationViewResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_PREFIX, DEFAULT_TEMPLATE_SUFFIX)
    }
}

impl TemplateDestinationViewResolver {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    fn template_path(&self, destination: &str) -> String {
        let name = if self.prefix.ends_with('/') {
            destination.trim_start_matches('/')
        } else {
            destination
        };
        format!("{}{}{}", self.prefix, name, self.suffix)
    }
}

impl DestinationViewResolver for TemplateDestinationViewResolver {
    fn resolve_destination(
        &self,
        destination: &str,
        _locale: &str,
    ) -> Result<Option<Arc<dyn View>>, ViewError> {
        if destination.trim().is_empty() {
            return Ok(None);
        }
        if destination.split('/').any(|segment| segment == "..") {
            return Err(ViewError::InvalidDestination {
                destination: destination.to_string(),
                reason: "parent directory segments are not allowed".to_string(),
            });
        }
        Ok(Some(Arc::new(TemplateView::new(self.template_path(destination)))))
    }
}
