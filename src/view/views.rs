use std::fmt;

use super::artifact::ViewArtifact;
use crate::model::Model;
use crate::url::{is_external_url, BookmarkableUrlBuilder, UrlError};

/// A resolved destination.
///
/// Template views are rendered and carry a [`ViewArtifact`]; bookmarkable
/// views are answered with a literal URL instead.
pub trait View: fmt::Debug + Send + Sync {
    /// Template rendered by this view, if any.
    fn artifact(&self) -> Option<&ViewArtifact>;

    /// Literal URL for this view when it can be bookmarked.
    ///
    /// Default implementation returns `None`.
    fn bookmark_url(
        &self,
        _model: Option<&Model>,
        _context_path: &str,
        _builder: &BookmarkableUrlBuilder,
    ) -> Result<Option<String>, UrlError> {
        Ok(None)
    }
}

/// View backed by a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateView {
    artifact: ViewArtifact,
}

impl TemplateView {
    pub fn new(artifact: impl Into<ViewArtifact>) -> Self {
        Self {
            artifact: artifact.into(),
        }
    }
}

impl View for TemplateView {
    fn artifact(&self) -> Option<&ViewArtifact> {
        Some(&self.artifact)
    }
}

/// View answered with a literal URL built from a template and the model.
///
/// Context relative views never answer with a URL on another origin, even
/// when a model value substitutes one into the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkableView {
    url_template: String,
    context_relative: bool,
}

impl BookmarkableView {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            context_relative: true,
        }
    }

    pub fn absolute(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            context_relative: false,
        }
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn is_context_relative(&self) -> bool {
        self.context_relative
    }
}

impl View for BookmarkableView {
    fn artifact(&self) -> Option<&ViewArtifact> {
        None
    }

    fn bookmark_url(
        &self,
        model: Option<&Model>,
        context_path: &str,
        builder: &BookmarkableUrlBuilder,
    ) -> Result<Option<String>, UrlError> {
        let url = builder.build(&self.url_template, model, context_path, self.context_relative)?;
        if self.context_relative && is_external_url(&url) {
            return Err(UrlError::ExternalTarget { url });
        }
        Ok(Some(url))
    }
}
