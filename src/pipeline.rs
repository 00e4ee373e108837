//! Per-request navigation pipeline.
//!
//! ```text
//! enter scope → read view state → resolve outcome → resolve destination
//!             → Redirect (bookmarkable) | Render (new view state token)
//! ```
//!
//! View state is validated before any resolution happens, so a tampered
//! postback never reaches the resolvers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::context::{ActiveRequests, RequestContext, RequestScope};
use crate::model::Model;
use crate::navigation::{
    ImplicitNavigationOutcomeResolver, MappedNavigationOutcomeResolver, NavigationContext,
    NavigationError, NavigationOutcomeResolver, NavigationOutcomeResolverChain,
};
use crate::state::{
    RenderArtifact, RequestParameters, SessionKeyStore, ViewStateError, ViewStateProtocol,
};
use crate::url::{BookmarkableUrlBuilder, UrlError};
use crate::view::{
    DestinationViewResolver, DestinationViewResolverChain, NamedDestinationViewResolver,
    RedirectDestinationViewResolver, TemplateDestinationViewResolver, TemplateView, ViewArtifact,
    ViewError,
};

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error(transparent)]
    ViewState(#[from] ViewStateError),

    /// No destination resolver handled the destination
    #[error("No view found for destination '{destination}'")]
    DestinationUnresolved { destination: String },

    /// The resolved view can neither be rendered nor bookmarked
    #[error("View for destination '{destination}' has no template and no URL")]
    NotRenderable { destination: String },

    /// A preemptive navigation reached a view with no bookmarkable URL
    #[error("Destination '{destination}' cannot be linked: view is not bookmarkable")]
    NotBookmarkable { destination: String },

    /// A postback without navigation that carried no view state
    #[error("No current view to render")]
    NoCurrentView,
}

/// A view ready to be rendered, with its freshly written view state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub artifact: ViewArtifact,
    pub model: Option<Model>,
    /// View state token for the next postback.
    pub token: String,
    /// Hidden form field markup carrying `token`.
    pub hidden_field: String,
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Send the client to a literal, bookmarkable URL.
    Redirect { url: String },
    /// Render a view.
    Render(RenderedView),
}

/// Wires the resolution chains, URL builder and view state protocol into the
/// per-request control flow. Immutable after construction and shared
/// between requests.
#[derive(Clone)]
pub struct NavigationPipeline {
    outcomes: NavigationOutcomeResolverChain,
    destinations: DestinationViewResolverChain,
    url_builder: BookmarkableUrlBuilder,
    view_state: ViewStateProtocol,
    active: ActiveRequests,
}

impl NavigationPipeline {
    pub fn new(
        outcomes: NavigationOutcomeResolverChain,
        destinations: DestinationViewResolverChain,
        url_builder: BookmarkableUrlBuilder,
        view_state: ViewStateProtocol,
    ) -> Self {
        Self {
            outcomes,
            destinations,
            url_builder,
            view_state,
            active: ActiveRequests::new(),
        }
    }

    /// Build the standard resolver chains from configuration.
    ///
    /// Outcomes: implicit prefix, then the mapping table.
    /// Destinations: redirect prefix, named views, then the template fallback.
    pub fn from_config(config: &Config, keys: Arc<SessionKeyStore>) -> Self {
        let outcomes = NavigationOutcomeResolverChain::new(vec![
            Arc::new(ImplicitNavigationOutcomeResolver::with_prefix(
                config.navigation.implicit_prefix.clone(),
            )) as Arc<dyn NavigationOutcomeResolver>,
            Arc::new(MappedNavigationOutcomeResolver::new(
                config.navigation.mappings.clone(),
            )),
        ]);

        let named = config
            .views
            .named
            .iter()
            .fold(NamedDestinationViewResolver::new(), |named, view| {
                named.register(
                    view.name.clone(),
                    Arc::new(TemplateView::new(view.template.clone())),
                )
            });
        let destinations = DestinationViewResolverChain::new(vec![
            Arc::new(RedirectDestinationViewResolver::new(
                config.views.redirect_prefix.clone(),
            )) as Arc<dyn DestinationViewResolver>,
            Arc::new(named),
            Arc::new(TemplateDestinationViewResolver::new(
                config.views.template_prefix.clone(),
                config.views.template_suffix.clone(),
            )),
        ]);

        tracing::info!(
            outcome_resolvers = outcomes.len(),
            destination_resolvers = destinations.len(),
            mappings = config.navigation.mappings.len(),
            "Navigation pipeline configured"
        );

        Self::new(
            outcomes,
            destinations,
            BookmarkableUrlBuilder::with_encoding(config.urls.encoding),
            ViewStateProtocol::new(keys),
        )
    }

    pub fn view_state(&self) -> &ViewStateProtocol {
        &self.view_state
    }

    pub fn url_builder(&self) -> &BookmarkableUrlBuilder {
        &self.url_builder
    }

    pub fn active_requests(&self) -> &ActiveRequests {
        &self.active
    }

    /// Handle a postback.
    ///
    /// The posted view state is validated first. When `navigation` names an
    /// outcome that a resolver claims, the client moves to its destination;
    /// otherwise the restored view is rendered again. A preemptive
    /// navigation only ever answers with a bookmarkable URL.
    pub fn handle_postback(
        &self,
        context: RequestContext,
        navigation: Option<&NavigationContext>,
        params: &impl RequestParameters,
    ) -> Result<Navigation, PipelineError> {
        let scope = self.active.enter(context);
        let restored = self.view_state.read(scope.session(), params)?;

        if let Some(navigation) = navigation {
            if self.outcomes.can_resolve(navigation)? {
                let outcome = self.outcomes.resolve(navigation)?;
                return self.navigate_to(
                    &scope,
                    outcome.destination(),
                    outcome.implicit_model(),
                    navigation.is_preemptive(),
                );
            }
            tracing::debug!(
                request_id = %scope.request_id(),
                outcome = %navigation.outcome(),
                "No navigation for outcome, staying on current view"
            );
        }

        let Some(restored) = restored else {
            return Err(PipelineError::NoCurrentView);
        };
        self.render(&scope, restored, None)
    }

    /// Resolve `destination` directly, without a navigation outcome.
    pub fn handle_destination(
        &self,
        context: RequestContext,
        destination: &str,
        model: Option<&Model>,
    ) -> Result<Navigation, PipelineError> {
        let scope = self.active.enter(context);
        self.navigate_to(&scope, destination, model, false)
    }

    fn navigate_to(
        &self,
        scope: &RequestScope,
        destination: &str,
        model: Option<&Model>,
        preemptive: bool,
    ) -> Result<Navigation, PipelineError> {
        let view = self
            .destinations
            .resolve_destination(destination, scope.locale())?
            .ok_or_else(|| PipelineError::DestinationUnresolved {
                destination: destination.to_string(),
            })?;

        if let Some(url) = view.bookmark_url(model, scope.context_path(), &self.url_builder)? {
            tracing::info!(
                request_id = %scope.request_id(),
                destination = %destination,
                url = %url,
                "Redirecting to bookmarkable URL"
            );
            return Ok(Navigation::Redirect { url });
        }
        if preemptive {
            return Err(PipelineError::NotBookmarkable {
                destination: destination.to_string(),
            });
        }

        let Some(artifact) = view.artifact() else {
            return Err(PipelineError::NotRenderable {
                destination: destination.to_string(),
            });
        };
        self.render(scope, RenderArtifact::new(artifact.clone()), model.cloned())
    }

    fn render(
        &self,
        scope: &RequestScope,
        render: RenderArtifact,
        model: Option<Model>,
    ) -> Result<Navigation, PipelineError> {
        let token = self.view_state.write(scope.session(), &render)?;
        let hidden_field = self.view_state.hidden_field(&token);
        tracing::info!(
            request_id = %scope.request_id(),
            artifact = %render.artifact,
            "Rendering view"
        );
        Ok(Navigation::Render(RenderedView {
            artifact: render.artifact,
            model,
            token,
            hidden_field,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationMapping;
    use crate::state::{SessionId, VIEW_STATE_FIELD};
    use serde_json::json;
    use std::collections::HashMap;

    fn pipeline() -> NavigationPipeline {
        let mut config = Config::default();
        config.server.context_path = "/app".to_string();
        let mut mapping = NavigationMapping::new("show", "redirect:/hotels/{id}");
        let mut model = Model::new();
        model.insert("id".to_string(), json!(12));
        model.insert("tab".to_string(), json!("rooms"));
        mapping.model = Some(model);
        config.navigation.mappings.push(mapping);
        NavigationPipeline::from_config(&config, Arc::new(SessionKeyStore::new()))
    }

    fn context(session: &str) -> RequestContext {
        RequestContext::new(SessionId::new(session), "/app")
    }

    fn rendered(navigation: Navigation) -> RenderedView {
        match navigation {
            Navigation::Render(view) => view,
            other => panic!("expected render, got {:?}", other),
        }
    }

    fn posted(token: &str) -> HashMap<String, String> {
        HashMap::from([(VIEW_STATE_FIELD.to_string(), token.to_string())])
    }

    #[test]
    fn test_destination_renders_template_with_token() {
        let pipeline = pipeline();
        let view = rendered(
            pipeline
                .handle_destination(context("s1"), "hotels/list", None)
                .unwrap(),
        );
        assert_eq!(view.artifact.as_str(), "/WEB-INF/views/hotels/list.xhtml");
        assert!(view.hidden_field.contains(&view.token));
    }

    #[test]
    fn test_implicit_outcome_navigates() {
        let pipeline = pipeline();
        let nav = NavigationContext::new("mvc:search");
        let view = rendered(
            pipeline
                .handle_postback(context("s1"), Some(&nav), &HashMap::new())
                .unwrap(),
        );
        assert_eq!(view.artifact.as_str(), "/WEB-INF/views/search.xhtml");
    }

    #[test]
    fn test_mapped_outcome_redirects_with_implicit_model() {
        let pipeline = pipeline();
        let nav = NavigationContext::new("show");
        let navigation = pipeline
            .handle_postback(context("s1"), Some(&nav), &HashMap::new())
            .unwrap();
        assert_eq!(
            navigation,
            Navigation::Redirect {
                url: "/app/hotels/12?tab=rooms".to_string()
            }
        );
    }

    #[test]
    fn test_unclaimed_outcome_rerenders_restored_view() {
        let pipeline = pipeline();
        let first = rendered(
            pipeline
                .handle_destination(context("s1"), "hotels/list", None)
                .unwrap(),
        );

        let nav = NavigationContext::new("refresh");
        let again = rendered(
            pipeline
                .handle_postback(context("s1"), Some(&nav), &posted(&first.token))
                .unwrap(),
        );
        assert_eq!(again.artifact, first.artifact);
        assert_ne!(again.token, first.token);
    }

    #[test]
    fn test_postback_without_state_or_outcome() {
        let pipeline = pipeline();
        let err = pipeline
            .handle_postback(context("s1"), None, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoCurrentView));
    }

    #[test]
    fn test_tampered_state_stops_before_resolution() {
        let pipeline = pipeline();
        let nav = NavigationContext::new("mvc:search");
        let err = pipeline
            .handle_postback(context("s1"), Some(&nav), &posted("garbage"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::ViewState(ViewStateError::Tampered)));
    }

    #[test]
    fn test_foreign_session_token_is_rejected() {
        let pipeline = pipeline();
        let first = rendered(
            pipeline
                .handle_destination(context("owner"), "hotels/list", None)
                .unwrap(),
        );
        let err = pipeline
            .handle_postback(context("intruder"), None, &posted(&first.token))
            .unwrap_err();
        assert!(matches!(err, PipelineError::ViewState(ViewStateError::Tampered)));
    }

    #[test]
    fn test_missing_destination_text_is_reported() {
        let pipeline = pipeline();
        let nav = NavigationContext::new("mvc:");
        let err = pipeline
            .handle_postback(context("s1"), Some(&nav), &HashMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Navigation(NavigationError::MissingDestinationText { .. })
        ));
    }

    #[test]
    fn test_unresolved_destination() {
        let pipeline = NavigationPipeline::new(
            NavigationOutcomeResolverChain::default(),
            DestinationViewResolverChain::default(),
            BookmarkableUrlBuilder::new(),
            ViewStateProtocol::new(Arc::new(SessionKeyStore::new())),
        );
        let err = pipeline
            .handle_destination(context("s1"), "anything", None)
            .unwrap_err();
        assert!(matches!(err, PipelineError::DestinationUnresolved { destination } if destination == "anything"));
    }

    #[test]
    fn test_scope_released_after_success_and_failure() {
        let pipeline = pipeline();
        pipeline
            .handle_destination(context("s1"), "hotels/list", None)
            .unwrap();
        assert!(pipeline.active_requests().is_empty());

        let _ = pipeline.handle_postback(context("s1"), None, &posted("garbage"));
        assert!(pipeline.active_requests().is_empty());

        let _ = pipeline.handle_destination(context("s1"), "redirect:/h/{missing}", None);
        assert!(pipeline.active_requests().is_empty());
    }

    #[test]
    fn test_preemptive_navigation_requires_bookmarkable_view() {
        let pipeline = pipeline();

        let link = NavigationContext::new("show").preemptive();
        let navigation = pipeline
            .handle_postback(context("s1"), Some(&link), &HashMap::new())
            .unwrap();
        assert!(matches!(navigation, Navigation::Redirect { .. }));

        let template = NavigationContext::new("mvc:search").preemptive();
        let err = pipeline
            .handle_postback(context("s1"), Some(&template), &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotBookmarkable { destination } if destination == "search"));
        assert!(pipeline.view_state().keys().is_empty());
    }

    #[test]
    fn test_redirect_destination_cannot_leave_application() {
        let pipeline = pipeline();
        for destination in ["redirect:https://evil.example/phish", "redirect://evil.example/x"] {
            let err = pipeline
                .handle_destination(context("s1"), destination, None)
                .unwrap_err();
            assert!(matches!(
                err,
                PipelineError::View(ViewError::InvalidDestination { .. })
            ));
        }

        let mut model = Model::new();
        model.insert("id".to_string(), json!("/evil.example"));
        let err = NavigationPipeline::from_config(&Config::default(), Arc::new(SessionKeyStore::new()))
            .handle_destination(context("s1"), "redirect:/{id}", Some(&model))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Url(UrlError::ExternalTarget { .. })));
    }
}
