//! HTTP status mapping and error responses for pipeline failures.
//!
//! Configuration defects surface as 500, rejected view state as 400 and
//! unresolvable destinations as 404.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::navigation::NavigationError;
use crate::pipeline::PipelineError;
use crate::state::ViewStateError;
use crate::url::UrlError;
use crate::view::ViewError;

impl PipelineError {
    /// Map error variant to appropriate HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Navigation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::View(ViewError::InvalidDestination { .. }) => StatusCode::BAD_REQUEST,
            PipelineError::Url(UrlError::ExternalTarget { .. }) => StatusCode::BAD_REQUEST,
            PipelineError::Url(UrlError::MissingTemplateVariable { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PipelineError::ViewState(ViewStateError::Tampered) => StatusCode::BAD_REQUEST,
            PipelineError::ViewState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::DestinationUnresolved { .. } => StatusCode::NOT_FOUND,
            PipelineError::NotRenderable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::NotBookmarkable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::NoCurrentView => StatusCode::BAD_REQUEST,
        }
    }

    /// Get error type string for JSON responses
    pub fn error_type(&self) -> &'static str {
        match self {
            PipelineError::Navigation(NavigationError::ResolutionAmbiguous { .. }) => {
                "resolution_ambiguous"
            }
            PipelineError::Navigation(NavigationError::ResolutionMissing { .. }) => {
                "resolution_missing"
            }
            PipelineError::Navigation(NavigationError::MissingDestinationText { .. }) => {
                "missing_destination_text"
            }
            PipelineError::View(ViewError::InvalidDestination { .. }) => "invalid_destination",
            PipelineError::Url(UrlError::MissingTemplateVariable { .. }) => {
                "missing_template_variable"
            }
            PipelineError::Url(UrlError::ExternalTarget { .. }) => "external_target",
            PipelineError::ViewState(ViewStateError::Tampered) => "view_state_tampered",
            PipelineError::ViewState(_) => "view_state_error",
            PipelineError::DestinationUnresolved { .. } => "destination_unresolved",
            PipelineError::NotRenderable { .. } => "not_renderable",
            PipelineError::NotBookmarkable { .. } => "not_bookmarkable",
            PipelineError::NoCurrentView => "no_current_view",
        }
    }
}

/// Builder for standardized error responses
pub struct ErrorResponse;

impl ErrorResponse {
    /// Create a JSON error response from a PipelineError
    pub fn from_error(err: &PipelineError, request_id: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "type": err.error_type(),
                "message": err.to_string(),
                "request_id": request_id
            }
        });

        (
            err.status_code(),
            [(header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
