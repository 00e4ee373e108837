//! HTTP handlers exposing the navigation pipeline.
//!
//! Session identity travels in the [`SESSION_COOKIE`] cookie. A request
//! without one is given a fresh session.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::context::RequestContext;
use crate::model::Model;
use crate::navigation::NavigationContext;
use crate::pipeline::{Navigation, NavigationPipeline, PipelineError, RenderedView};
use crate::server::error::ErrorResponse;
use crate::state::SessionId;

pub const SESSION_COOKIE: &str = "NAVBRIDGE_SESSION";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<NavigationPipeline>,
    context_path: String,
}

impl AppState {
    pub fn new(pipeline: Arc<NavigationPipeline>, context_path: impl Into<String>) -> Self {
        Self {
            pipeline,
            context_path: context_path.into(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/render/{*destination}", get(render_destination))
        .route("/postback", post(postback))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        service: "navbridge",
    })
}

/// Render a destination directly. Query parameters form the model.
async fn render_destination(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(destination): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let (session, issued) = session_from(&headers);
    let context = RequestContext::new(session.clone(), state.context_path.clone());
    let request_id = context.request_id().to_string();

    let model: Model = query
        .into_iter()
        .map(|(name, value)| (name, serde_json::Value::String(value)))
        .collect();
    let model = (!model.is_empty()).then_some(model);

    let result = state
        .pipeline
        .handle_destination(context, &destination, model.as_ref());
    respond(&state, result, &request_id, &session, issued)
}

/// Handle a form postback carrying an outcome and the view state field.
async fn postback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let (session, issued) = session_from(&headers);
    let context = RequestContext::new(session.clone(), state.context_path.clone());
    let request_id = context.request_id().to_string();

    let navigation = navigation_from(&form);
    let result = state
        .pipeline
        .handle_postback(context, navigation.as_ref(), &form);
    respond(&state, result, &request_id, &session, issued)
}

/// End the session: its key is dropped, so every token it was issued stops
/// validating, and the cookie is cleared.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, issued) = session_from(&headers);
    if !issued {
        let ended = state.pipeline.view_state().keys().invalidate(&session);
        tracing::info!(session = %session, ended, "Session ended");
    }
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
}

fn navigation_from(form: &HashMap<String, String>) -> Option<NavigationContext> {
    let outcome = form.get("outcome").filter(|o| !o.is_empty())?;
    let mut navigation = NavigationContext::new(outcome.clone());
    if let Some(destination) = form.get("default_destination").filter(|d| !d.is_empty()) {
        navigation = navigation.with_default_destination(destination.clone());
    }
    if let Some(action) = form.get("from_action").filter(|a| !a.is_empty()) {
        navigation = navigation.with_from_action(action.clone());
    }
    if let Some(component) = form.get("component_id").filter(|c| !c.is_empty()) {
        navigation = navigation.with_component_id(component.clone());
    }
    if form.get("preemptive").is_some_and(|p| p == "true") {
        navigation = navigation.preemptive();
    }
    Some(navigation)
}

/// Session from the cookie header, or a new one. The flag is set for new
/// sessions.
fn session_from(headers: &HeaderMap) -> (SessionId, bool) {
    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| SessionId::new(value));

    match existing {
        Some(session) => (session, false),
        None => (SessionId::generate(), true),
    }
}

fn respond(
    state: &AppState,
    result: Result<Navigation, PipelineError>,
    request_id: &str,
    session: &SessionId,
    issued: bool,
) -> Response {
    let mut response = match result {
        Ok(Navigation::Redirect { url }) => {
            (StatusCode::SEE_OTHER, [(header::LOCATION, url)]).into_response()
        }
        Ok(Navigation::Render(view)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            render_page(&state.context_path, &view),
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(request_id = %request_id, error = %err, "Request failed");
            ErrorResponse::from_error(&err, request_id)
        }
    };

    if issued {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, session
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn render_page(context_path: &str, view: &RenderedView) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html><body data-view=\"{}\">\n",
            "<form method=\"post\" action=\"{}/postback\">\n",
            "{}\n",
            "</form>\n",
            "</body></html>\n"
        ),
        escape_html(view.artifact.as_str()),
        escape_html(context_path),
        view.hidden_field
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
