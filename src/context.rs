//! Request-scoped navigation context.
//!
//! Each request owns an explicit [`RequestContext`] that is passed by
//! reference to everything that needs it. [`ActiveRequests::enter`] registers
//! the context and hands back a [`RequestScope`] guard which releases it when
//! dropped, on success, error and unwinding alike.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::state::SessionId;

pub const DEFAULT_LOCALE: &str = "en";

/// Everything the pipeline needs to know about the request being handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: String,
    session: SessionId,
    context_path: String,
    locale: String,
}

impl RequestContext {
    pub fn new(session: SessionId, context_path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            session,
            context_path: context_path.into(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }
}

/// Registry of requests currently being handled.
#[derive(Debug, Clone, Default)]
pub struct ActiveRequests {
    inner: Arc<Mutex<HashMap<String, SessionId>>>,
}

impl ActiveRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `context` for the lifetime of the returned scope.
    pub fn enter(&self, context: RequestContext) -> RequestScope {
        self.inner
            .lock()
            .insert(context.request_id.clone(), context.session.clone());
        tracing::trace!(request_id = %context.request_id, "Entered request scope");
        RequestScope {
            context,
            registry: self.inner.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Whether a request is in flight for `session`.
    pub fn contains_session(&self, session: &SessionId) -> bool {
        self.inner.lock().values().any(|s| s == session)
    }
}

/// Guard keeping a request context registered. Releases it on drop.
#[derive(Debug)]
pub struct RequestScope {
    context: RequestContext,
    registry: Arc<Mutex<HashMap<String, SessionId>>>,
}

impl RequestScope {
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Deref for RequestScope {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.context.request_id);
        tracing::trace!(request_id = %self.context.request_id, "Released request scope");
    }
}
