use serde::{Deserialize, Serialize};

use crate::model::Model;

/// Concrete destination plus the implicit model that travels with it.
///
/// An absent implicit model and an empty one are distinct: only a present
/// model is handed on to the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationOutcome {
    destination: String,
    implicit_model: Option<Model>,
}

impl NavigationOutcome {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            implicit_model: None,
        }
    }

    pub fn with_implicit_model(destination: impl Into<String>, model: Model) -> Self {
        Self {
            destination: destination.into(),
            implicit_model: Some(model),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn implicit_model(&self) -> Option<&Model> {
        self.implicit_model.as_ref()
    }
}

/// Everything known about one navigation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationContext {
    outcome: String,
    default_destination: Option<String>,
    from_action: Option<String>,
    component_id: Option<String>,
    preemptive: bool,
}

impl NavigationContext {
    pub fn new(outcome: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            ..Self::default()
        }
    }

    /// Fallback destination consulted when the outcome itself does not match.
    pub fn with_default_destination(mut self, destination: impl Into<String>) -> Self {
        self.default_destination = Some(destination.into());
        self
    }

    /// Action expression that produced the outcome.
    pub fn with_from_action(mut self, action: impl Into<String>) -> Self {
        self.from_action = Some(action.into());
        self
    }

    /// Component that triggered the event.
    pub fn with_component_id(mut self, id: impl Into<String>) -> Self {
        self.component_id = Some(id.into());
        self
    }

    /// Mark the navigation as computed ahead of time (e.g. to render a link).
    pub fn preemptive(mut self) -> Self {
        self.preemptive = true;
        self
    }

    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    pub fn default_destination(&self) -> Option<&str> {
        self.default_destination.as_deref()
    }

    pub fn from_action(&self) -> Option<&str> {
        self.from_action.as_deref()
    }

    pub fn component_id(&self) -> Option<&str> {
        self.component_id.as_deref()
    }

    pub fn is_preemptive(&self) -> bool {
        self.preemptive
    }
}
