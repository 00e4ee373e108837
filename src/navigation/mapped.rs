//! Explicit outcome → destination table.

use serde::{Deserialize, Serialize};

use super::chain::NavigationOutcomeResolver;
use super::error::NavigationError;
use super::outcome::{NavigationContext, NavigationOutcome};
use crate::model::Model;

/// A single mapping entry, usually loaded from `[[navigation.mappings]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationMapping {
    /// Outcome text that triggers the mapping.
    pub outcome: String,
    /// Restrict the mapping to outcomes produced by this action.
    #[serde(default)]
    pub from_action: Option<String>,
    /// Restrict the mapping to events raised by this component.
    #[serde(default)]
    pub component_id: Option<String>,
    /// Destination handed to the destination chain.
    pub destination: String,
    /// Implicit model carried with the destination.
    #[serde(default)]
    pub model: Option<Model>,
}

impl NavigationMapping {
    pub fn new(outcome: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            outcome: outcome.into(),
            from_action: None,
            component_id: None,
            destination: destination.into(),
            model: None,
        }
    }

    fn matches(&self, context: &NavigationContext) -> bool {
        if self.outcome != context.outcome() {
            return false;
        }
        let action_matches = match &self.from_action {
            Some(action) => context.from_action() == Some(action.as_str()),
            None => true,
        };
        let component_matches = match &self.component_id {
            Some(component) => context.component_id() == Some(component.as_str()),
            None => true,
        };
        action_matches && component_matches
    }
}

/// Resolves outcomes listed in a fixed table.
///
/// Mappings are tried in order; the first match supplies the destination.
#[derive(Debug, Clone, Default)]
pub struct MappedNavigationOutcomeResolver {
    mappings: Vec<NavigationMapping>,
}

impl MappedNavigationOutcomeResolver {
    pub fn new(mappings: Vec<NavigationMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[NavigationMapping] {
        &self.mappings
    }

    fn find(&self, context: &NavigationContext) -> Option<&NavigationMapping> {
        self.mappings.iter().find(|m| m.matches(context))
    }
}

impl NavigationOutcomeResolver for MappedNavigationOutcomeResolver {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, NavigationError> {
        Ok(self.find(context).is_some())
    }

    fn resolve(&self, context: &NavigationContext) -> Result<NavigationOutcome, NavigationError> {
        let mapping = self
            .find(context)
            .ok_or_else(|| NavigationError::ResolutionMissing {
                outcome: context.outcome().to_string(),
            })?;
        Ok(match &mapping.model {
            Some(model) => {
                NavigationOutcome::with_implicit_model(mapping.destination.clone(), model.clone())
            }
            None => NavigationOutcome::new(mapping.destination.clone()),
        })
    }
}
