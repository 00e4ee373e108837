//! Implicit navigation: outcomes such as `mvc:/hotels/list` name their
//! destination directly.

use super::chain::NavigationOutcomeResolver;
use super::error::NavigationError;
use super::outcome::{NavigationContext, NavigationOutcome};

pub const DEFAULT_IMPLICIT_PREFIX: &str = "mvc:";

/// Resolves outcomes (or default destinations) carrying a known prefix.
#[derive(Debug, Clone)]
pub struct ImplicitNavigationOutcomeResolver {
    prefix: String,
}

impl Default for ImplicitNavigationOutcomeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplicitNavigationOutcomeResolver {
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_IMPLICIT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn is_implicit(&self, text: Option<&str>) -> bool {
        text.is_some_and(|t| t.starts_with(self.prefix.as_str()))
    }

    /// The outcome wins over the default destination.
    fn implicit_text<'a>(&self, context: &'a NavigationContext) -> Option<&'a str> {
        let outcome = Some(context.outcome());
        if self.is_implicit(outcome) {
            return outcome;
        }
        context
            .default_destination()
            .filter(|d| self.is_implicit(Some(*d)))
    }
}

impl NavigationOutcomeResolver for ImplicitNavigationOutcomeResolver {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, NavigationError> {
        Ok(self.implicit_text(context).is_some())
    }

    fn resolve(&self, context: &NavigationContext) -> Result<NavigationOutcome, NavigationError> {
        let Some(text) = self.implicit_text(context) else {
            return Err(NavigationError::ResolutionMissing {
                outcome: context.outcome().to_string(),
            });
        };
        let destination = text[self.prefix.len()..].trim();
        if destination.is_empty() {
            return Err(NavigationError::MissingDestinationText {
                prefix: self.prefix.clone(),
            });
        }
        Ok(NavigationOutcome::new(destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        let resolver = ImplicitNavigationOutcomeResolver::new();
        let ctx = NavigationContext::new("mvc:view");
        assert!(resolver.can_resolve(&ctx).unwrap());
        let outcome = resolver.resolve(&ctx).unwrap();
        assert_eq!(outcome.destination(), "view");
        assert!(outcome.implicit_model().is_none());
    }

    #[test]
    fn test_custom_prefix() {
        let mut resolver = ImplicitNavigationOutcomeResolver::new();
        resolver.set_prefix("springFaces:");
        let ctx = NavigationContext::new("springFaces:view");
        assert!(resolver.can_resolve(&ctx).unwrap());
        assert_eq!(resolver.resolve(&ctx).unwrap(), NavigationOutcome::new("view"));
        assert!(!resolver.can_resolve(&NavigationContext::new("mvc:view")).unwrap());
    }

    #[test]
    fn test_destination_is_trimmed() {
        let resolver = ImplicitNavigationOutcomeResolver::new();
        let outcome = resolver.resolve(&NavigationContext::new("mvc:  /hotels  ")).unwrap();
        assert_eq!(outcome.destination(), "/hotels");
    }

    #[test]
    fn test_empty_destination_fails() {
        let resolver = ImplicitNavigationOutcomeResolver::new();
        for outcome in ["mvc:", "mvc:   "] {
            let err = resolver.resolve(&NavigationContext::new(outcome)).unwrap_err();
            assert!(err.to_string().contains("destination must be specified"));
        }
    }

    #[test]
    fn test_prefix_must_lead() {
        let resolver = ImplicitNavigationOutcomeResolver::new();
        assert!(!resolver.can_resolve(&NavigationContext::new("xmvc:view")).unwrap());
    }

    #[test]
    fn test_default_destination_fallback() {
        let resolver = ImplicitNavigationOutcomeResolver::new();
        let ctx = NavigationContext::new("success").with_default_destination("mvc:fallback");
        assert!(resolver.can_resolve(&ctx).unwrap());
        assert_eq!(resolver.resolve(&ctx).unwrap().destination(), "fallback");
    }

    #[test]
    fn test_outcome_preferred_over_default_destination() {
        let resolver = ImplicitNavigationOutcomeResolver::new();
        let ctx = NavigationContext::new("mvc:first").with_default_destination("mvc:second");
        assert_eq!(resolver.resolve(&ctx).unwrap().destination(), "first");
    }
}
