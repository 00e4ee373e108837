//! Unique-match resolver chain.

use std::sync::Arc;

use super::error::NavigationError;
use super::outcome::{NavigationContext, NavigationOutcome};

/// Maps a navigation context to a concrete outcome.
///
/// `resolve` is only called after `can_resolve` returned `true`.
pub trait NavigationOutcomeResolver: Send + Sync {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, NavigationError>;

    fn resolve(&self, context: &NavigationContext) -> Result<NavigationOutcome, NavigationError>;
}

/// Chain that requires exactly one member to claim an outcome.
///
/// Unlike the destination chain there is no precedence between members: two
/// members claiming the same outcome is a configuration defect and reported
/// as `NavigationError::ResolutionAmbiguous`.
#[derive(Clone, Default)]
pub struct NavigationOutcomeResolverChain {
    resolvers: Vec<Arc<dyn NavigationOutcomeResolver>>,
}

impl NavigationOutcomeResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn NavigationOutcomeResolver>>) -> Self {
        Self { resolvers }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Find the single member claiming the outcome, if any.
    fn find(
        &self,
        context: &NavigationContext,
    ) -> Result<Option<&Arc<dyn NavigationOutcomeResolver>>, NavigationError> {
        let mut found = None;
        let mut count = 0usize;
        for resolver in &self.resolvers {
            if resolver.can_resolve(context)? {
                count += 1;
                found.get_or_insert(resolver);
            }
        }
        if count > 1 {
            tracing::error!(
                outcome = %context.outcome(),
                count,
                "Navigation outcome claimed by more than one resolver"
            );
            return Err(NavigationError::ResolutionAmbiguous {
                outcome: context.outcome().to_string(),
                count,
            });
        }
        Ok(found)
    }
}

impl NavigationOutcomeResolver for NavigationOutcomeResolverChain {
    fn can_resolve(&self, context: &NavigationContext) -> Result<bool, NavigationError> {
        Ok(self.find(context)?.is_some())
    }

    fn resolve(&self, context: &NavigationContext) -> Result<NavigationOutcome, NavigationError> {
        let Some(resolver) = self.find(context)? else {
            return Err(NavigationError::ResolutionMissing {
                outcome: context.outcome().to_string(),
            });
        };
        let outcome = resolver.resolve(context)?;
        tracing::debug!(
            outcome = %context.outcome(),
            destination = %outcome.destination(),
            "Resolved navigation outcome"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedResolver {
        claims: bool,
        destination: &'static str,
        resolve_calls: AtomicUsize,
    }

    impl FixedResolver {
        fn new(claims: bool, destination: &'static str) -> Arc<Self> {
            Arc::new(Self {
                claims,
                destination,
                resolve_calls: AtomicUsize::new(0),
            })
        }
    }

    impl NavigationOutcomeResolver for FixedResolver {
        fn can_resolve(&self, _context: &NavigationContext) -> Result<bool, NavigationError> {
            Ok(self.claims)
        }

        fn resolve(&self, _context: &NavigationContext) -> Result<NavigationOutcome, NavigationError> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            Ok(NavigationOutcome::new(self.destination))
        }
    }

    fn chain(members: &[Arc<FixedResolver>]) -> NavigationOutcomeResolverChain {
        NavigationOutcomeResolverChain::new(
            members
                .iter()
                .map(|r| r.clone() as Arc<dyn NavigationOutcomeResolver>)
                .collect(),
        )
    }

    #[test]
    fn test_single_match_resolves_without_touching_others() {
        let r1 = FixedResolver::new(false, "one");
        let r2 = FixedResolver::new(true, "two");
        let r3 = FixedResolver::new(false, "three");
        let chain = chain(&[r1.clone(), r2.clone(), r3.clone()]);
        let ctx = NavigationContext::new("outcome");

        assert!(chain.can_resolve(&ctx).unwrap());
        assert_eq!(chain.resolve(&ctx).unwrap(), NavigationOutcome::new("two"));
        assert_eq!(r1.resolve_calls.load(Ordering::SeqCst), 0);
        assert_eq!(r2.resolve_calls.load(Ordering::SeqCst), 1);
        assert_eq!(r3.resolve_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_match_cannot_resolve() {
        let chain = chain(&[FixedResolver::new(false, "one")]);
        assert!(!chain.can_resolve(&NavigationContext::new("outcome")).unwrap());
    }

    #[test]
    fn test_empty_chain_cannot_resolve() {
        let chain = NavigationOutcomeResolverChain::default();
        assert!(chain.is_empty());
        assert!(!chain.can_resolve(&NavigationContext::new("outcome")).unwrap());
    }

    #[test]
    fn test_two_matches_are_ambiguous() {
        let chain = chain(&[
            FixedResolver::new(true, "one"),
            FixedResolver::new(false, "two"),
            FixedResolver::new(true, "three"),
        ]);
        let err = chain.can_resolve(&NavigationContext::new("outcome")).unwrap_err();
        assert_eq!(
            err,
            NavigationError::ResolutionAmbiguous {
                outcome: "outcome".to_string(),
                count: 2
            }
        );
        assert!(err.to_string().contains("'outcome'"));
    }

    #[test]
    fn test_resolve_without_match_is_missing() {
        let chain = chain(&[FixedResolver::new(false, "one")]);
        let err = chain.resolve(&NavigationContext::new("outcome")).unwrap_err();
        assert_eq!(
            err,
            NavigationError::ResolutionMissing {
                outcome: "outcome".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_with_two_matches_is_ambiguous() {
        let r1 = FixedResolver::new(true, "one");
        let r2 = FixedResolver::new(true, "two");
        let chain = chain(&[r1.clone(), r2.clone()]);
        let err = chain.resolve(&NavigationContext::new("outcome")).unwrap_err();
        assert!(matches!(err, NavigationError::ResolutionAmbiguous { .. }));
        assert_eq!(r1.resolve_calls.load(Ordering::SeqCst), 0);
        assert_eq!(r2.resolve_calls.load(Ordering::SeqCst), 0);
    }
}
