// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resolver registry
//!
//! Maps URI schemes to the backend that knows how to turn a URI into a root resource.

use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::error::{ResfsError, ResfsResult};

/// Turns a URI into a root resource of one backend.
pub trait ResourceResolver: Send + Sync {
    type Resource;

    /// `Ok(None)` when nothing usable exists at the location.
    fn resolve(&self, uri: &Url) -> ResfsResult<Option<Self::Resource>>;

    /// Schemes this resolver registers itself under.
    fn default_schemes(&self) -> &[&'static str];
}

/// Registry of resolvers keyed by URI scheme
pub struct ResolverRegistry<R> {
    resolvers: HashMap<String, Arc<dyn ResourceResolver<Resource = R>>>,
}

impl<R> ResolverRegistry<R> {
    pub fn new() -> Self {
        Self { resolvers: HashMap::new() }
    }

    pub fn register(&mut self, resolver: Arc<dyn ResourceResolver<Resource = R>>) {
        for scheme in resolver.default_schemes() {
            self.resolvers.insert(scheme.to_string(), resolver.clone());
        }
    }

    pub fn get(&self, scheme: &str) -> Option<Arc<dyn ResourceResolver<Resource = R>>> {
        self.resolvers.get(scheme).cloned()
    }

    pub fn get_or_err(&self, scheme: &str) -> ResfsResult<Arc<dyn ResourceResolver<Resource = R>>> {
        self.get(scheme).ok_or_else(|| ResfsError::SchemeNotRegistered(scheme.to_string()))
    }

    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.resolvers.keys().map(|s| s.as_str()).collect();
        schemes.sort_unstable();
        schemes
    }

    pub fn remove(&mut self, scheme: &str) -> Option<Arc<dyn ResourceResolver<Resource = R>>> {
        self.resolvers.remove(scheme)
    }

    pub fn resolve(&self, uri: &Url) -> ResfsResult<Option<R>> {
        self.get_or_err(uri.scheme())?.resolve(uri)
    }

    pub fn resolve_str(&self, uri: &str) -> ResfsResult<Option<R>> {
        let uri = Url::parse(uri).map_err(|e| ResfsError::InvalidUri(format!("{uri}: {e}")))?;
        self.resolve(&uri)
    }
}

impl<R> Default for ResolverRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoResolver;

    impl ResourceResolver for EchoResolver {
        type Resource = String;

        fn resolve(&self, uri: &Url) -> ResfsResult<Option<String>> {
            if uri.path() == "/missing" {
                Ok(None)
            } else {
                Ok(Some(uri.path().to_string()))
            }
        }

        fn default_schemes(&self) -> &[&'static str] {
            &["echo", "mirror"]
        }
    }

    #[test]
    fn test_register_under_every_scheme() {
        let mut registry: ResolverRegistry<String> = ResolverRegistry::new();
        registry.register(Arc::new(EchoResolver));
        assert_eq!(registry.schemes(), vec!["echo", "mirror"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("file").is_none());
    }

    #[test]
    fn test_resolve_by_scheme() {
        let mut registry: ResolverRegistry<String> = ResolverRegistry::new();
        registry.register(Arc::new(EchoResolver));

        let found = registry.resolve_str("mirror://host/some/where").unwrap();
        assert_eq!(found.as_deref(), Some("/some/where"));
        assert!(registry.resolve_str("echo://host/missing").unwrap().is_none());
    }

    #[test]
    fn test_unknown_scheme() {
        let registry: ResolverRegistry<String> = ResolverRegistry::default();
        let err = registry.resolve_str("gopher://host/x").unwrap_err();
        assert!(matches!(err, ResfsError::SchemeNotRegistered(ref s) if s == "gopher"));
    }

    #[test]
    fn test_invalid_uri() {
        let registry: ResolverRegistry<String> = ResolverRegistry::new();
        assert!(matches!(registry.resolve_str("not a uri"), Err(ResfsError::InvalidUri(_))));
    }

    #[test]
    fn test_remove() {
        let mut registry: ResolverRegistry<String> = ResolverRegistry::new();
        registry.register(Arc::new(EchoResolver));
        assert!(registry.remove("echo").is_some());
        assert_eq!(registry.schemes(), vec!["mirror"]);
    }
}
