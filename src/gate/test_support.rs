//! Registry double answering scope queries from a fixed table.

use std::collections::HashMap;

use async_trait::async_trait;

use super::registry::{RegistryClient, RegistryError};
use crate::scope::ScopeRef;

/// Registry that knows a fixed set of scope ids.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    scopes: HashMap<String, Result<Option<String>, RegistryError>>,
}

impl StaticRegistry {
    /// Creates a registry that knows no scopes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolvable scope.
    #[must_use]
    pub fn with_scope(mut self, scope: &ScopeRef) -> Self {
        let id = scope.qualified();
        self.scopes.insert(id.clone(), Ok(Some(id)));
        self
    }

    /// Makes queries for `scope` fail with `error`.
    #[must_use]
    pub fn with_failure(mut self, scope: &ScopeRef, error: RegistryError) -> Self {
        self.scopes.insert(scope.qualified(), Err(error));
        self
    }
}

#[async_trait]
impl RegistryClient for StaticRegistry {
    async fn scope_id(&self, scope: &ScopeRef) -> Result<Option<String>, RegistryError> {
        self.scopes
            .get(&scope.qualified())
            .cloned()
            .unwrap_or(Ok(None))
    }
}
