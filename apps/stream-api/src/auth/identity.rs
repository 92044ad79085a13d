//! Identity provider seam: resolves a bearer token to the current user.

use async_trait::async_trait;
use dashmap::DashMap;

/// The authenticated user's display identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub image_url: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `token` to an identity, or `None` if it is unknown or expired.
    async fn current_identity(&self, token: &str) -> Option<Identity>;
}

/// Token table held in memory. Used for local runs and tests.
pub struct MemoryIdentityProvider {
    tokens: DashMap<String, Identity>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    pub fn insert(&self, token: impl Into<String>, identity: Identity) {
        self.tokens.insert(token.into(), identity);
    }

    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn current_identity(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).map(|e| e.value().clone())
    }
}
