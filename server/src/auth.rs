//! The authentication collaborator: resolves an opaque session token or
//! a fallback user id to a user identity. Password hashing, session
//! issuance, and the user database live elsewhere; this module only
//! defines the seam the dispatcher calls through, plus a null
//! implementation used when no identity store is wired in.

use std::sync::Arc;

use async_trait::async_trait;

/// A resolved user identity, snapshotted at connect time into the
/// participant slot's `display_name`/`email`.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

/// The authentication seam consumed by `dispatcher::game_handler`.
/// Both calls are best-effort lookups: `None` means "treat as anonymous",
/// never an error.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn resolve_session(&self, token: &str) -> Option<UserIdentity>;
    async fn resolve_user_by_id(&self, id: &str) -> Option<UserIdentity>;
}

/// Default wiring when no real identity store is configured: every
/// lookup fails, so every connection is treated as anonymous.
pub struct NullAuth;

#[async_trait]
impl AuthProvider for NullAuth {
    async fn resolve_session(&self, _token: &str) -> Option<UserIdentity> {
        None
    }

    async fn resolve_user_by_id(&self, _id: &str) -> Option<UserIdentity> {
        None
    }
}

pub type SharedAuth = Arc<dyn AuthProvider>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_auth_is_always_anonymous() {
        let auth = NullAuth;
        assert!(auth.resolve_session("whatever").await.is_none());
        assert!(auth.resolve_user_by_id("whatever").await.is_none());
    }
}
