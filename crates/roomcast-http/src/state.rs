//! Shared handler state

use roomcast_core::RoomHub;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tracing::info;

/// State handed to every route
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<RoomHub>,
    pub admin: Arc<AdminToken>,
}

impl AppState {
    pub fn new(hub: Arc<RoomHub>, admin_token: Option<String>) -> Self {
        Self {
            hub,
            admin: Arc::new(AdminToken::new(admin_token)),
        }
    }
}

/// Admin token guarding the `/admin` routes
///
/// Once set it never changes for the life of the process.
#[derive(Debug, Default)]
pub struct AdminToken {
    token: RwLock<Option<String>>,
}

impl AdminToken {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            token: RwLock::new(initial.filter(|t| !t.is_empty())),
        }
    }

    pub async fn is_set(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Claim the token if none is set yet. Returns false when one already exists.
    pub async fn set_if_unset(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }

        let mut token = self.token.write().await;
        if token.is_some() {
            return false;
        }
        *token = Some(candidate.to_string());
        info!("admin token configured");
        true
    }

    /// Constant-time check of a presented token; always false while unset
    pub async fn verify(&self, candidate: &str) -> bool {
        match self.token.read().await.as_deref() {
            Some(token) => bool::from(token.as_bytes().ct_eq(candidate.as_bytes())),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_set_wins() {
        let admin = AdminToken::default();
        assert!(!admin.verify("anything").await);

        assert!(admin.set_if_unset("first").await);
        assert!(!admin.set_if_unset("second").await);

        assert!(admin.verify("first").await);
        assert!(!admin.verify("second").await);
    }

    #[tokio::test]
    async fn test_configured_token_is_fixed() {
        let admin = AdminToken::new(Some("env-token".to_string()));
        assert!(admin.is_set().await);
        assert!(!admin.set_if_unset("other").await);
        assert!(admin.verify("env-token").await);
    }

    #[tokio::test]
    async fn test_prefix_does_not_verify() {
        let admin = AdminToken::new(Some("abcdef".to_string()));
        assert!(!admin.verify("abc").await);
        assert!(!admin.verify("abcdefg").await);
        assert!(!admin.verify("").await);
    }

    #[tokio::test]
    async fn test_empty_token_never_claims() {
        let admin = AdminToken::new(Some(String::new()));
        assert!(!admin.is_set().await);
        assert!(!admin.set_if_unset("").await);
    }
}
