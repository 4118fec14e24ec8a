//! Shared application state.
//!
//! Carts live here, keyed by authenticated user id, behind one mutex. A cart
//! is only a working set of ids; the checkout engine re-validates everything
//! under row locks, so cart state needs no durability and no finer locking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::warn;

use openlot_core::{Capability, Cart, FlagPolicy, FlagProvider, ListingId};
use openlot_db::Database;

use crate::auth::AuthKeys;
use crate::config::AppConfig;
use crate::flags::EnvFlagProvider;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub payment_timeout: Duration,
    pub auth: Arc<AuthKeys>,
    flags: Arc<dyn FlagProvider>,
    policy: FlagPolicy,
    carts: Arc<Mutex<HashMap<String, Cart>>>,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        AppState {
            db,
            payment_timeout: config.payment_timeout(),
            auth: Arc::new(AuthKeys::new(
                config.jwt_secret.clone(),
                config.jwt_lifetime_secs,
            )),
            flags: Arc::new(EnvFlagProvider::new()),
            policy: FlagPolicy::default(),
            carts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Same state with a different flag provider (tests).
    #[cfg(test)]
    pub fn with_flags(mut self, flags: Arc<dyn FlagProvider>) -> Self {
        self.flags = flags;
        self
    }

    /// Resolves one capability, applying the fail-open policy default and
    /// logging when the provider could not answer.
    pub fn capability_enabled(&self, capability: Capability) -> bool {
        let (enabled, fallback) = self.policy.resolve(self.flags.as_ref(), capability);
        if let Some(unavailable) = fallback {
            warn!(
                flag = capability.flag_name(),
                reason = %unavailable.reason,
                default = enabled,
                "Flag provider unavailable, applying policy default"
            );
        }
        enabled
    }

    /// Runs a closure against one user's cart, creating it on first use.
    pub fn with_cart<R>(&self, user_id: &str, f: impl FnOnce(&mut Cart) -> R) -> R {
        // A poisoned lock means another request panicked mid-mutation; cart
        // contents are plain ids and remain usable
        let mut carts = self.carts.lock().unwrap_or_else(|e| e.into_inner());
        let cart = carts.entry(user_id.to_string()).or_default();
        f(cart)
    }

    /// The cart's listing ids in insertion order.
    pub fn cart_ids(&self, user_id: &str) -> Vec<ListingId> {
        self.with_cart(user_id, |cart| cart.ids().to_vec())
    }

    /// Empties one user's cart.
    pub fn clear_cart(&self, user_id: &str) {
        self.with_cart(user_id, |cart| cart.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openlot_db::DbConfig;
    use openlot_core::flags::StaticFlagProvider;

    async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_secs: 3600,
            payment_timeout_secs: 10,
            busy_timeout_secs: 1,
        };
        AppState::new(db, &config)
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let state = test_state().await;
        state
            .with_cart("alice", |cart| cart.add("listing-1".to_string()))
            .unwrap();

        assert_eq!(state.cart_ids("alice"), vec!["listing-1"]);
        assert!(state.cart_ids("bob").is_empty());

        state.clear_cart("alice");
        assert!(state.cart_ids("alice").is_empty());
    }

    #[tokio::test]
    async fn test_capability_respects_provider() {
        let state = test_state().await.with_flags(Arc::new(StaticFlagProvider {
            cart: true,
            checkout: false,
            dummy_payments: true,
        }));

        assert!(state.capability_enabled(Capability::Cart));
        assert!(!state.capability_enabled(Capability::Checkout));
    }
}
