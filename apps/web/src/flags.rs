//! Environment-backed capability flag provider, plus the surface-gate
//! extractors that turn a disabled capability into a 404.
//!
//! `cart.enabled` is read from `OPENLOT_FLAG_CART_ENABLED`, and so on. An
//! unset or unparsable variable is reported as unavailable so the policy
//! default (fail-open) applies - this mirrors how an unreachable flag
//! service behaves.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use openlot_core::{Capability, FlagProvider, FlagUnavailable};

use crate::error::ApiError;
use crate::state::AppState;

pub struct EnvFlagProvider {
    prefix: String,
}

impl EnvFlagProvider {
    pub fn new() -> Self {
        EnvFlagProvider::with_prefix("OPENLOT_FLAG_")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        EnvFlagProvider {
            prefix: prefix.into(),
        }
    }

    /// `cart.enabled` -> `<prefix>CART_ENABLED`
    fn var_name(&self, capability: Capability) -> String {
        format!(
            "{}{}",
            self.prefix,
            capability.flag_name().to_uppercase().replace('.', "_")
        )
    }
}

impl Default for EnvFlagProvider {
    fn default() -> Self {
        EnvFlagProvider::new()
    }
}

impl FlagProvider for EnvFlagProvider {
    fn resolve(&self, capability: Capability) -> Result<bool, FlagUnavailable> {
        let name = self.var_name(capability);
        let raw = std::env::var(&name)
            .map_err(|_| FlagUnavailable::new(format!("{name} not set")))?;

        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(true),
            "0" | "false" | "off" | "no" => Ok(false),
            other => Err(FlagUnavailable::new(format!(
                "{name} has unrecognized value {other:?}"
            ))),
        }
    }
}

// =============================================================================
// Surface Gates
// =============================================================================

/// Extractor that rejects with 404 when the cart surface is switched off.
///
/// A disabled surface must behave as if its routes do not exist, so the gate
/// has to run before every other extractor - in particular before the bearer
/// token is even looked at, or an unauthenticated caller would see 401 where
/// an authenticated one sees 404. Handlers list it as their first argument;
/// axum runs extractors in argument order.
pub struct CartSurface;

impl FromRequestParts<AppState> for CartSurface {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        if state.capability_enabled(Capability::Cart) {
            Ok(CartSurface)
        } else {
            Err(ApiError::surface_disabled())
        }
    }
}

/// Extractor gating the checkout endpoint: requires both the cart and
/// checkout capabilities, with the same 404-before-anything ordering as
/// [`CartSurface`].
pub struct CheckoutSurface;

impl FromRequestParts<AppState> for CheckoutSurface {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        if state.capability_enabled(Capability::Cart)
            && state.capability_enabled(Capability::Checkout)
        {
            Ok(CheckoutSurface)
        } else {
            Err(ApiError::surface_disabled())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own prefix: the environment is process-global and
    // tests run in parallel

    #[test]
    fn test_reads_env_value() {
        let provider = EnvFlagProvider::with_prefix("FLAGTEST_READS_");
        std::env::set_var("FLAGTEST_READS_CART_ENABLED", "false");
        assert!(!provider.resolve(Capability::Cart).unwrap());

        std::env::set_var("FLAGTEST_READS_CART_ENABLED", "on");
        assert!(provider.resolve(Capability::Cart).unwrap());
    }

    #[test]
    fn test_unset_is_unavailable() {
        let provider = EnvFlagProvider::with_prefix("FLAGTEST_UNSET_");
        assert!(provider.resolve(Capability::Checkout).is_err());
    }

    #[test]
    fn test_garbage_is_unavailable() {
        let provider = EnvFlagProvider::with_prefix("FLAGTEST_GARBAGE_");
        std::env::set_var("FLAGTEST_GARBAGE_PAYMENT_DUMMY_ENABLED", "maybe");
        assert!(provider.resolve(Capability::DummyPayments).is_err());
    }

    #[test]
    fn test_var_names() {
        let provider = EnvFlagProvider::new();
        assert_eq!(
            provider.var_name(Capability::Cart),
            "OPENLOT_FLAG_CART_ENABLED"
        );
        assert_eq!(
            provider.var_name(Capability::DummyPayments),
            "OPENLOT_FLAG_PAYMENT_DUMMY_ENABLED"
        );
    }
}
