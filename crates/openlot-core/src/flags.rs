//! # Capability Flags
//!
//! The contract between the marketplace and whatever resolves feature flags.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Capability Resolution                                │
//! │                                                                         │
//! │  FlagProvider (request layer)        FlagPolicy (this module)           │
//! │  ───────────────────────────         ──────────────────────────         │
//! │  resolve(Capability)                 default_for(Capability)            │
//! │    -> Ok(true/false)                   applied when the provider        │
//! │    -> Err(FlagUnavailable)             is unreachable                   │
//! │                                                                         │
//! │  The checkout core NEVER consults flags. The request layer resolves     │
//! │  them before invoking the core and treats a disabled surface as         │
//! │  not-found. The core behaves identically regardless of how the          │
//! │  booleans were produced.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A provider failure is an explicit `Err(FlagUnavailable)`, never a
//! silently swallowed exception; the policy states per flag what happens in
//! that case, and the caller decides whether to log it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Capabilities
// =============================================================================

/// The externally controlled capabilities of the marketplace surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Buyers may accumulate listings in a cart.
    Cart,
    /// Buyers may convert a cart into a purchase.
    Checkout,
    /// The dummy payment gateway accepts its test card.
    DummyPayments,
}

impl Capability {
    /// The flag name used by external flag services.
    pub fn flag_name(&self) -> &'static str {
        match self {
            Capability::Cart => "cart.enabled",
            Capability::Checkout => "checkout.enabled",
            Capability::DummyPayments => "payment.dummy.enabled",
        }
    }
}

// =============================================================================
// Provider Contract
// =============================================================================

/// The flag backend could not be consulted.
#[derive(Debug, Clone, Error)]
#[error("flag service unavailable: {reason}")]
pub struct FlagUnavailable {
    /// Why resolution failed (connection refused, missing config, ...).
    pub reason: String,
}

impl FlagUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        FlagUnavailable {
            reason: reason.into(),
        }
    }
}

/// Resolves capability flags from wherever they live.
///
/// Implementations are free to consult an external service, the
/// environment, or a static table; unavailability must surface as an
/// explicit error rather than a guessed answer.
pub trait FlagProvider: Send + Sync {
    fn resolve(&self, capability: Capability) -> Result<bool, FlagUnavailable>;
}

/// A fixed in-memory provider. Useful for tests and static deployments.
#[derive(Debug, Clone)]
pub struct StaticFlagProvider {
    pub cart: bool,
    pub checkout: bool,
    pub dummy_payments: bool,
}

impl StaticFlagProvider {
    /// Everything enabled.
    pub fn all_enabled() -> Self {
        StaticFlagProvider {
            cart: true,
            checkout: true,
            dummy_payments: true,
        }
    }
}

impl FlagProvider for StaticFlagProvider {
    fn resolve(&self, capability: Capability) -> Result<bool, FlagUnavailable> {
        Ok(match capability {
            Capability::Cart => self.cart,
            Capability::Checkout => self.checkout,
            Capability::DummyPayments => self.dummy_payments,
        })
    }
}

// =============================================================================
// Policy
// =============================================================================

/// The per-flag default applied when the provider is unavailable.
///
/// Shipping defaults are fail-open (all enabled): a flag-service outage must
/// not take the marketplace down. The policy object makes that choice
/// explicit and overridable instead of burying it in a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPolicy {
    pub cart_default: bool,
    pub checkout_default: bool,
    pub dummy_payments_default: bool,
}

impl Default for FlagPolicy {
    fn default() -> Self {
        FlagPolicy {
            cart_default: true,
            checkout_default: true,
            dummy_payments_default: true,
        }
    }
}

impl FlagPolicy {
    /// The default for one capability.
    pub fn default_for(&self, capability: Capability) -> bool {
        match capability {
            Capability::Cart => self.cart_default,
            Capability::Checkout => self.checkout_default,
            Capability::DummyPayments => self.dummy_payments_default,
        }
    }

    /// Resolves one capability through a provider, applying the policy
    /// default on unavailability.
    ///
    /// Returns the effective value plus whether the default was applied, so
    /// the caller can log the fallback.
    pub fn resolve(
        &self,
        provider: &dyn FlagProvider,
        capability: Capability,
    ) -> (bool, Option<FlagUnavailable>) {
        match provider.resolve(capability) {
            Ok(enabled) => (enabled, None),
            Err(unavailable) => (self.default_for(capability), Some(unavailable)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
