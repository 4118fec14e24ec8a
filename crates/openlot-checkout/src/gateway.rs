//! # Payment Gateway Contract
//!
//! The engine only ever talks to payments through [`PaymentGateway`], so the
//! reservation protocol is testable without a processor and a real
//! integration slots in later without touching the engine.
//!
//! [`DummyGateway`] is the only implementation shipped: it approves exactly
//! one well-known test card and declines everything else.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use openlot_core::PaymentCard;

/// Opaque reference returned by a successful authorization.
///
/// Stored verbatim on the purchase row for later reconciliation.
pub type PaymentRef = String;

/// Why a gateway refused to authorize a charge.
///
/// Declines are business outcomes, not errors: the cart stays intact and the
/// buyer is told what to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// The card number was not accepted.
    CardDeclined,
    /// Expiry or CVC was missing or blank.
    MissingDetails,
    /// Payments are administratively switched off.
    GatewayDisabled,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::CardDeclined => write!(f, "card declined"),
            DeclineReason::MissingDetails => write!(f, "missing card details"),
            DeclineReason::GatewayDisabled => write!(f, "payments are disabled"),
        }
    }
}

/// Authorizes charges. Implementations must be side-effect free on decline.
///
/// `authorize` is called exactly once per checkout attempt, after inventory
/// is locked and before anything durable is written. Implementations must
/// not capture funds out-of-band of that protocol.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Attempts to authorize `amount_cents` against `card`.
    ///
    /// `Ok` carries the processor's reference; `Err` is a decline, never an
    /// infrastructure failure (slowness is handled by the engine's timeout).
    async fn authorize(
        &self,
        card: &PaymentCard,
        amount_cents: i64,
    ) -> Result<PaymentRef, DeclineReason>;
}

/// The magic test card number the dummy gateway approves.
pub const DUMMY_APPROVED_CARD: &str = "4242424242424242";

/// Deterministic stand-in gateway for development and tests.
///
/// Approves [`DUMMY_APPROVED_CARD`] (spaces and dashes ignored), declines
/// every other number, and rejects requests with missing expiry or CVC.
/// Can be administratively disabled, in which case every request is refused
/// before the card is even looked at.
#[derive(Debug, Clone)]
pub struct DummyGateway {
    enabled: bool,
}

impl DummyGateway {
    pub fn new(enabled: bool) -> Self {
        DummyGateway { enabled }
    }
}

impl Default for DummyGateway {
    fn default() -> Self {
        DummyGateway::new(true)
    }
}

#[async_trait]
impl PaymentGateway for DummyGateway {
    async fn authorize(
        &self,
        card: &PaymentCard,
        amount_cents: i64,
    ) -> Result<PaymentRef, DeclineReason> {
        if !self.enabled {
            debug!("Dummy gateway disabled, refusing authorization");
            return Err(DeclineReason::GatewayDisabled);
        }

        if card.exp_month.trim().is_empty()
            || card.exp_year.trim().is_empty()
            || card.cvc.trim().is_empty()
        {
            return Err(DeclineReason::MissingDetails);
        }

        let digits: String = card.number.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits != DUMMY_APPROVED_CARD {
            debug!(amount_cents, "Dummy gateway declining card");
            return Err(DeclineReason::CardDeclined);
        }

        let reference = format!(
            "DUMMY-{}",
            &Uuid::new_v4().simple().to_string().to_uppercase()[..12]
        );
        debug!(amount_cents, reference = %reference, "Dummy gateway approved charge");
        Ok(reference)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str) -> PaymentCard {
        PaymentCard {
            number: number.to_string(),
            exp_month: "12".to_string(),
            exp_year: "2030".to_string(),
            cvc: "123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_approves_magic_card() {
        let gateway = DummyGateway::default();
        let reference = gateway
            .authorize(&card("4242424242424242"), 10_000)
            .await
            .unwrap();
        assert!(reference.starts_with("DUMMY-"));
        assert_eq!(reference.len(), "DUMMY-".len() + 12);
    }

    #[tokio::test]
    async fn test_ignores_spaces_and_dashes() {
        let gateway = DummyGateway::default();
        assert!(gateway
            .authorize(&card("4242 4242-4242 4242"), 500)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_declines_other_cards() {
        let gateway = DummyGateway::default();
        let err = gateway
            .authorize(&card("4000000000000002"), 10_000)
            .await
            .unwrap_err();
        assert_eq!(err, DeclineReason::CardDeclined);
    }

    #[tokio::test]
    async fn test_rejects_missing_details() {
        let gateway = DummyGateway::default();
        let mut incomplete = card("4242424242424242");
        incomplete.cvc = "  ".to_string();
        let err = gateway.authorize(&incomplete, 10_000).await.unwrap_err();
        assert_eq!(err, DeclineReason::MissingDetails);
    }

    #[tokio::test]
    async fn test_disabled_gateway_refuses_everything() {
        let gateway = DummyGateway::new(false);
        let err = gateway
            .authorize(&card("4242424242424242"), 10_000)
            .await
            .unwrap_err();
        assert_eq!(err, DeclineReason::GatewayDisabled);
    }

    #[tokio::test]
    async fn test_references_are_unique() {
        let gateway = DummyGateway::default();
        let a = gateway.authorize(&card(DUMMY_APPROVED_CARD), 1).await.unwrap();
        let b = gateway.authorize(&card(DUMMY_APPROVED_CARD), 1).await.unwrap();
        assert_ne!(a, b);
    }
}
