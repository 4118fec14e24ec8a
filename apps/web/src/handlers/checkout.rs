//! The checkout endpoint: cart -> engine -> receipt.
//!
//! Gated by [`CheckoutSurface`] (cart + checkout capabilities) before any
//! other extractor runs; the dummy-payments capability is resolved per
//! request and passed to the gateway, so switching payments off declines
//! new checkouts without a restart.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use openlot_checkout::{CheckoutEngine, DummyGateway};
use openlot_core::{Capability, PaymentCard, PurchaseReceipt};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::flags::CheckoutSurface;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub card_number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
}

pub async fn checkout(
    _gate: CheckoutSurface,
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<PurchaseReceipt>, ApiError> {
    let card = PaymentCard {
        number: req.card_number,
        exp_month: req.exp_month,
        exp_year: req.exp_year,
        cvc: req.cvc,
    };

    let dummy_enabled = state.capability_enabled(Capability::DummyPayments);
    let engine = CheckoutEngine::new(state.db.clone(), DummyGateway::new(dummy_enabled))
        .with_payment_timeout(state.payment_timeout);

    let ids = state.cart_ids(&user.id);
    let receipt = engine.attempt_purchase(&ids, &card).await?;

    // Only a committed purchase empties the cart
    state.clear_cart(&user.id);
    info!(user_id = %user.id, purchase_id = %receipt.purchase_id, "Checkout succeeded");

    Ok(Json(receipt))
}
