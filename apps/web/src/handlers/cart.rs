//! The buyer's cart, gated by the cart capability.
//!
//! Every handler takes [`CartSurface`] as its first argument: when the
//! capability is off the whole surface answers 404 before any other
//! extractor runs, as if the routes did not exist.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use openlot_core::{CoreError, Listing};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::flags::CartSurface;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<Listing>,
    pub subtotal_cents: i64,
}

pub async fn get_cart(
    _gate: CartSurface,
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CartView>, ApiError> {
    // Ids whose listing was deleted since are silently dropped here; the
    // checkout path is stricter and fails the whole attempt
    let ids = state.cart_ids(&user.id);
    let items = state.db.listings().get_many(&ids).await?;
    let subtotal_cents = items
        .iter()
        .filter(|listing| listing.is_active())
        .map(|listing| listing.price_cents)
        .sum();

    Ok(Json(CartView {
        items,
        subtotal_cents,
    }))
}

pub async fn add_item(
    _gate: CartSurface,
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let listing = state
        .db
        .listings()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::from(CoreError::ListingNotFound(id.clone())))?;

    if !listing.is_active() {
        return Err(CoreError::ListingNotActive(id).into());
    }

    state.with_cart(&user.id, |cart| cart.add(listing.id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_item(
    _gate: CartSurface,
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = state.with_cart(&user.id, |cart| cart.remove(&id));
    if !removed {
        return Err(ApiError::NotFound(format!("Listing not in cart: {id}")));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cart(
    _gate: CartSurface,
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    state.clear_cart(&user.id);
    Ok(StatusCode::NO_CONTENT)
}
