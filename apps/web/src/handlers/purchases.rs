//! Receipt lookup.

use axum::extract::{Path, State};
use axum::Json;

use openlot_core::PurchaseReceipt;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_purchase(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<PurchaseReceipt>, ApiError> {
    let receipt = state
        .db
        .purchases()
        .get_receipt(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Purchase not found: {id}")))?;
    Ok(Json(receipt))
}
