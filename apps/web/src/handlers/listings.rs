//! Listing browse/search and seller CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::info;

use openlot_core::validation::{
    validate_description, validate_location, validate_mileage, validate_title, validate_year,
};
use openlot_core::{Listing, ListingStatus, Money, DEFAULT_CURRENCY};
use openlot_db::repository::listing::{generate_listing_id, ListingSearch};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

const SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub make: Option<String>,
    pub min_year: Option<i64>,
    pub max_price_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub mileage: i64,
    /// Decimal amount, e.g. "12000" or "12000.50".
    pub price: String,
    pub location: String,
    pub description: String,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub title: String,
    pub price: String,
    pub location: String,
    pub description: String,
}

pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let filters = ListingSearch {
        query: params.q,
        make: params.make,
        min_year: params.min_year,
        max_price_cents: params.max_price_cents,
    };
    let listings = state.db.listings().search(&filters, SEARCH_LIMIT).await?;
    Ok(Json(listings))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let listing = state
        .db
        .listings()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Listing not found: {id}")))?;
    Ok(Json(listing))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<Listing>), ApiError> {
    validate_title(&req.title)?;
    validate_year(req.year, i64::from(Utc::now().year()))?;
    validate_mileage(req.mileage)?;
    validate_location(&req.location)?;
    validate_description(&req.description)?;
    let price = Money::parse(&req.price)?;

    let now = Utc::now();
    let listing = Listing {
        id: generate_listing_id(),
        seller_id: user.id,
        title: req.title.trim().to_string(),
        make: req.make.trim().to_string(),
        model: req.model.trim().to_string(),
        year: req.year,
        mileage: req.mileage,
        price_cents: price.cents(),
        currency: req.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        location: req.location.trim().to_string(),
        description: req.description.trim().to_string(),
        status: ListingStatus::Active,
        created_at: now,
        updated_at: now,
    };

    state.db.listings().insert(&listing).await?;
    info!(listing_id = %listing.id, seller_id = %listing.seller_id, "Listing created");

    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn my_listings(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = state.db.listings().list_by_seller(&user.id).await?;
    Ok(Json(listings))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<Listing>, ApiError> {
    validate_title(&req.title)?;
    validate_location(&req.location)?;
    validate_description(&req.description)?;
    let price = Money::parse(&req.price)?;

    state
        .db
        .listings()
        .update_owned(
            &id,
            &user.id,
            req.title.trim(),
            price.cents(),
            req.location.trim(),
            req.description.trim(),
        )
        .await?;

    detail(State(state), Path(id)).await
}

pub async fn mark_sold(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let transitioned = state.db.listings().mark_sold_single(&id, &user.id).await?;
    if !transitioned {
        return Err(ApiError::Conflict(
            "listing is not active or not yours".to_string(),
        ));
    }
    info!(listing_id = %id, "Listing marked sold by seller");
    detail(State(state), Path(id)).await
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // A purchased listing is FK-protected; the violation maps to 409
    state.db.listings().delete_owned(&id, &user.id).await?;
    info!(listing_id = %id, "Listing deleted");
    Ok(StatusCode::NO_CONTENT)
}
