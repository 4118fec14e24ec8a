//! Registration and login.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use openlot_core::validation::{validate_email, validate_name, validate_password};
use openlot_core::User;
use openlot_db::repository::user::generate_user_id;

use crate::auth::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    let user = User {
        id: generate_user_id(),
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password_hash: hash_password(&req.password)?,
        created_at: Utc::now(),
    };

    // Duplicate email surfaces as a unique violation -> 409
    state.db.users().insert(&user).await?;

    info!(user_id = %user.id, "User registered");

    let token = state.auth.issue_token(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserView {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("invalid email or password".to_string());

    let user = state
        .db
        .users()
        .find_by_email(req.email.trim().to_lowercase().as_str())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.auth.issue_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: UserView {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}
