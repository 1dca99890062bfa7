use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{LoginRequest, PhoneUpdateRequest, StatusUpdateRequest, VehicleUpdateRequest};
use super::repo::UserProfile;

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/:email", get(get_user))
        .route(
            "/user/:email/vehicle",
            put(set_vehicle).delete(clear_vehicle),
        )
        .route("/user/:email/phone", put(set_phone).delete(clear_phone))
        .route("/user/:email/status", put(update_status))
}

/// Find-or-create keyed by email. A repeat login refreshes name, avatar and
/// login_time and leaves the registered fields alone.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_lowercase();
    if email.is_empty() {
        warn!("login without email");
        return Err(ApiError::Validation("Email is required".into()));
    }

    if UserProfile::find_by_email(&state.db, &email).await?.is_some() {
        let user = UserProfile::refresh_login(
            &state.db,
            &email,
            payload.name.as_deref(),
            payload.avatar.as_deref(),
        )
        .await?
        .ok_or_else(|| {
            ApiError::Internal(anyhow::anyhow!("user row vanished during login refresh"))
        })?;
        info!(email = %user.email, "login refreshed");
        return Ok(Json(user));
    }

    let (Some(name), Some(provider)) = (payload.name.as_deref(), payload.provider.as_deref())
    else {
        warn!(%email, "first login missing name or provider");
        return Err(ApiError::Validation("Name and provider are required".into()));
    };

    let user = UserProfile::create(
        &state.db,
        &email,
        name,
        provider,
        payload.avatar.as_deref(),
    )
    .await?;
    info!(email = %user.email, provider = %user.provider, "profile created");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = UserProfile::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

/// Overwrites with whatever the body carries; an absent or null field
/// writes NULL, same as the DELETE route.
#[instrument(skip(state, payload))]
pub async fn set_vehicle(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<VehicleUpdateRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user =
        UserProfile::set_vehicle_number(&state.db, &email, payload.vehicle_number.as_deref())
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(email = %user.email, "vehicle number updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn clear_vehicle(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = UserProfile::set_vehicle_number(&state.db, &email, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(email = %user.email, "vehicle number cleared");
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn set_phone(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<PhoneUpdateRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = UserProfile::set_phone_number(&state.db, &email, payload.phone_number.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(email = %user.email, "phone number updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn clear_phone(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = UserProfile::set_phone_number(&state.db, &email, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(email = %user.email, "phone number cleared");
    Ok(Json(user))
}

/// The key only moves to a non-empty value; the message follows the payload,
/// empty string included. Load-merge-store keeps that rule in one place.
#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let current = UserProfile::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let (status_key, status_message) = payload.merged(&current);

    let user = UserProfile::set_status(&state.db, &email, &status_key, status_message.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(email = %user.email, status_key = %user.status_key, "status updated");
    Ok(Json(user))
}
