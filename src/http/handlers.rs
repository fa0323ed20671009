//! Request handlers for the users API.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::http::response::{ApiError, Data};
use crate::http::server::AppState;
use crate::users::{NewUser, User, UserPatch};

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Data<Vec<User>> {
    Data {
        data: state.store.all().await,
    }
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Data<User>, ApiError> {
    let id = parse_user_id(&id)?;
    state
        .store
        .get(id)
        .await
        .map(|user| Data { data: user })
        .ok_or(ApiError::UserNotFound)
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Data<User>), ApiError> {
    let new_user = parse_new_user(&body)?;
    let user = state.store.create(new_user).await;
    tracing::info!(id = %user.id, username = %user.username, "user created");

    state.replicator.publish(state.store.all().await);
    Ok((StatusCode::CREATED, Data { data: user }))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Data<User>, ApiError> {
    let id = parse_user_id(&id)?;
    if state.store.get(id).await.is_none() {
        return Err(ApiError::UserNotFound);
    }

    let patch = parse_patch(&body)?;
    let user = state
        .store
        .update(id, patch)
        .await
        .ok_or(ApiError::UserNotFound)?;
    tracing::info!(id = %user.id, "user updated");

    state.replicator.publish(state.store.all().await);
    Ok(Data { data: user })
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;
    if !state.store.remove(id).await {
        return Err(ApiError::UserNotFound);
    }
    tracing::info!(%id, "user deleted");

    state.replicator.publish(state.store.all().await);
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for paths outside the route table.
pub async fn unmatched_route() -> ApiError {
    ApiError::RouteNotFound
}

/// Fallback for known paths hit with an unsupported verb.
pub async fn method_not_supported() -> ApiError {
    ApiError::MethodNotSupported
}

/// Strict UUID validation; the store is never consulted for a malformed id.
fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::try_parse(raw).map_err(|_| ApiError::InvalidUserId)
}

/// A creation body must be present, parseable, and complete. Malformed JSON
/// is treated the same as an absent body.
fn parse_new_user(body: &Bytes) -> Result<NewUser, ApiError> {
    if body.is_empty() {
        return Err(ApiError::MissingBody);
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::MissingBody)?;
    let new_user: NewUser =
        serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    if new_user.username.trim().is_empty() {
        return Err(ApiError::InvalidBody(
            "username must be a non-empty string".to_string(),
        ));
    }
    Ok(new_user)
}

/// An update body is optional: absent or malformed JSON becomes an empty
/// patch, while a present field of the wrong type is rejected.
fn parse_patch(body: &Bytes) -> Result<UserPatch, ApiError> {
    if body.is_empty() {
        return Ok(UserPatch::default());
    }
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return Ok(UserPatch::default());
    };
    serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))
}
