//! Favorite and like toggles

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::services::InteractionService;

/// POST /favorite/{restaurant_id}
async fn add_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidId(restaurant_id): ValidId,
) -> Result<StatusCode, ApiError> {
    InteractionService::new(state.store.as_ref())
        .add_favorite(user.id, restaurant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /favorite/{restaurant_id}
async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidId(restaurant_id): ValidId,
) -> Result<StatusCode, ApiError> {
    InteractionService::new(state.store.as_ref())
        .remove_favorite(user.id, restaurant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /like/{restaurant_id}
async fn add_like(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidId(restaurant_id): ValidId,
) -> Result<StatusCode, ApiError> {
    InteractionService::new(state.store.as_ref())
        .add_like(user.id, restaurant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /like/{restaurant_id}
async fn remove_like(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidId(restaurant_id): ValidId,
) -> Result<StatusCode, ApiError> {
    InteractionService::new(state.store.as_ref())
        .remove_like(user.id, restaurant_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reaction routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/favorite/{restaurant_id}", post(add_favorite).delete(remove_favorite))
        .route("/like/{restaurant_id}", post(add_like).delete(remove_like))
}
