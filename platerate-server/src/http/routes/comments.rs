//! Comment endpoint

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use crate::db::Comment;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;
use crate::models::CommentText;
use crate::services::InteractionService;

/// Create comment request
#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub restaurant_id: i64,
    pub text: String,
}

/// POST /comments - comment on a restaurant as the signed-in user
async fn create_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let text = CommentText::new(&req.text)?;

    let comment = InteractionService::new(state.store.as_ref())
        .post_comment(user.id, req.restaurant_id, text)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Comment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/comments", post(create_comment))
}
