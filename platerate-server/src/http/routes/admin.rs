//! Admin panel endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::User;
use crate::http::error::ApiError;
use crate::http::extractors::{AdminUser, ValidId};
use crate::http::server::AppState;
use crate::models::ListQuery;
use crate::services::{AdminRestaurantsPage, AdminService};

/// Role change request
#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub is_admin: bool,
}

/// GET /admin - admin landing is the restaurant table
async fn index(AdminUser(_admin): AdminUser) -> Redirect {
    Redirect::to("/admin/restaurants")
}

/// GET /admin/restaurants
async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<AdminRestaurantsPage>, ApiError> {
    let page = AdminService::new(state.store.as_ref())
        .list_restaurants(query.normalize().pagination)
        .await?;
    Ok(Json(page))
}

/// GET /admin/users
async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = AdminService::new(state.store.as_ref()).list_users().await?;
    Ok(Json(users))
}

/// PATCH /admin/users/{id}
async fn set_role(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ValidId(id): ValidId,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<User>, ApiError> {
    let user = AdminService::new(state.store.as_ref())
        .set_role(admin.id, id, req.is_admin)
        .await?;
    Ok(Json(user))
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(index))
        .route("/admin/restaurants", get(list_restaurants))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{id}", axum::routing::patch(set_role))
}
