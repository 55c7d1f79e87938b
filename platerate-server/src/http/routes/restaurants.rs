//! Restaurant browsing endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, ValidId};
use crate::http::server::AppState;
use crate::models::ListQuery;
use crate::services::{
    DashboardView, FeedsView, RestaurantDetailView, RestaurantService, RestaurantsPage,
    TopRestaurantView, DEFAULT_TOP_CANDIDATES,
};

/// GET / - landing page is the restaurant list
async fn index() -> Redirect {
    Redirect::to("/restaurants")
}

/// GET /restaurants - paginated list, optionally filtered by `categoryId`
async fn list_restaurants(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<RestaurantsPage>, ApiError> {
    let page = RestaurantService::new(state.store.as_ref())
        .list_restaurants(query.normalize(), Some(user.id))
        .await?;
    Ok(Json(page))
}

/// GET /restaurants/{id} - full restaurant, counts a view
async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<RestaurantDetailView>, ApiError> {
    let detail = RestaurantService::new(state.store.as_ref())
        .get_restaurant_detail(id, Some(user.id))
        .await?;
    Ok(Json(detail))
}

/// GET /restaurants/{id}/dashboard - summary without counting a view
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    ValidId(id): ValidId,
) -> Result<Json<DashboardView>, ApiError> {
    let dashboard = RestaurantService::new(state.store.as_ref())
        .get_dashboard(id)
        .await?;
    Ok(Json(dashboard))
}

/// GET /restaurants/feeds - newest restaurants and comments
async fn get_feeds(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<FeedsView>, ApiError> {
    let feeds = RestaurantService::new(state.store.as_ref())
        .get_feeds()
        .await?;
    Ok(Json(feeds))
}

/// GET /restaurants/top - most favorited among the candidate pool
async fn get_top_restaurants(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TopRestaurantView>>, ApiError> {
    let top = RestaurantService::new(state.store.as_ref())
        .top_restaurants(DEFAULT_TOP_CANDIDATES, Some(user.id))
        .await?;
    Ok(Json(top))
}

/// Restaurant routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/feeds", get(get_feeds))
        .route("/restaurants/top", get(get_top_restaurants))
        .route("/restaurants/{id}", get(get_restaurant))
        .route("/restaurants/{id}/dashboard", get(get_dashboard))
}
