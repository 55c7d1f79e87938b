//! View contexts handed to the presentation layer

use serde::Serialize;

use crate::db::{
    Category, CommentWithAuthor, FeedComment, Restaurant, RestaurantStats, RestaurantWithCategory,
    User,
};
use crate::models::PaginationDescriptor;

/// Characters of description kept in list views
pub const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// First 50 characters of a description, no ellipsis.
pub fn truncate_description(description: &str) -> String {
    description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect()
}

/// Restaurant row in a listing
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantView {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub category: Option<Category>,
    pub is_favorited: bool,
    pub is_liked: bool,
}

/// GET /restaurants
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantsPage {
    pub restaurants: Vec<RestaurantView>,
    pub categories: Vec<Category>,
    pub category_id: Option<i64>,
    pub total_count: i64,
    pub pagination: PaginationDescriptor,
}

/// GET /restaurants/{id}
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantDetailView {
    /// Counter as read before this request's increment
    pub restaurant: Restaurant,
    pub category: Option<Category>,
    pub comments: Vec<CommentWithAuthor>,
    pub favorited_users: Vec<User>,
    pub liked_users: Vec<User>,
    pub is_favorited: bool,
    pub is_liked: bool,
}

/// GET /restaurants/{id}/dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub restaurant: Restaurant,
    pub category: Option<Category>,
    #[serde(flatten)]
    pub stats: RestaurantStats,
}

/// GET /restaurants/feeds
#[derive(Debug, Clone, Serialize)]
pub struct FeedsView {
    pub restaurants: Vec<RestaurantWithCategory>,
    pub comments: Vec<FeedComment>,
}

/// Entry in the top-restaurants ranking
#[derive(Debug, Clone, Serialize)]
pub struct TopRestaurantView {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub favorited_count: i64,
    pub is_favorited: bool,
}

/// GET /admin/restaurants
#[derive(Debug, Clone, Serialize)]
pub struct AdminRestaurantsPage {
    pub restaurants: Vec<RestaurantWithCategory>,
    pub pagination: PaginationDescriptor,
}
