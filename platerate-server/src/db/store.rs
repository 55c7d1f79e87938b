//! Persistence seam for the query services
//!
//! Services depend on `RestaurantStore` rather than on a pool directly so
//! the same logic runs against Postgres and the in-memory test store.

use async_trait::async_trait;

use crate::models::{CommentText, Paginated, Pagination};

use super::records::{
    Category, Comment, CommentWithAuthor, FeedComment, RankCandidate, ReactionKind,
    RestaurantStats, RestaurantWithCategory, User, UserReactions,
};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Read and write operations needed by the services.
///
/// Implementations never retry; failures surface to the caller as-is.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// One page of restaurants (id ascending) plus the unpaginated total of the filtered set.
    async fn list_restaurants(
        &self,
        category_id: Option<i64>,
        page: Pagination,
    ) -> Result<Paginated<RestaurantWithCategory>, DbError>;

    async fn list_categories(&self) -> Result<Vec<Category>, DbError>;

    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantWithCategory>, DbError>;

    /// Comments on a restaurant, newest first.
    async fn restaurant_comments(&self, restaurant_id: i64)
        -> Result<Vec<CommentWithAuthor>, DbError>;

    async fn favorited_users(&self, restaurant_id: i64) -> Result<Vec<User>, DbError>;

    async fn liked_users(&self, restaurant_id: i64) -> Result<Vec<User>, DbError>;

    async fn restaurant_stats(&self, restaurant_id: i64) -> Result<RestaurantStats, DbError>;

    /// Atomically add one to the view counter.
    async fn increment_view_count(&self, restaurant_id: i64) -> Result<(), DbError>;

    /// Newest restaurants, `created_at` then id descending.
    async fn recent_restaurants(&self, limit: u32) -> Result<Vec<RestaurantWithCategory>, DbError>;

    /// Newest comments, `created_at` then id descending.
    async fn recent_comments(&self, limit: u32) -> Result<Vec<FeedComment>, DbError>;

    /// First `limit` restaurants by id, each with its favorite count. Unsorted by count.
    async fn rank_candidates(&self, limit: u32) -> Result<Vec<RankCandidate>, DbError>;

    async fn find_user(&self, id: i64) -> Result<Option<User>, DbError>;

    async fn list_users(&self) -> Result<Vec<User>, DbError>;

    /// Returns `None` when the user does not exist.
    async fn set_user_admin(&self, id: i64, is_admin: bool) -> Result<Option<User>, DbError>;

    async fn user_reactions(&self, user_id: i64) -> Result<UserReactions, DbError>;

    async fn create_comment(
        &self,
        user_id: i64,
        restaurant_id: i64,
        text: &CommentText,
    ) -> Result<Comment, DbError>;

    /// Insert a join row; inserting an existing pair is a no-op.
    async fn add_reaction(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError>;

    async fn remove_reaction(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<(), DbError>;
}
