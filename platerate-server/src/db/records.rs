//! Records read from the database
//!
//! Joined shapes (restaurant + category, comment + author) are assembled
//! by hand from aliased columns rather than nested `FromRow` derives.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Restaurant category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Registered user. Credentials live with the auth layer and are never read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Restaurant record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub tel: String,
    pub address: String,
    pub opening_hours: String,
    pub description: String,
    pub image: Option<String>,
    pub view_counts: i64,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Restaurant joined with its (optional) category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantWithCategory {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub category: Option<Category>,
}

/// Comment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

/// Comment joined with its author and target restaurant, for the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
    pub restaurant: Restaurant,
}

/// Candidate for the top-restaurants ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankCandidate {
    pub restaurant: Restaurant,
    pub favorited_count: i64,
}

/// Aggregate counts shown on the restaurant dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestaurantStats {
    pub comment_count: i64,
    pub favorited_count: i64,
}

/// Restaurant ids a user has favorited and liked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserReactions {
    pub favorited: Vec<i64>,
    pub liked: Vec<i64>,
}

impl UserReactions {
    pub fn has_favorited(&self, restaurant_id: i64) -> bool {
        self.favorited.contains(&restaurant_id)
    }

    pub fn has_liked(&self, restaurant_id: i64) -> bool {
        self.liked.contains(&restaurant_id)
    }
}

/// User-to-restaurant join tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Favorite,
    Like,
}

impl ReactionKind {
    /// Backing join table
    pub fn table(&self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::Like => "likes",
        }
    }
}
