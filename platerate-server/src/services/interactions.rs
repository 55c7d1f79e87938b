//! Comments, favorites and likes posted by signed-in users

use crate::db::{Comment, DbError, ReactionKind, RestaurantStore};
use crate::models::CommentText;

pub struct InteractionService<'a> {
    store: &'a dyn RestaurantStore,
}

impl<'a> InteractionService<'a> {
    pub fn new(store: &'a dyn RestaurantStore) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, text))]
    pub async fn post_comment(
        &self,
        user_id: i64,
        restaurant_id: i64,
        text: CommentText,
    ) -> Result<Comment, DbError> {
        let comment = self
            .store
            .create_comment(user_id, restaurant_id, &text)
            .await?;
        tracing::info!(comment_id = comment.id, "comment posted");
        Ok(comment)
    }

    /// Record a favorite or like. Repeating it is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn react(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError> {
        self.store.add_reaction(kind, user_id, restaurant_id).await
    }

    /// Remove a favorite or like. Removing a missing one is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn unreact(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError> {
        self.store
            .remove_reaction(kind, user_id, restaurant_id)
            .await
    }

    pub async fn add_favorite(&self, user_id: i64, restaurant_id: i64) -> Result<(), DbError> {
        self.react(ReactionKind::Favorite, user_id, restaurant_id).await
    }

    pub async fn remove_favorite(&self, user_id: i64, restaurant_id: i64) -> Result<(), DbError> {
        self.unreact(ReactionKind::Favorite, user_id, restaurant_id).await
    }

    pub async fn add_like(&self, user_id: i64, restaurant_id: i64) -> Result<(), DbError> {
        self.react(ReactionKind::Like, user_id, restaurant_id).await
    }

    pub async fn remove_like(&self, user_id: i64, restaurant_id: i64) -> Result<(), DbError> {
        self.unreact(ReactionKind::Like, user_id, restaurant_id).await
    }
}
