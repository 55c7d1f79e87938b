//! In-memory store for tests and local demos
//!
//! Mirrors the Postgres store's ordering and constraint behavior. Timestamps
//! come from a deterministic clock that advances one second per insert.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::RwLock;

use crate::models::{CommentText, Paginated, Pagination};

use super::records::{
    Category, Comment, CommentWithAuthor, FeedComment, RankCandidate, ReactionKind, Restaurant,
    RestaurantStats, RestaurantWithCategory, User, UserReactions,
};
use super::store::{DbError, RestaurantStore};

/// Restaurant to seed into a `MemoryStore`
#[derive(Debug, Clone, Default)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewRestaurant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

#[derive(Default)]
struct MemoryData {
    categories: Vec<Category>,
    users: Vec<User>,
    restaurants: Vec<Restaurant>,
    comments: Vec<Comment>,
    /// (user_id, restaurant_id)
    favorites: BTreeSet<(i64, i64)>,
    likes: BTreeSet<(i64, i64)>,
    last_id: i64,
    ticks: i64,
}

impl MemoryData {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        epoch() + Duration::seconds(self.ticks)
    }

    fn category(&self, id: Option<i64>) -> Option<Category> {
        id.and_then(|id| self.categories.iter().find(|c| c.id == id).cloned())
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn restaurant(&self, id: i64) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    fn with_category(&self, restaurant: &Restaurant) -> RestaurantWithCategory {
        RestaurantWithCategory {
            restaurant: restaurant.clone(),
            category: self.category(restaurant.category_id),
        }
    }

    fn reactions(&self, kind: ReactionKind) -> &BTreeSet<(i64, i64)> {
        match kind {
            ReactionKind::Favorite => &self.favorites,
            ReactionKind::Like => &self.likes,
        }
    }

    fn reactions_mut(&mut self, kind: ReactionKind) -> &mut BTreeSet<(i64, i64)> {
        match kind {
            ReactionKind::Favorite => &mut self.favorites,
            ReactionKind::Like => &mut self.likes,
        }
    }

    fn reacting_users(&self, kind: ReactionKind, restaurant_id: i64) -> Vec<User> {
        let mut users: Vec<User> = self
            .reactions(kind)
            .iter()
            .filter(|(_, r)| *r == restaurant_id)
            .filter_map(|(u, _)| self.user(*u).cloned())
            .collect();
        users.sort_by_key(|u| u.id);
        users
    }

    fn ensure_refs(&self, user_id: i64, restaurant_id: i64) -> Result<(), DbError> {
        if self.user(user_id).is_none() {
            return Err(DbError::not_found("user", user_id));
        }
        if self.restaurant(restaurant_id).is_none() {
            return Err(DbError::not_found("restaurant", restaurant_id));
        }
        Ok(())
    }
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Store holding everything in process memory
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable database: every call fails until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolClosed));
        }
        Ok(())
    }

    pub async fn add_category(&self, name: &str) -> Category {
        let mut data = self.data.write().await;
        let category = Category {
            id: data.next_id(),
            name: name.to_owned(),
        };
        data.categories.push(category.clone());
        category
    }

    pub async fn add_user(&self, name: &str, is_admin: bool) -> User {
        let mut data = self.data.write().await;
        let user = User {
            id: data.next_id(),
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
            is_admin,
            created_at: data.now(),
        };
        data.users.push(user.clone());
        user
    }

    pub async fn add_restaurant(&self, new: NewRestaurant) -> Restaurant {
        let mut data = self.data.write().await;
        let id = data.next_id();
        let now = data.now();
        let restaurant = Restaurant {
            id,
            name: new.name,
            tel: String::new(),
            address: String::new(),
            opening_hours: String::new(),
            description: new.description,
            image: None,
            view_counts: 0,
            category_id: new.category_id,
            created_at: new.created_at.unwrap_or(now),
        };
        data.restaurants.push(restaurant.clone());
        restaurant
    }

    /// Current stored counter, bypassing the availability switch.
    pub async fn view_count(&self, restaurant_id: i64) -> Option<i64> {
        let data = self.data.read().await;
        data.restaurant(restaurant_id).map(|r| r.view_counts)
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    async fn list_restaurants(
        &self,
        category_id: Option<i64>,
        page: Pagination,
    ) -> Result<Paginated<RestaurantWithCategory>, DbError> {
        self.check()?;
        let data = self.data.read().await;

        let mut matching: Vec<&Restaurant> = data
            .restaurants
            .iter()
            .filter(|r| category_id.is_none() || r.category_id == category_id)
            .collect();
        matching.sort_by_key(|r| r.id);

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|r| data.with_category(r))
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let mut categories = data.categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantWithCategory>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data.restaurant(id).map(|r| data.with_category(r)))
    }

    async fn restaurant_comments(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let mut comments: Vec<CommentWithAuthor> = data
            .comments
            .iter()
            .filter(|c| c.restaurant_id == restaurant_id)
            .filter_map(|c| {
                data.user(c.user_id).map(|user| CommentWithAuthor {
                    comment: c.clone(),
                    user: user.clone(),
                })
            })
            .collect();
        comments.sort_by(|a, b| {
            (b.comment.created_at, b.comment.id).cmp(&(a.comment.created_at, a.comment.id))
        });
        Ok(comments)
    }

    async fn favorited_users(&self, restaurant_id: i64) -> Result<Vec<User>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data.reacting_users(ReactionKind::Favorite, restaurant_id))
    }

    async fn liked_users(&self, restaurant_id: i64) -> Result<Vec<User>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data.reacting_users(ReactionKind::Like, restaurant_id))
    }

    async fn restaurant_stats(&self, restaurant_id: i64) -> Result<RestaurantStats, DbError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(RestaurantStats {
            comment_count: data
                .comments
                .iter()
                .filter(|c| c.restaurant_id == restaurant_id)
                .count() as i64,
            favorited_count: data
                .favorites
                .iter()
                .filter(|(_, r)| *r == restaurant_id)
                .count() as i64,
        })
    }

    async fn increment_view_count(&self, restaurant_id: i64) -> Result<(), DbError> {
        self.check()?;
        let mut data = self.data.write().await;
        let restaurant = data
            .restaurants
            .iter_mut()
            .find(|r| r.id == restaurant_id)
            .ok_or_else(|| DbError::not_found("restaurant", restaurant_id))?;
        restaurant.view_counts += 1;
        Ok(())
    }

    async fn recent_restaurants(&self, limit: u32) -> Result<Vec<RestaurantWithCategory>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let mut restaurants: Vec<&Restaurant> = data.restaurants.iter().collect();
        restaurants.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(restaurants
            .into_iter()
            .take(limit as usize)
            .map(|r| data.with_category(r))
            .collect())
    }

    async fn recent_comments(&self, limit: u32) -> Result<Vec<FeedComment>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let mut comments: Vec<&Comment> = data.comments.iter().collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(comments
            .into_iter()
            .filter_map(|c| {
                let user = data.user(c.user_id)?.clone();
                let restaurant = data.restaurant(c.restaurant_id)?.clone();
                Some(FeedComment {
                    comment: c.clone(),
                    user,
                    restaurant,
                })
            })
            .take(limit as usize)
            .collect())
    }

    async fn rank_candidates(&self, limit: u32) -> Result<Vec<RankCandidate>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let mut restaurants: Vec<&Restaurant> = data.restaurants.iter().collect();
        restaurants.sort_by_key(|r| r.id);
        Ok(restaurants
            .into_iter()
            .take(limit as usize)
            .map(|r| RankCandidate {
                restaurant: r.clone(),
                favorited_count: data.favorites.iter().filter(|(_, id)| *id == r.id).count()
                    as i64,
            })
            .collect())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        Ok(data.user(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let mut users = data.users.clone();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn set_user_admin(&self, id: i64, is_admin: bool) -> Result<Option<User>, DbError> {
        self.check()?;
        let mut data = self.data.write().await;
        Ok(data.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.is_admin = is_admin;
            user.clone()
        }))
    }

    async fn user_reactions(&self, user_id: i64) -> Result<UserReactions, DbError> {
        self.check()?;
        let data = self.data.read().await;
        let ids = |set: &BTreeSet<(i64, i64)>| {
            let mut ids: Vec<i64> = set
                .iter()
                .filter(|(u, _)| *u == user_id)
                .map(|(_, r)| *r)
                .collect();
            ids.sort_unstable();
            ids
        };
        Ok(UserReactions {
            favorited: ids(&data.favorites),
            liked: ids(&data.likes),
        })
    }

    async fn create_comment(
        &self,
        user_id: i64,
        restaurant_id: i64,
        text: &CommentText,
    ) -> Result<Comment, DbError> {
        self.check()?;
        let mut data = self.data.write().await;
        data.ensure_refs(user_id, restaurant_id)?;
        let comment = Comment {
            id: data.next_id(),
            text: text.as_str().to_owned(),
            user_id,
            restaurant_id,
            created_at: data.now(),
        };
        data.comments.push(comment.clone());
        Ok(comment)
    }

    async fn add_reaction(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError> {
        self.check()?;
        let mut data = self.data.write().await;
        data.ensure_refs(user_id, restaurant_id)?;
        data.reactions_mut(kind).insert((user_id, restaurant_id));
        Ok(())
    }

    async fn remove_reaction(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError> {
        self.check()?;
        let mut data = self.data.write().await;
        data.reactions_mut(kind).remove(&(user_id, restaurant_id));
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.check()
    }
}
