//! Restaurant listing, detail, feeds and ranking reads
//!
//! Every operation takes the requesting user explicitly. A missing
//! requester is never an error: per-user flags simply come back `false`.

use crate::db::{DbError, RestaurantStore, UserReactions};
use crate::models::ListParams;

use super::views::{
    truncate_description, DashboardView, FeedsView, RestaurantDetailView, RestaurantView,
    RestaurantsPage, TopRestaurantView,
};

/// Restaurants and comments shown on the feeds page
pub const FEED_LIMIT: u32 = 10;

/// Size of the candidate pool ranked by `top_restaurants`
pub const DEFAULT_TOP_CANDIDATES: u32 = 10;

/// Read-side restaurant operations
pub struct RestaurantService<'a> {
    store: &'a dyn RestaurantStore,
}

impl<'a> RestaurantService<'a> {
    pub fn new(store: &'a dyn RestaurantStore) -> Self {
        Self { store }
    }

    async fn reactions_of(&self, requester: Option<i64>) -> Result<UserReactions, DbError> {
        match requester {
            Some(user_id) => self.store.user_reactions(user_id).await,
            None => Ok(UserReactions::default()),
        }
    }

    /// One page of restaurants, optionally filtered by category.
    ///
    /// The page, the category list and the requester's reactions are read
    /// concurrently; any failure fails the whole call.
    #[tracing::instrument(skip(self))]
    pub async fn list_restaurants(
        &self,
        params: ListParams,
        requester: Option<i64>,
    ) -> Result<RestaurantsPage, DbError> {
        let (page, categories, reactions) = tokio::try_join!(
            self.store
                .list_restaurants(params.category_id, params.pagination),
            self.store.list_categories(),
            self.reactions_of(requester),
        )?;

        tracing::debug!(total = page.total, rows = page.items.len(), "restaurants listed");

        let pagination = page.pagination();
        let total_count = page.total;
        let restaurants = page
            .items
            .into_iter()
            .map(|row| {
                let mut restaurant = row.restaurant;
                restaurant.description = truncate_description(&restaurant.description);
                RestaurantView {
                    is_favorited: reactions.has_favorited(restaurant.id),
                    is_liked: reactions.has_liked(restaurant.id),
                    restaurant,
                    category: row.category,
                }
            })
            .collect();

        Ok(RestaurantsPage {
            restaurants,
            categories,
            category_id: params.category_id,
            total_count,
            pagination,
        })
    }

    /// Full restaurant with comments and reacting users.
    ///
    /// Bumps the stored view counter after the reads succeed. The returned
    /// `view_counts` is the value read before that increment.
    #[tracing::instrument(skip(self))]
    pub async fn get_restaurant_detail(
        &self,
        id: i64,
        requester: Option<i64>,
    ) -> Result<RestaurantDetailView, DbError> {
        let found = self
            .store
            .find_restaurant(id)
            .await?
            .ok_or_else(|| DbError::not_found("restaurant", id))?;

        let (comments, favorited_users, liked_users) = tokio::try_join!(
            self.store.restaurant_comments(id),
            self.store.favorited_users(id),
            self.store.liked_users(id),
        )?;

        self.store.increment_view_count(id).await?;

        let is_favorited = requester.is_some_and(|uid| favorited_users.iter().any(|u| u.id == uid));
        let is_liked = requester.is_some_and(|uid| liked_users.iter().any(|u| u.id == uid));

        Ok(RestaurantDetailView {
            restaurant: found.restaurant,
            category: found.category,
            comments,
            favorited_users,
            liked_users,
            is_favorited,
            is_liked,
        })
    }

    /// Restaurant summary with counts. Does not touch the view counter.
    #[tracing::instrument(skip(self))]
    pub async fn get_dashboard(&self, id: i64) -> Result<DashboardView, DbError> {
        let (found, stats) = tokio::try_join!(
            self.store.find_restaurant(id),
            self.store.restaurant_stats(id),
        )?;
        let found = found.ok_or_else(|| DbError::not_found("restaurant", id))?;

        Ok(DashboardView {
            restaurant: found.restaurant,
            category: found.category,
            stats,
        })
    }

    /// Newest restaurants and newest comments.
    #[tracing::instrument(skip(self))]
    pub async fn get_feeds(&self) -> Result<FeedsView, DbError> {
        let (restaurants, comments) = tokio::try_join!(
            self.store.recent_restaurants(FEED_LIMIT),
            self.store.recent_comments(FEED_LIMIT),
        )?;
        Ok(FeedsView {
            restaurants,
            comments,
        })
    }

    /// Rank a bounded candidate pool by favorite count, most favorited first.
    ///
    /// Only the first `candidate_limit` restaurants (by id) are considered,
    /// so this is the top of that pool, not a global top-N. Ties keep
    /// candidate order.
    #[tracing::instrument(skip(self))]
    pub async fn top_restaurants(
        &self,
        candidate_limit: u32,
        requester: Option<i64>,
    ) -> Result<Vec<TopRestaurantView>, DbError> {
        let (candidates, reactions) = tokio::try_join!(
            self.store.rank_candidates(candidate_limit),
            self.reactions_of(requester),
        )?;

        let mut ranked: Vec<TopRestaurantView> = candidates
            .into_iter()
            .map(|candidate| {
                let mut restaurant = candidate.restaurant;
                restaurant.description = truncate_description(&restaurant.description);
                TopRestaurantView {
                    is_favorited: reactions.has_favorited(restaurant.id),
                    favorited_count: candidate.favorited_count,
                    restaurant,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.favorited_count.cmp(&a.favorited_count));

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, NewRestaurant, ReactionKind};
    use crate::models::{CommentText, ListQuery, Pagination};
    use chrono::{TimeZone, Utc};

    fn params(category_id: Option<&str>, page: u32, limit: u32) -> ListParams {
        ListQuery {
            category_id: category_id.map(String::from),
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
        }
        .normalize()
    }

    async fn seeded() -> (MemoryStore, Vec<i64>) {
        let store = MemoryStore::new();
        let thai = store.add_category("Thai").await;
        let diner = store.add_category("Diner").await;
        let mut ids = Vec::new();
        for i in 0..12 {
            let category = if i % 2 == 0 { thai.id } else { diner.id };
            let r = store
                .add_restaurant(
                    NewRestaurant::new(format!("Place {i}"))
                        .description("d".repeat(80))
                        .category(category),
                )
                .await;
            ids.push(r.id);
        }
        (store, ids)
    }

    #[tokio::test]
    async fn empty_category_filter_matches_no_filter() {
        let (store, _) = seeded().await;
        let service = RestaurantService::new(&store);

        let with_empty = service
            .list_restaurants(params(Some(""), 1, 9), None)
            .await
            .unwrap();
        let without = service
            .list_restaurants(params(None, 1, 9), None)
            .await
            .unwrap();

        let ids = |page: &RestaurantsPage| -> Vec<i64> {
            page.restaurants.iter().map(|r| r.restaurant.id).collect()
        };
        assert_eq!(ids(&with_empty), ids(&without));
        assert_eq!(with_empty.total_count, without.total_count);
        assert_eq!(with_empty.category_id, None);
    }

    #[tokio::test]
    async fn listing_paginates_with_unpaginated_total() {
        let (store, ids) = seeded().await;
        let service = RestaurantService::new(&store);

        let page = service
            .list_restaurants(params(None, 2, 9), None)
            .await
            .unwrap();
        assert_eq!(page.total_count, 12);
        assert_eq!(page.restaurants.len(), 3);
        assert_eq!(page.restaurants[0].restaurant.id, ids[9]);
        assert_eq!(page.pagination.total_page, 2);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.prev, 1);
        assert_eq!(page.pagination.next, 2);
        assert_eq!(page.categories.len(), 2);
    }

    #[tokio::test]
    async fn listing_filters_by_category() {
        let (store, _) = seeded().await;
        let categories = store.list_categories().await.unwrap();
        let thai = categories[0].id;
        let service = RestaurantService::new(&store);

        let page = service
            .list_restaurants(params(Some(&thai.to_string()), 1, 20), None)
            .await
            .unwrap();
        assert_eq!(page.total_count, 6);
        assert_eq!(page.category_id, Some(thai));
        assert!(page
            .restaurants
            .iter()
            .all(|r| r.restaurant.category_id == Some(thai)));
    }

    #[tokio::test]
    async fn listing_truncates_but_detail_does_not() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Reader", false).await;
        let service = RestaurantService::new(&store);

        let page = service
            .list_restaurants(params(None, 1, 20), Some(user.id))
            .await
            .unwrap();
        assert!(page
            .restaurants
            .iter()
            .all(|r| r.restaurant.description.chars().count() == 50));

        let detail = service
            .get_restaurant_detail(ids[0], Some(user.id))
            .await
            .unwrap();
        assert_eq!(detail.restaurant.description.chars().count(), 80);
    }

    #[tokio::test]
    async fn favorite_and_like_flags_follow_the_requester() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Fan", false).await;
        let other = store.add_user("Other", false).await;
        let (a, b) = (ids[0], ids[1]);
        store.add_reaction(ReactionKind::Favorite, user.id, a).await.unwrap();
        store.add_reaction(ReactionKind::Like, user.id, b).await.unwrap();
        store.add_reaction(ReactionKind::Favorite, other.id, b).await.unwrap();

        let service = RestaurantService::new(&store);
        let page = service
            .list_restaurants(params(None, 1, 20), Some(user.id))
            .await
            .unwrap();
        let view = |id: i64| page.restaurants.iter().find(|r| r.restaurant.id == id).unwrap();

        assert!(view(a).is_favorited);
        assert!(!view(a).is_liked);
        assert!(!view(b).is_favorited);
        assert!(view(b).is_liked);
    }

    #[tokio::test]
    async fn anonymous_listing_has_no_flags() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Fan", false).await;
        store
            .add_reaction(ReactionKind::Favorite, user.id, ids[0])
            .await
            .unwrap();

        let page = RestaurantService::new(&store)
            .list_restaurants(params(None, 1, 20), None)
            .await
            .unwrap();
        assert!(page.restaurants.iter().all(|r| !r.is_favorited && !r.is_liked));
    }

    #[tokio::test]
    async fn missing_restaurant_is_not_found_and_counts_nothing() {
        let (store, ids) = seeded().await;
        let service = RestaurantService::new(&store);

        let err = service.get_restaurant_detail(9_999, None).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "restaurant", .. }));

        for id in ids {
            assert_eq!(store.view_count(id).await, Some(0));
        }
    }

    #[tokio::test]
    async fn two_detail_reads_add_two_views() {
        let (store, ids) = seeded().await;
        let service = RestaurantService::new(&store);

        let first = service.get_restaurant_detail(ids[3], None).await.unwrap();
        let second = service.get_restaurant_detail(ids[3], None).await.unwrap();

        // Returned value is the pre-increment read
        assert_eq!(first.restaurant.view_counts, 0);
        assert_eq!(second.restaurant.view_counts, 1);
        assert_eq!(store.view_count(ids[3]).await, Some(2));
    }

    #[tokio::test]
    async fn detail_flags_and_comments() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Critic", false).await;
        let id = ids[2];
        store.add_reaction(ReactionKind::Favorite, user.id, id).await.unwrap();
        let text = CommentText::new("Solid curry").unwrap();
        store.create_comment(user.id, id, &text).await.unwrap();

        let service = RestaurantService::new(&store);
        let detail = service.get_restaurant_detail(id, Some(user.id)).await.unwrap();
        assert!(detail.is_favorited);
        assert!(!detail.is_liked);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].user.id, user.id);
        assert_eq!(detail.favorited_users.len(), 1);

        let anonymous = service.get_restaurant_detail(id, None).await.unwrap();
        assert!(!anonymous.is_favorited);
    }

    #[tokio::test]
    async fn dashboard_does_not_count_views() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Owner", false).await;
        store.add_reaction(ReactionKind::Favorite, user.id, ids[0]).await.unwrap();

        let dashboard = RestaurantService::new(&store)
            .get_dashboard(ids[0])
            .await
            .unwrap();
        assert_eq!(dashboard.stats.favorited_count, 1);
        assert_eq!(dashboard.stats.comment_count, 0);
        assert!(dashboard.category.is_some());
        assert_eq!(store.view_count(ids[0]).await, Some(0));
    }

    #[tokio::test]
    async fn dashboard_for_missing_restaurant_is_not_found() {
        let store = MemoryStore::new();
        let err = RestaurantService::new(&store).get_dashboard(1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn feeds_are_newest_first_with_id_tiebreak() {
        let store = MemoryStore::new();
        let same_time = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let older = store
            .add_restaurant(NewRestaurant::new("Older").created_at(same_time - chrono::Duration::days(1)))
            .await;
        let tied_a = store
            .add_restaurant(NewRestaurant::new("Tied A").created_at(same_time))
            .await;
        let tied_b = store
            .add_restaurant(NewRestaurant::new("Tied B").created_at(same_time))
            .await;

        let feeds = RestaurantService::new(&store).get_feeds().await.unwrap();
        let order: Vec<i64> = feeds.restaurants.iter().map(|r| r.restaurant.id).collect();
        assert_eq!(order, vec![tied_b.id, tied_a.id, older.id]);
    }

    #[tokio::test]
    async fn feeds_cap_at_ten() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Chatty", false).await;
        let text = CommentText::new("again").unwrap();
        for _ in 0..12 {
            store.create_comment(user.id, ids[0], &text).await.unwrap();
        }

        let feeds = RestaurantService::new(&store).get_feeds().await.unwrap();
        assert_eq!(feeds.restaurants.len(), 10);
        assert_eq!(feeds.comments.len(), 10);
        assert!(feeds
            .comments
            .windows(2)
            .all(|w| w[0].comment.id > w[1].comment.id));
    }

    #[tokio::test]
    async fn top_restaurants_sorted_by_favorites() {
        let (store, ids) = seeded().await;
        let mut users = Vec::new();
        for name in ["a", "b", "c"] {
            users.push(store.add_user(name, false).await);
        }
        // ids[4]: 3 favorites, ids[1] and ids[7]: 2 each (tie)
        for u in &users {
            store.add_reaction(ReactionKind::Favorite, u.id, ids[4]).await.unwrap();
        }
        for u in &users[..2] {
            store.add_reaction(ReactionKind::Favorite, u.id, ids[1]).await.unwrap();
            store.add_reaction(ReactionKind::Favorite, u.id, ids[7]).await.unwrap();
        }

        let top = RestaurantService::new(&store)
            .top_restaurants(DEFAULT_TOP_CANDIDATES, Some(users[0].id))
            .await
            .unwrap();

        assert_eq!(top.len(), 10);
        assert!(top
            .windows(2)
            .all(|w| w[0].favorited_count >= w[1].favorited_count));
        assert_eq!(top[0].restaurant.id, ids[4]);
        assert!(top[0].is_favorited);
        for tied in [ids[1], ids[7]] {
            assert_eq!(top.iter().filter(|t| t.restaurant.id == tied).count(), 1);
        }
        assert!(top.iter().all(|t| t.restaurant.description.chars().count() == 50));
    }

    #[tokio::test]
    async fn top_restaurants_only_rank_the_candidate_pool() {
        let (store, ids) = seeded().await;
        let user = store.add_user("Late fan", false).await;
        // ids[11] is outside a pool of 10 candidates
        store
            .add_reaction(ReactionKind::Favorite, user.id, ids[11])
            .await
            .unwrap();

        let top = RestaurantService::new(&store)
            .top_restaurants(10, None)
            .await
            .unwrap();
        assert!(top.iter().all(|t| t.restaurant.id != ids[11]));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let (store, ids) = seeded().await;
        store.set_unavailable(true);
        let service = RestaurantService::new(&store);

        assert!(matches!(
            service.list_restaurants(params(None, 1, 9), None).await,
            Err(DbError::Sqlx(_))
        ));
        assert!(matches!(
            service.get_restaurant_detail(ids[0], None).await,
            Err(DbError::Sqlx(_))
        ));
        assert!(matches!(service.get_feeds().await, Err(DbError::Sqlx(_))));
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty_but_counted() {
        let (store, _) = seeded().await;
        let page = RestaurantService::new(&store)
            .list_restaurants(
                ListParams {
                    category_id: None,
                    pagination: Pagination::new(50, 9),
                },
                None,
            )
            .await
            .unwrap();
        assert!(page.restaurants.is_empty());
        assert_eq!(page.total_count, 12);
    }
}
