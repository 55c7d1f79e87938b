//! Postgres-backed store
//!
//! - Joins for restaurant/category and comment/author reads (no N+1)
//! - Unique and foreign-key constraints decide conflicts; no check-then-insert
//! - View counter is bumped with a single atomic UPDATE

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use crate::models::{CommentText, Paginated, Pagination};

use super::records::{
    Category, Comment, CommentWithAuthor, FeedComment, RankCandidate, ReactionKind, Restaurant,
    RestaurantStats, RestaurantWithCategory, User, UserReactions,
};
use super::store::{DbError, RestaurantStore};

const RESTAURANT_COLUMNS: &str = "r.id, r.name, r.tel, r.address, r.opening_hours, \
     r.description, r.image, r.view_counts, r.category_id, r.created_at";

const CATEGORY_COLUMNS: &str = "c.id AS c_id, c.name AS c_name";

const USER_COLUMNS: &str =
    "u.id AS u_id, u.name AS u_name, u.email AS u_email, u.is_admin AS u_is_admin, \
     u.created_at AS u_created_at";

/// Store backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn restaurant_with_category(row: &PgRow) -> Result<RestaurantWithCategory, sqlx::Error> {
    let restaurant = Restaurant::from_row(row)?;
    let category = match row.try_get::<Option<i64>, _>("c_id")? {
        Some(id) => Some(Category {
            id,
            name: row.try_get("c_name")?,
        }),
        None => None,
    };
    Ok(RestaurantWithCategory {
        restaurant,
        category,
    })
}

fn prefixed_user(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("u_id")?,
        name: row.try_get("u_name")?,
        email: row.try_get("u_email")?,
        is_admin: row.try_get("u_is_admin")?,
        created_at: row.try_get("u_created_at")?,
    })
}

fn prefixed_restaurant(row: &PgRow) -> Result<Restaurant, sqlx::Error> {
    Ok(Restaurant {
        id: row.try_get("r_id")?,
        name: row.try_get("r_name")?,
        tel: row.try_get("r_tel")?,
        address: row.try_get("r_address")?,
        opening_hours: row.try_get("r_opening_hours")?,
        description: row.try_get("r_description")?,
        image: row.try_get("r_image")?,
        view_counts: row.try_get("r_view_counts")?,
        category_id: row.try_get("r_category_id")?,
        created_at: row.try_get("r_created_at")?,
    })
}

/// Map a foreign-key violation on insert to a not-found error for the referenced row.
fn map_fk_violation(err: sqlx::Error, restaurant_id: i64, user_id: i64) -> DbError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_foreign_key_violation() {
            let on_user = db_err
                .constraint()
                .is_some_and(|name| name.contains("user_id"));
            return if on_user {
                DbError::not_found("user", user_id)
            } else {
                DbError::not_found("restaurant", restaurant_id)
            };
        }
    }
    DbError::Sqlx(err)
}

#[async_trait]
impl RestaurantStore for PgStore {
    async fn list_restaurants(
        &self,
        category_id: Option<i64>,
        page: Pagination,
    ) -> Result<Paginated<RestaurantWithCategory>, DbError> {
        let rows_sql = format!(
            r#"
            SELECT {RESTAURANT_COLUMNS}, {CATEGORY_COLUMNS}
            FROM restaurants r
            LEFT JOIN categories c ON c.id = r.category_id
            WHERE ($1::BIGINT IS NULL OR r.category_id = $1)
            ORDER BY r.id ASC
            LIMIT $2 OFFSET $3
            "#
        );

        // Counted separately so the total survives an offset past the last row
        let rows = sqlx::query(&rows_sql)
            .bind(category_id)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool);
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM restaurants WHERE ($1::BIGINT IS NULL OR category_id = $1)",
        )
        .bind(category_id)
        .fetch_one(&self.pool);

        let (rows, total) = tokio::try_join!(rows, total)?;

        let items = rows
            .iter()
            .map(restaurant_with_category)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantWithCategory>, DbError> {
        let sql = format!(
            r#"
            SELECT {RESTAURANT_COLUMNS}, {CATEGORY_COLUMNS}
            FROM restaurants r
            LEFT JOIN categories c ON c.id = r.category_id
            WHERE r.id = $1
            "#
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(restaurant_with_category).transpose()?)
    }

    async fn restaurant_comments(
        &self,
        restaurant_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, DbError> {
        let sql = format!(
            r#"
            SELECT cm.id, cm.text, cm.user_id, cm.restaurant_id, cm.created_at, {USER_COLUMNS}
            FROM comments cm
            JOIN users u ON u.id = cm.user_id
            WHERE cm.restaurant_id = $1
            ORDER BY cm.created_at DESC, cm.id DESC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(restaurant_id)
            .fetch_all(&self.pool)
            .await?;

        let comments = rows
            .iter()
            .map(|row| {
                Ok(CommentWithAuthor {
                    comment: Comment::from_row(row)?,
                    user: prefixed_user(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(comments)
    }

    async fn favorited_users(&self, restaurant_id: i64) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.is_admin, u.created_at
            FROM favorites f
            JOIN users u ON u.id = f.user_id
            WHERE f.restaurant_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn liked_users(&self, restaurant_id: i64) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.is_admin, u.created_at
            FROM likes l
            JOIN users u ON u.id = l.user_id
            WHERE l.restaurant_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn restaurant_stats(&self, restaurant_id: i64) -> Result<RestaurantStats, DbError> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM comments WHERE restaurant_id = $1) AS comment_count,
                (SELECT COUNT(*) FROM favorites WHERE restaurant_id = $1) AS favorited_count
            "#,
        )
        .bind(restaurant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(RestaurantStats {
            comment_count: row.try_get("comment_count")?,
            favorited_count: row.try_get("favorited_count")?,
        })
    }

    async fn increment_view_count(&self, restaurant_id: i64) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE restaurants SET view_counts = view_counts + 1 WHERE id = $1")
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("restaurant", restaurant_id));
        }
        Ok(())
    }

    async fn recent_restaurants(&self, limit: u32) -> Result<Vec<RestaurantWithCategory>, DbError> {
        let sql = format!(
            r#"
            SELECT {RESTAURANT_COLUMNS}, {CATEGORY_COLUMNS}
            FROM restaurants r
            LEFT JOIN categories c ON c.id = r.category_id
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $1
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        let restaurants = rows
            .iter()
            .map(restaurant_with_category)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(restaurants)
    }

    async fn recent_comments(&self, limit: u32) -> Result<Vec<FeedComment>, DbError> {
        let sql = format!(
            r#"
            SELECT
                cm.id, cm.text, cm.user_id, cm.restaurant_id, cm.created_at,
                {USER_COLUMNS},
                r.id AS r_id, r.name AS r_name, r.tel AS r_tel, r.address AS r_address,
                r.opening_hours AS r_opening_hours, r.description AS r_description,
                r.image AS r_image, r.view_counts AS r_view_counts,
                r.category_id AS r_category_id, r.created_at AS r_created_at
            FROM comments cm
            JOIN users u ON u.id = cm.user_id
            JOIN restaurants r ON r.id = cm.restaurant_id
            ORDER BY cm.created_at DESC, cm.id DESC
            LIMIT $1
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let comments = rows
            .iter()
            .map(|row| {
                Ok(FeedComment {
                    comment: Comment::from_row(row)?,
                    user: prefixed_user(row)?,
                    restaurant: prefixed_restaurant(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(comments)
    }

    async fn rank_candidates(&self, limit: u32) -> Result<Vec<RankCandidate>, DbError> {
        let sql = format!(
            r#"
            SELECT {RESTAURANT_COLUMNS},
                (SELECT COUNT(*) FROM favorites f WHERE f.restaurant_id = r.id) AS favorited_count
            FROM restaurants r
            ORDER BY r.id ASC
            LIMIT $1
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(|row| {
                Ok(RankCandidate {
                    restaurant: Restaurant::from_row(row)?,
                    favorited_count: row.try_get("favorited_count")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(candidates)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, is_admin, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, is_admin, created_at FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn set_user_admin(&self, id: i64, is_admin: bool) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET is_admin = $2
            WHERE id = $1
            RETURNING id, name, email, is_admin, created_at
            "#,
        )
        .bind(id)
        .bind(is_admin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn user_reactions(&self, user_id: i64) -> Result<UserReactions, DbError> {
        let favorited = sqlx::query_scalar::<_, i64>(
            "SELECT restaurant_id FROM favorites WHERE user_id = $1 ORDER BY restaurant_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool);
        let liked = sqlx::query_scalar::<_, i64>(
            "SELECT restaurant_id FROM likes WHERE user_id = $1 ORDER BY restaurant_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool);

        let (favorited, liked) = tokio::try_join!(favorited, liked)?;
        Ok(UserReactions { favorited, liked })
    }

    async fn create_comment(
        &self,
        user_id: i64,
        restaurant_id: i64,
        text: &CommentText,
    ) -> Result<Comment, DbError> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (text, user_id, restaurant_id)
            VALUES ($1, $2, $3)
            RETURNING id, text, user_id, restaurant_id, created_at
            "#,
        )
        .bind(text.as_str())
        .bind(user_id)
        .bind(restaurant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_fk_violation(e, restaurant_id, user_id))
    }

    async fn add_reaction(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError> {
        let sql = format!(
            "INSERT INTO {} (user_id, restaurant_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, restaurant_id) DO NOTHING",
            kind.table()
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(restaurant_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_fk_violation(e, restaurant_id, user_id))?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        kind: ReactionKind,
        user_id: i64,
        restaurant_id: i64,
    ) -> Result<(), DbError> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND restaurant_id = $2",
            kind.table()
        );

        sqlx::query(&sql)
            .bind(user_id)
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
