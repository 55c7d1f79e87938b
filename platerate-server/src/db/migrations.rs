//! Schema migrations
//!
//! Every statement is idempotent, so running this on each start is safe.

use sqlx::PgPool;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "categories",
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "restaurants",
        r#"
        CREATE TABLE IF NOT EXISTS restaurants (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            tel TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            opening_hours TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            image TEXT,
            view_counts BIGINT NOT NULL DEFAULT 0,
            category_id BIGINT REFERENCES categories(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id BIGSERIAL PRIMARY KEY,
            text TEXT NOT NULL,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            restaurant_id BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "favorites",
        r#"
        CREATE TABLE IF NOT EXISTS favorites (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            restaurant_id BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, restaurant_id)
        )
        "#,
    ),
    (
        "likes",
        r#"
        CREATE TABLE IF NOT EXISTS likes (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            restaurant_id BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, restaurant_id)
        )
        "#,
    ),
    (
        "restaurant indexes",
        r#"
        CREATE INDEX IF NOT EXISTS idx_restaurants_category ON restaurants(category_id);
        CREATE INDEX IF NOT EXISTS idx_restaurants_created ON restaurants(created_at DESC, id DESC);
        CREATE INDEX IF NOT EXISTS idx_comments_restaurant ON comments(restaurant_id);
        CREATE INDEX IF NOT EXISTS idx_comments_created ON comments(created_at DESC, id DESC)
        "#,
    ),
];

/// Run all migrations in order
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    for (name, statement) in STATEMENTS {
        tracing::debug!(step = *name, "applying migration");
        sqlx::raw_sql(statement).execute(pool).await?;
    }

    tracing::info!("Schema migrations complete");
    Ok(())
}
