//! platerate-server: restaurant review web backend
//!
//! Browse restaurants by category, read details and feeds, comment,
//! favorite and like, plus admin reads over restaurants and users.
//!
//! Layers, bottom up:
//! - [`models`]: validated input, pagination, query normalization
//! - [`db`]: `RestaurantStore` with Postgres and in-memory implementations
//! - [`services`]: listing/detail/ranking logic producing view contexts
//! - [`http`]: axum routes, auth gates and JSON error mapping

pub mod db;
pub mod http;
pub mod models;
pub mod services;

pub use db::{DbError, MemoryStore, PgStore, RestaurantStore};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
