//! Database layer - connection pool, schema and stores
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits - no Arc<Mutex<Connection>>
//! - List reads use JOINs - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod records;
pub mod store;

pub use memory::{MemoryStore, NewRestaurant};
pub use pool::{create_pool, create_pool_with_options, DEFAULT_MAX_CONNECTIONS};
pub use postgres::PgStore;
pub use records::*;
pub use store::{DbError, RestaurantStore};
