//! Query and command services on top of a `RestaurantStore`

pub mod admin;
pub mod interactions;
pub mod restaurants;
pub mod views;

pub use admin::{AdminError, AdminService};
pub use interactions::InteractionService;
pub use restaurants::{RestaurantService, DEFAULT_TOP_CANDIDATES, FEED_LIMIT};
pub use views::*;
