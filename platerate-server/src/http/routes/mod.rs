//! Route handlers organized by resource

pub mod admin;
pub mod comments;
pub mod health;
pub mod reactions;
pub mod restaurants;
