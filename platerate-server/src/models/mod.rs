//! Domain models with validation at construction
//!
//! User input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod comment;
pub mod pagination;
pub mod params;
pub mod validation;

pub use comment::CommentText;
pub use pagination::{
    compute_offset, compute_pagination, Paginated, Pagination, PaginationDescriptor,
    DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use params::{ListParams, ListQuery};
pub use validation::ValidationError;
