//! Admin panel reads and role management

use crate::db::{DbError, RestaurantStore, User};
use crate::models::Pagination;

use super::views::AdminRestaurantsPage;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("admins cannot revoke their own role")]
    SelfDemotion,

    #[error(transparent)]
    Db(#[from] DbError),
}

pub struct AdminService<'a> {
    store: &'a dyn RestaurantStore,
}

impl<'a> AdminService<'a> {
    pub fn new(store: &'a dyn RestaurantStore) -> Self {
        Self { store }
    }

    /// All restaurants, paginated, with full descriptions.
    #[tracing::instrument(skip(self))]
    pub async fn list_restaurants(
        &self,
        page: Pagination,
    ) -> Result<AdminRestaurantsPage, DbError> {
        let page = self.store.list_restaurants(None, page).await?;
        let pagination = page.pagination();
        Ok(AdminRestaurantsPage {
            restaurants: page.items,
            pagination,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        self.store.list_users().await
    }

    /// Grant or revoke admin on `user_id` on behalf of `acting_admin`.
    ///
    /// An admin may not revoke their own role.
    #[tracing::instrument(skip(self))]
    pub async fn set_role(
        &self,
        acting_admin: i64,
        user_id: i64,
        is_admin: bool,
    ) -> Result<User, AdminError> {
        if acting_admin == user_id && !is_admin {
            return Err(AdminError::SelfDemotion);
        }

        let user = self
            .store
            .set_user_admin(user_id, is_admin)
            .await?
            .ok_or_else(|| DbError::not_found("user", user_id))?;
        tracing::info!(user_id, is_admin, "user role changed");
        Ok(user)
    }
}
