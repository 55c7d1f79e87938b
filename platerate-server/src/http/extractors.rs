//! Custom Axum extractors
//!
//! The fronting auth layer puts the signed-in user's id in a request header
//! (`x-user-id` unless configured otherwise). These extractors resolve it to
//! a `User` and apply the user/admin gates.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::HeaderName;

use super::error::ApiError;
use super::server::AppState;
use crate::db::User;
use crate::models::ValidationError;

fn principal_id(parts: &Parts, header: &HeaderName) -> Option<i64> {
    parts
        .headers
        .get(header)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
}

/// Signed-in user if there is one; never rejects for a missing principal
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = principal_id(parts, &state.auth_header) else {
            return Ok(Self(None));
        };
        let user = state.store.find_user(id).await?;
        if user.is_none() {
            tracing::debug!(user_id = id, "principal does not match a user");
        }
        Ok(Self(user))
    }
}

/// Signed-in user; 401 otherwise
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(Self).ok_or(ApiError::Unauthorized)
    }
}

/// Signed-in administrator; 401 without a user, 403 for non-admins
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Forbidden {
                reason: "admin access required".into(),
            });
        }
        Ok(Self(user))
    }
}

/// Extract and validate a numeric id from a single-segment path
pub struct ValidId(pub i64);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let id = id.trim().parse::<i64>().map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "expected an integer",
            })
        })?;

        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/restaurants");
        if let Some(value) = header {
            builder = builder.header("x-user-id", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn principal_is_parsed_from_header() {
        let header = HeaderName::from_static("x-user-id");
        assert_eq!(principal_id(&parts_with(Some("12")), &header), Some(12));
        assert_eq!(principal_id(&parts_with(Some(" 7 ")), &header), Some(7));
    }

    #[test]
    fn malformed_or_missing_principal_is_none() {
        let header = HeaderName::from_static("x-user-id");
        assert_eq!(principal_id(&parts_with(None), &header), None);
        assert_eq!(principal_id(&parts_with(Some("abc")), &header), None);
    }
}
