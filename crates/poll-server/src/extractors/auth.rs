//! Admin authentication extractor
//!
//! Extracts and validates the admin JWT from the Authorization header.
//! Handlers taking an [`AdminUser`] parameter are admin-gated: the domain
//! operation only runs once the token has been verified.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;
use crate::state::AppState;

/// Verified admin identity extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// Admin username from the token subject
    pub username: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let claims = app_state
            .jwt_service()
            .validate_admin_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Invalid admin token");
                ApiError::InvalidAuthFormat
            })?;

        Ok(AdminUser {
            username: claims.sub,
        })
    }
}
