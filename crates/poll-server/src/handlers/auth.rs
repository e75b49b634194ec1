//! Admin authentication handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use poll_common::AppError;

use crate::extractors::{AdminUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Login request body
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password required"))]
    pub password: String,
}

/// Login response with the issued admin token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Log in with the shared admin credential
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let valid = state
        .store()
        .validate_admin(&request.username, &request.password)
        .await?;

    if !valid {
        tracing::warn!(username = %request.username, "Rejected admin login");
        return Err(AppError::InvalidCredentials.into());
    }

    let token = state.jwt_service().issue_admin_token(&request.username)?;

    tracing::info!(username = %request.username, "Admin logged in");
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config().jwt.token_expiry,
    }))
}

/// Token verification response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub username: String,
}

/// Verify the presented admin token
///
/// GET /api/auth/verify
pub async fn verify(admin: AdminUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        username: admin.username,
    })
}
