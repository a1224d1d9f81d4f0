//! Admin session endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{ApiResult, SuccessResponse};
use crate::auth;
use crate::errors::AppError;
use crate::models::{ChangePasswordRequest, LoginRequest};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
}

/// POST /api/admin/login - Check the password and issue the session cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;

    let verified = auth::verify_password(
        state.stores.credentials.as_ref(),
        &request.password,
        &state.config.admin_password,
    )
    .await?;

    if !verified {
        tracing::warn!("Rejected admin login");
        return Ok((StatusCode::UNAUTHORIZED, Json(LoginResponse { ok: false })).into_response());
    }

    let cookie = auth::set_cookie_header(&auth::session_cookie(state.config.secure_cookies))?;
    tracing::info!("Admin logged in");
    Ok(([(header::SET_COOKIE, cookie)], Json(LoginResponse { ok: true })).into_response())
}

/// POST /api/admin/logout - Expire the session cookie.
pub async fn logout() -> ApiResult<Response> {
    let cookie = auth::set_cookie_header(&auth::clear_session_cookie())?;
    Ok(([(header::SET_COOKIE, cookie)], Json(LoginResponse { ok: true })).into_response())
}

/// POST /api/admin/change-password - Rotate the admin credential.
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    if !auth::has_session(&headers) {
        return Err(AppError::Unauthorized("Unauthorized".to_string()));
    }

    let Json(request) = payload?;
    let (Some(current), Some(new_password)) = (
        request.current_password.filter(|p| !p.is_empty()),
        request.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Invalid payload".to_string()));
    };

    let store = state.stores.credentials.as_ref();
    if !auth::verify_password(store, &current, &state.config.admin_password).await? {
        return Err(AppError::Forbidden(
            "Current password is incorrect".to_string(),
        ));
    }

    auth::rotate_password(store, &new_password).await?;
    Ok(Json(SuccessResponse::ok()))
}
