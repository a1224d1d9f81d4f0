//! Page content API endpoints.
//!
//! GET answers `null` until the document has been saved once.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::ApiResult;
use crate::models::{AboutContent, AboutContentRequest, ContactInfo, ContactInfoRequest};
use crate::AppState;

/// GET /api/content/about
pub async fn get_about(State(state): State<AppState>) -> ApiResult<Json<Option<AboutContent>>> {
    Ok(Json(state.stores.content.get_about().await?))
}

/// PUT /api/content/about
pub async fn put_about(
    State(state): State<AppState>,
    payload: Result<Json<AboutContentRequest>, JsonRejection>,
) -> ApiResult<Json<AboutContent>> {
    let Json(request) = payload?;
    let about = request.validate()?;

    Ok(Json(state.stores.content.put_about(&about).await?))
}

/// GET /api/content/contact
pub async fn get_contact(State(state): State<AppState>) -> ApiResult<Json<Option<ContactInfo>>> {
    Ok(Json(state.stores.content.get_contact().await?))
}

/// PUT /api/content/contact
pub async fn put_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactInfoRequest>, JsonRejection>,
) -> ApiResult<Json<ContactInfo>> {
    let Json(request) = payload?;
    let contact = request.validate()?;

    Ok(Json(state.stores.content.put_contact(&contact).await?))
}
