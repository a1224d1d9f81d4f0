//! Carousel API endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::ApiResult;
use crate::models::{sanitize_slides, CarouselSlide, CarouselSlideInput};
use crate::AppState;

/// GET /api/carousel - List the slides.
pub async fn list_carousel(State(state): State<AppState>) -> ApiResult<Json<Vec<CarouselSlide>>> {
    Ok(Json(state.stores.carousel.list().await?))
}

/// PUT /api/carousel - Replace every slide. Rejected as a whole if any slide is incomplete.
pub async fn replace_carousel(
    State(state): State<AppState>,
    payload: Result<Json<Vec<CarouselSlideInput>>, JsonRejection>,
) -> ApiResult<Json<Vec<CarouselSlide>>> {
    let Json(inputs) = payload?;
    let slides = sanitize_slides(inputs)?;

    Ok(Json(state.stores.carousel.replace_all(slides).await?))
}
