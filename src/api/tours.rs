//! Tour API endpoints.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::{ApiResult, SuccessResponse};
use crate::errors::AppError;
use crate::models::{CreateTourRequest, Tour, UpdateTourRequest};
use crate::AppState;

/// A non-numeric id cannot name a tour.
fn tour_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::NotFound("Tour not found".to_string()))
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Tour {} not found", id))
}

/// GET /api/tours - List all tours.
pub async fn list_tours(State(state): State<AppState>) -> ApiResult<Json<Vec<Tour>>> {
    Ok(Json(state.stores.tours.list_all().await?))
}

/// GET /api/tours/{id} - Get a single tour.
pub async fn get_tour(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Tour>> {
    let id = tour_id(path)?;

    match state.stores.tours.get_by_id(id).await? {
        Some(tour) => Ok(Json(tour)),
        None => Err(not_found(id)),
    }
}

/// POST /api/tours - Create a new tour.
pub async fn create_tour(
    State(state): State<AppState>,
    payload: Result<Json<CreateTourRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tour>)> {
    let Json(request) = payload?;
    let new_tour = request.validate()?;

    let tour = state.stores.tours.create(new_tour).await?;
    Ok((StatusCode::CREATED, Json(tour)))
}

/// PATCH /api/tours/{id} - Merge fields onto a tour.
pub async fn update_tour(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTourRequest>, JsonRejection>,
) -> ApiResult<Json<Tour>> {
    let id = tour_id(path)?;
    let Json(changes) = payload?;
    changes.validate()?;

    match state.stores.tours.update(id, &changes).await? {
        Some(tour) => {
            tracing::info!(tour_id = id, "Tour updated");
            Ok(Json(tour))
        }
        None => Err(not_found(id)),
    }
}

/// DELETE /api/tours/{id} - Delete a tour.
pub async fn delete_tour(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = tour_id(path)?;

    if state.stores.tours.delete(id).await? {
        tracing::info!(tour_id = id, "Tour deleted");
        Ok(Json(SuccessResponse::ok()))
    } else {
        Err(not_found(id))
    }
}
