use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Turf;
use crate::state::AppState;

use super::require_user;

// POST /api/favorites
#[derive(Deserialize)]
pub struct AddFavoriteRequest {
    pub turf_id: String,
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let user = require_user(&state, &headers)?;

    let db = state.db.lock().unwrap();
    if queries::get_turf(&db, &body.turf_id)?.is_none() {
        return Err(AppError::NotFound("turf not found".to_string()));
    }
    if queries::is_favorite(&db, &user.id, &body.turf_id)? {
        return Err(AppError::Validation("already in favorites".to_string()));
    }
    queries::add_favorite(&db, &user.id, &body.turf_id)?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "added to favorites" })),
    ))
}

// DELETE /api/favorites/:turf_id
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(turf_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&state, &headers)?;

    let db = state.db.lock().unwrap();
    let removed = queries::remove_favorite(&db, &user.id, &turf_id)?;
    if !removed {
        return Err(AppError::NotFound("favorite not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "removed from favorites" })))
}

// GET /api/favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Turf>>, AppError> {
    let user = require_user(&state, &headers)?;

    let db = state.db.lock().unwrap();
    let turfs = queries::get_favorite_turfs(&db, &user.id)?;
    Ok(Json(turfs))
}

// GET /api/favorites/check/:turf_id
#[derive(Serialize)]
pub struct FavoriteCheckResponse {
    pub is_favorite: bool,
}

pub async fn check_favorite(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(turf_id): Path<String>,
) -> Result<Json<FavoriteCheckResponse>, AppError> {
    let user = require_user(&state, &headers)?;

    let db = state.db.lock().unwrap();
    let is_favorite = queries::is_favorite(&db, &user.id, &turf_id)?;
    Ok(Json(FavoriteCheckResponse { is_favorite }))
}
