use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Review;
use crate::services::reviews::{self, NewReview};
use crate::state::AppState;

use super::require_user;

// POST /api/reviews
#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub booking_id: String,
    pub turf_id: String,
    pub rating: i64,
    pub comment: String,
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let user = require_user(&state, &headers)?;

    let mut db = state.db.lock().unwrap();
    let review = reviews::create_review(
        &mut db,
        &user,
        NewReview {
            booking_id: body.booking_id,
            turf_id: body.turf_id,
            rating: body.rating,
            comment: body.comment,
            player_name: None,
        },
    )?;

    Ok((StatusCode::CREATED, Json(review)))
}

// GET /api/reviews/turf/:turf_id
#[derive(Deserialize)]
pub struct ReviewsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
    pub pagination: super::turfs::Pagination,
}

pub async fn turf_reviews(
    State(state): State<Arc<AppState>>,
    Path(turf_id): Path<String>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ReviewsResponse>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let db = state.db.lock().unwrap();
    let reviews = queries::get_reviews_for_turf(&db, &turf_id, limit, (page - 1) * limit)?;
    let total = queries::count_reviews_for_turf(&db, &turf_id)?;

    Ok(Json(ReviewsResponse {
        reviews,
        pagination: super::turfs::Pagination {
            current: page,
            pages: (total + limit - 1) / limit,
            total,
        },
    }))
}
