use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::queries::{self, TurfFilter};
use crate::errors::AppError;
use crate::models::{Turf, TurfCategory, UserRole};
use crate::services::slots;
use crate::state::AppState;

use super::require_user;

// GET /api/turfs
#[derive(Deserialize)]
pub struct TurfsQuery {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct Pagination {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

#[derive(Serialize)]
pub struct TurfsResponse {
    pub turfs: Vec<Turf>,
    pub pagination: Pagination,
}

pub async fn list_turfs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TurfsQuery>,
) -> Result<Json<TurfsResponse>, AppError> {
    let filter = TurfFilter {
        category: query.category.filter(|c| c != "all"),
        min_price: query.min_price,
        max_price: query.max_price,
        location: query.location,
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let sort_by = query.sort_by.unwrap_or_else(|| "created_at".to_string());
    let sort_desc = query.sort_order.as_deref() != Some("asc");

    let db = state.db.lock().unwrap();
    let turfs = queries::list_turfs(&db, &filter, &sort_by, sort_desc, limit, (page - 1) * limit)?;
    let total = queries::count_turfs(&db, &filter)?;

    Ok(Json(TurfsResponse {
        turfs,
        pagination: Pagination {
            current: page,
            pages: (total + limit - 1) / limit,
            total,
        },
    }))
}

// GET /api/turfs/:id
pub async fn get_turf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Turf>, AppError> {
    let db = state.db.lock().unwrap();
    let turf = queries::get_turf(&db, &id)?
        .ok_or_else(|| AppError::NotFound("turf not found".to_string()))?;
    Ok(Json(turf))
}

// POST /api/turfs
#[derive(Deserialize)]
pub struct CreateTurfRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub price_per_hour: f64,
    pub category: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
}

pub async fn create_turf(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateTurfRequest>,
) -> Result<(StatusCode, Json<Turf>), AppError> {
    let user = require_user(&state, &headers)?;
    if user.role != UserRole::Admin {
        return Err(AppError::Unauthorized);
    }

    if body.name.trim().len() < 2 {
        return Err(AppError::Validation(
            "name must be at least 2 characters".to_string(),
        ));
    }
    if body.description.trim().len() < 10 {
        return Err(AppError::Validation(
            "description must be at least 10 characters".to_string(),
        ));
    }
    if body.location.trim().len() < 5 {
        return Err(AppError::Validation(
            "location must be at least 5 characters".to_string(),
        ));
    }
    if !body.price_per_hour.is_finite() || body.price_per_hour < 0.0 {
        return Err(AppError::Validation(
            "price per hour must be a non-negative number".to_string(),
        ));
    }
    let category = TurfCategory::parse(&body.category)
        .ok_or_else(|| AppError::Validation(format!("invalid category: {}", body.category)))?;

    let now = Utc::now().naive_utc();
    let turf = Turf {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        description: body.description.trim().to_string(),
        location: body.location.trim().to_string(),
        price_per_hour: body.price_per_hour,
        category,
        amenities: body.amenities,
        image_url: body.image_url,
        owner_id: user.id,
        is_active: true,
        average_rating: 0.0,
        total_reviews: 0,
        is_top_rated: false,
        created_at: now,
        updated_at: now,
    };

    let db = state.db.lock().unwrap();
    queries::create_turf(&db, &turf)?;

    Ok((StatusCode::CREATED, Json(turf)))
}

// GET /api/turfs/:id/available-slots
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub available_slots: Vec<slots::Slot>,
}

pub async fn available_slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let date = query
        .date
        .ok_or_else(|| AppError::Validation("date is required".to_string()))?;
    slots::validate_date(&date)?;

    let db = state.db.lock().unwrap();
    // A missing turf is NotFound, never an empty slot list.
    let turf = queries::get_turf(&db, &id)?
        .ok_or_else(|| AppError::NotFound("turf not found".to_string()))?;

    let bookings = queries::get_live_bookings_for_turf_date(&db, &id, &date)?;
    let now = chrono::Local::now().naive_local();
    let available = slots::available_slots(turf.price_per_hour, &bookings, &date, now)?;

    Ok(Json(SlotsResponse {
        available_slots: available,
    }))
}
