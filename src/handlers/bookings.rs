use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, PaymentMethod, UserRole};
use crate::services::bookings::{self, NewBooking};
use crate::services::notifications;
use crate::state::AppState;

use super::require_user;

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub turf_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub player_name: String,
    pub player_phone: String,
    pub player_age: Option<i64>,
    pub player_gender: Option<String>,
    pub player_address: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub payment_id: Option<String>,
}

#[derive(Serialize)]
pub struct CreateBookingResponse {
    pub message: String,
    pub booking: Booking,
    pub booking_id: String,
    pub confirmation_id: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let user = require_user(&state, &headers)?;

    let new = NewBooking {
        turf_id: body.turf_id,
        date: body.date,
        start_time: body.start_time,
        end_time: body.end_time,
        player_name: body.player_name,
        player_phone: body.player_phone,
        player_age: body.player_age,
        player_gender: body.player_gender,
        player_address: body.player_address,
        notes: body.notes,
        payment_method: PaymentMethod::parse(body.payment_method.as_deref().unwrap_or("online")),
        payment_id: body.payment_id,
    };

    let (booking, turf_name) = {
        let mut db = state.db.lock().unwrap();
        let booking = bookings::create_booking(&mut db, &user, new)?;
        let turf_name = queries::get_turf(&db, &booking.turf_id)?
            .map(|t| t.name)
            .unwrap_or_default();
        (booking, turf_name)
    };

    // Confirmation email and SMS go out in the background; the booking stands
    // even if either delivery fails.
    tokio::spawn(notifications::dispatch_booking_confirmation(
        state.clone(),
        booking.clone(),
        turf_name,
        user.email.clone(),
    ));

    let booking_id = booking.id.clone();
    let confirmation_id = booking.booking_ref.clone();
    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            message: "booking confirmed".to_string(),
            booking,
            booking_id,
            confirmation_id,
        }),
    ))
}

// GET /api/bookings/my
#[derive(Serialize)]
pub struct MyBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub turf_name: String,
    pub turf_location: String,
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<MyBooking>>, AppError> {
    let user = require_user(&state, &headers)?;

    let db = state.db.lock().unwrap();
    let rows = queries::get_bookings_for_user(&db, &user.id)?;

    Ok(Json(
        rows.into_iter()
            .map(|r| MyBooking {
                booking: r.booking,
                turf_name: r.turf_name,
                turf_location: r.turf_location,
            })
            .collect(),
    ))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let user = require_user(&state, &headers)?;

    let db = state.db.lock().unwrap();
    let booking = queries::get_booking(&db, &id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    let is_owner = queries::get_turf(&db, &booking.turf_id)?
        .map(|t| t.owner_id == user.id)
        .unwrap_or(false);
    if booking.user_id != user.id && !is_owner && user.role != UserRole::Admin {
        return Err(AppError::Unauthorized);
    }

    Ok(Json(booking))
}

// POST /api/bookings/:id/cancel
#[derive(Serialize)]
pub struct CancelBookingResponse {
    pub message: String,
    pub booking: Booking,
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let user = require_user(&state, &headers)?;

    let mut db = state.db.lock().unwrap();
    let booking = bookings::cancel_booking(&mut db, &user, &id)?;

    Ok(Json(CancelBookingResponse {
        message: "booking cancelled".to_string(),
        booking,
    }))
}
