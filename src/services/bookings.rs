use chrono::Utc;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, PaymentMethod, User};
use crate::services::slots;

pub struct NewBooking {
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
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
}

fn validate(req: &NewBooking) -> Result<(u32, u32), AppError> {
    slots::validate_date(&req.date)?;
    let start_hour = slots::parse_hour(&req.start_time)?;
    let end_hour = slots::parse_hour(&req.end_time)?;
    if end_hour <= start_hour {
        return Err(AppError::Validation(
            "end time must be after start time".to_string(),
        ));
    }
    if req.player_name.trim().len() < 2 {
        return Err(AppError::Validation(
            "player name must be at least 2 characters".to_string(),
        ));
    }
    if req.player_phone.trim().len() < 10 {
        return Err(AppError::Validation(
            "player phone must be at least 10 characters".to_string(),
        ));
    }
    Ok((start_hour, end_hour))
}

/// Creates a confirmed booking. The conflict check, the booking insert and
/// the per-hour slot claims run in one transaction, so two concurrent
/// requests for overlapping slots on the same (turf, date) cannot both
/// succeed: the loser hits UNIQUE(turf_id, date, hour) and gets
/// `SlotUnavailable`, with nothing written.
pub fn create_booking(
    conn: &mut Connection,
    user: &User,
    req: NewBooking,
) -> Result<Booking, AppError> {
    let (start_hour, end_hour) = validate(&req)?;

    let turf = queries::get_turf(conn, &req.turf_id)?
        .ok_or_else(|| AppError::NotFound("turf not found".to_string()))?;

    let total_price = slots::quote_price(&req.start_time, &req.end_time, turf.price_per_hour)?;

    let tx = conn.transaction()?;

    let existing = queries::get_live_bookings_for_turf_date(&tx, &req.turf_id, &req.date)?;
    if slots::find_conflict(&existing, &req.start_time, &req.end_time).is_some() {
        return Err(AppError::SlotUnavailable);
    }

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        booking_ref: slots::new_booking_ref(),
        turf_id: req.turf_id,
        user_id: user.id.clone(),
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        total_price,
        status: BookingStatus::Confirmed,
        player_name: req.player_name,
        player_phone: req.player_phone,
        player_age: req.player_age,
        player_gender: req.player_gender,
        player_address: req.player_address,
        notes: req.notes,
        payment_method: req.payment_method,
        payment_id: req.payment_id,
        email_sent: false,
        sms_sent: false,
        created_at: now,
        updated_at: now,
    };

    queries::insert_booking(&tx, &booking)?;
    queries::insert_booking_slots(
        &tx,
        &booking.id,
        &booking.turf_id,
        &booking.date,
        start_hour,
        end_hour,
    )
    .map_err(|e| {
        if is_constraint_violation(&e) {
            AppError::SlotUnavailable
        } else {
            AppError::Database(e)
        }
    })?;

    tx.commit()?;
    Ok(booking)
}

/// Cancels a booking on behalf of the booker or the turf's owner. Cancelling
/// an already-cancelled booking is a no-op success.
pub fn cancel_booking(
    conn: &mut Connection,
    user: &User,
    booking_id: &str,
) -> Result<Booking, AppError> {
    let mut booking = queries::get_booking(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    let turf = queries::get_turf(conn, &booking.turf_id)?;
    let is_booker = booking.user_id == user.id;
    let is_turf_owner = turf.map(|t| t.owner_id == user.id).unwrap_or(false);
    if !is_booker && !is_turf_owner {
        return Err(AppError::Unauthorized);
    }

    if booking.status == BookingStatus::Cancelled {
        return Ok(booking);
    }

    let tx = conn.transaction()?;
    queries::update_booking_status(&tx, booking_id, BookingStatus::Cancelled)?;
    queries::delete_booking_slots(&tx, booking_id)?;
    tx.commit()?;

    booking.status = BookingStatus::Cancelled;
    Ok(booking)
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::UserRole;

    fn setup() -> (Connection, User) {
        let conn = db::init_db(":memory:").unwrap();
        let user = User {
            id: "u-player".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            phone: "9876543210".to_string(),
            role: UserRole::Player,
            token: "player-token".to_string(),
        };
        queries::save_user(&conn, &user).unwrap();
        (conn, user)
    }

    fn seed_turf(conn: &Connection, id: &str, price: f64) {
        let now = Utc::now().naive_utc();
        let turf = crate::models::Turf {
            id: id.to_string(),
            name: "Green Arena".to_string(),
            description: "Well maintained 5-a-side turf".to_string(),
            location: "Andheri West, Mumbai".to_string(),
            price_per_hour: price,
            category: crate::models::TurfCategory::Football,
            amenities: vec!["parking".to_string()],
            image_url: None,
            owner_id: "u-owner".to_string(),
            is_active: true,
            average_rating: 0.0,
            total_reviews: 0,
            is_top_rated: false,
            created_at: now,
            updated_at: now,
        };
        queries::create_turf(conn, &turf).unwrap();
    }

    fn request(turf_id: &str, date: &str, start: &str, end: &str) -> NewBooking {
        NewBooking {
            turf_id: turf_id.to_string(),
            date: date.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            player_name: "Alice".to_string(),
            player_phone: "9876543210".to_string(),
            player_age: Some(27),
            player_gender: None,
            player_address: None,
            notes: None,
            payment_method: PaymentMethod::Online,
            payment_id: None,
        }
    }

    #[test]
    fn test_create_booking_success() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);

        let booking =
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", "14:00", "17:00"))
                .unwrap();
        assert_eq!(booking.total_price, 1500.0);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.booking_ref.starts_with("GT"));

        let stored = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(stored.booking_ref, booking.booking_ref);
    }

    #[test]
    fn test_overlapping_booking_rejected() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);

        create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00")).unwrap();

        let err = create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:30", "11:30"))
            .unwrap_err();
        assert!(matches!(err, AppError::SlotUnavailable));
    }

    #[test]
    fn test_touching_booking_allowed() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);

        create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00")).unwrap();
        let booking =
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", "11:00", "12:00"))
                .unwrap();
        assert_eq!(booking.start_time, "11:00");
    }

    #[test]
    fn test_cancelled_booking_frees_slot() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);

        let first =
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00"))
                .unwrap();
        cancel_booking(&mut conn, &user, &first.id).unwrap();

        let second =
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00"))
                .unwrap();
        assert_ne!(second.id, first.id);
    }

    #[test]
    fn test_same_slot_different_turfs_ok() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);
        seed_turf(&conn, "t-2", 700.0);

        create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00")).unwrap();
        let booking =
            create_booking(&mut conn, &user, request("t-2", "2030-06-16", "10:00", "11:00"))
                .unwrap();
        assert_eq!(booking.total_price, 700.0);
    }

    #[test]
    fn test_missing_turf_not_found() {
        let (mut conn, user) = setup();
        let err = create_booking(&mut conn, &user, request("nope", "2030-06-16", "10:00", "11:00"))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_invalid_times_rejected() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);

        let err = create_booking(&mut conn, &user, request("t-1", "2030-06-16", "11:00", "10:00"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = create_booking(&mut conn, &user, request("t-1", "16-06-2030", "10:00", "11:00"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_cancel_requires_booker_or_turf_owner() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);
        let booking =
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00"))
                .unwrap();

        let stranger = User {
            id: "u-stranger".to_string(),
            name: "Mallory".to_string(),
            email: "mallory@example.com".to_string(),
            phone: "9000000000".to_string(),
            role: UserRole::Player,
            token: "stranger-token".to_string(),
        };
        let err = cancel_booking(&mut conn, &stranger, &booking.id).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        // Status unchanged
        let stored = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);

        let owner = User {
            id: "u-owner".to_string(),
            name: "Owen".to_string(),
            email: "owen@example.com".to_string(),
            phone: "9111111111".to_string(),
            role: UserRole::Owner,
            token: "owner-token".to_string(),
        };
        cancel_booking(&mut conn, &owner, &booking.id).unwrap();
        let stored = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_cancel_already_cancelled_is_noop() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);
        let booking =
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", "10:00", "11:00"))
                .unwrap();

        cancel_booking(&mut conn, &user, &booking.id).unwrap();
        let again = cancel_booking(&mut conn, &user, &booking.id).unwrap();
        assert_eq!(again.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_live_bookings_pairwise_disjoint() {
        let (mut conn, user) = setup();
        seed_turf(&conn, "t-1", 500.0);

        for (start, end) in [("06:00", "08:00"), ("08:00", "09:00"), ("12:00", "14:00")] {
            create_booking(&mut conn, &user, request("t-1", "2030-06-16", start, end)).unwrap();
        }
        // A sweep of overlapping attempts all fail
        for (start, end) in [("07:00", "09:00"), ("06:00", "07:00"), ("13:00", "15:00")] {
            let err = create_booking(&mut conn, &user, request("t-1", "2030-06-16", start, end))
                .unwrap_err();
            assert!(matches!(err, AppError::SlotUnavailable), "{start}-{end}");
        }

        let live = queries::get_live_bookings_for_turf_date(&conn, "t-1", "2030-06-16").unwrap();
        for a in &live {
            for b in &live {
                if a.id != b.id {
                    assert!(!slots::conflicts(
                        &a.start_time,
                        &a.end_time,
                        &b.start_time,
                        &b.end_time
                    ));
                }
            }
        }
    }
}
