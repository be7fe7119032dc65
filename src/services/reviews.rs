use chrono::Utc;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingStatus, Review, User};

const TOP_RATED_MIN_AVG: f64 = 4.5;
const TOP_RATED_MIN_REVIEWS: i64 = 10;

pub struct NewReview {
    pub turf_id: String,
    pub booking_id: String,
    pub rating: i64,
    pub comment: String,
    pub player_name: Option<String>,
}

/// Creates a review for a completed booking and recomputes the turf's rating
/// aggregates in the same transaction, so the displayed rating can never
/// drift from the underlying reviews.
pub fn create_review(
    conn: &mut Connection,
    user: &User,
    req: NewReview,
) -> Result<Review, AppError> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    if req.comment.trim().len() < 10 {
        return Err(AppError::Validation(
            "comment must be at least 10 characters".to_string(),
        ));
    }

    let booking = queries::get_booking(conn, &req.booking_id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;
    if booking.user_id != user.id {
        return Err(AppError::Unauthorized);
    }
    if booking.status != BookingStatus::Completed {
        return Err(AppError::Validation(
            "can only review completed bookings".to_string(),
        ));
    }
    if booking.turf_id != req.turf_id {
        return Err(AppError::Validation(
            "booking does not belong to this turf".to_string(),
        ));
    }
    if queries::review_exists_for_booking(conn, &req.booking_id)? {
        return Err(AppError::DuplicateReview);
    }

    let review = Review {
        id: uuid::Uuid::new_v4().to_string(),
        turf_id: req.turf_id,
        user_id: user.id.clone(),
        booking_id: req.booking_id,
        rating: req.rating,
        comment: req.comment.trim().to_string(),
        player_name: req.player_name.unwrap_or_else(|| user.name.clone()),
        created_at: Utc::now().naive_utc(),
    };

    let tx = conn.transaction()?;
    queries::insert_review(&tx, &review)?;
    recompute_turf_rating(&tx, &review.turf_id)?;
    tx.commit()?;

    Ok(review)
}

/// Idempotent full recompute from the review rows; no incremental running
/// average. Average is rounded half-up to one decimal place.
pub fn recompute_turf_rating(conn: &Connection, turf_id: &str) -> Result<(), AppError> {
    let ratings = queries::get_ratings_for_turf(conn, turf_id)?;

    let (average, count) = if ratings.is_empty() {
        (0.0, 0)
    } else {
        let sum: i64 = ratings.iter().sum();
        let avg = sum as f64 / ratings.len() as f64;
        ((avg * 10.0).round() / 10.0, ratings.len() as i64)
    };
    let is_top_rated = average >= TOP_RATED_MIN_AVG && count >= TOP_RATED_MIN_REVIEWS;

    queries::update_turf_rating(conn, turf_id, average, count, is_top_rated)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Booking, PaymentMethod, Turf, TurfCategory, UserRole};

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

        let now = Utc::now().naive_utc();
        let turf = Turf {
            id: "t-1".to_string(),
            name: "Green Arena".to_string(),
            description: "Well maintained 5-a-side turf".to_string(),
            location: "Andheri West, Mumbai".to_string(),
            price_per_hour: 500.0,
            category: TurfCategory::Football,
            amenities: vec![],
            image_url: None,
            owner_id: "u-owner".to_string(),
            is_active: true,
            average_rating: 0.0,
            total_reviews: 0,
            is_top_rated: false,
            created_at: now,
            updated_at: now,
        };
        queries::create_turf(&conn, &turf).unwrap();
        (conn, user)
    }

    fn completed_booking(conn: &Connection, id: &str, user_id: &str, start_hour: u32) {
        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: id.to_string(),
            booking_ref: format!("GT{id}"),
            turf_id: "t-1".to_string(),
            user_id: user_id.to_string(),
            date: "2025-06-16".to_string(),
            start_time: format!("{start_hour:02}:00"),
            end_time: format!("{:02}:00", start_hour + 1),
            total_price: 500.0,
            status: BookingStatus::Completed,
            player_name: "Alice".to_string(),
            player_phone: "9876543210".to_string(),
            player_age: None,
            player_gender: None,
            player_address: None,
            notes: None,
            payment_method: PaymentMethod::Cash,
            payment_id: None,
            email_sent: false,
            sms_sent: false,
            created_at: now,
            updated_at: now,
        };
        queries::insert_booking(conn, &booking).unwrap();
    }

    fn review_request(booking_id: &str, rating: i64) -> NewReview {
        NewReview {
            turf_id: "t-1".to_string(),
            booking_id: booking_id.to_string(),
            rating,
            comment: "Great pitch, well maintained".to_string(),
            player_name: None,
        }
    }

    #[test]
    fn test_review_updates_aggregates() {
        let (mut conn, user) = setup();
        completed_booking(&conn, "b-1", &user.id, 10);

        create_review(&mut conn, &user, review_request("b-1", 4)).unwrap();

        let turf = queries::get_turf(&conn, "t-1").unwrap().unwrap();
        assert_eq!(turf.average_rating, 4.0);
        assert_eq!(turf.total_reviews, 1);
        assert!(!turf.is_top_rated);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let (mut conn, user) = setup();
        completed_booking(&conn, "b-1", &user.id, 10);
        completed_booking(&conn, "b-2", &user.id, 11);
        completed_booking(&conn, "b-3", &user.id, 12);

        create_review(&mut conn, &user, review_request("b-1", 5)).unwrap();
        create_review(&mut conn, &user, review_request("b-2", 4)).unwrap();
        create_review(&mut conn, &user, review_request("b-3", 4)).unwrap();

        // 13/3 = 4.333... -> 4.3
        let turf = queries::get_turf(&conn, "t-1").unwrap().unwrap();
        assert_eq!(turf.average_rating, 4.3);
        assert_eq!(turf.total_reviews, 3);
    }

    #[test]
    fn test_top_rated_requires_ten_reviews() {
        let (mut conn, user) = setup();
        let ratings = [5, 5, 5, 5, 5, 4, 5, 5, 5, 5];

        for (i, rating) in ratings.iter().enumerate() {
            let id = format!("b-{i}");
            completed_booking(&conn, &id, &user.id, 6 + i as u32);
            create_review(&mut conn, &user, review_request(&id, *rating)).unwrap();

            let turf = queries::get_turf(&conn, "t-1").unwrap().unwrap();
            if i < 9 {
                assert!(!turf.is_top_rated, "not top rated at {} reviews", i + 1);
            }
        }

        let turf = queries::get_turf(&conn, "t-1").unwrap().unwrap();
        assert_eq!(turf.average_rating, 4.9);
        assert_eq!(turf.total_reviews, 10);
        assert!(turf.is_top_rated);
    }

    #[test]
    fn test_duplicate_review_rejected() {
        let (mut conn, user) = setup();
        completed_booking(&conn, "b-1", &user.id, 10);

        create_review(&mut conn, &user, review_request("b-1", 5)).unwrap();
        let err = create_review(&mut conn, &user, review_request("b-1", 3)).unwrap_err();
        assert!(matches!(err, AppError::DuplicateReview));
    }

    #[test]
    fn test_only_booker_may_review() {
        let (mut conn, user) = setup();
        completed_booking(&conn, "b-1", "someone-else", 10);

        let err = create_review(&mut conn, &user, review_request("b-1", 5)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_only_completed_bookings_reviewable() {
        let (mut conn, user) = setup();
        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: "b-1".to_string(),
            booking_ref: "GTb1".to_string(),
            turf_id: "t-1".to_string(),
            user_id: user.id.clone(),
            date: "2030-06-16".to_string(),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            total_price: 500.0,
            status: BookingStatus::Confirmed,
            player_name: "Alice".to_string(),
            player_phone: "9876543210".to_string(),
            player_age: None,
            player_gender: None,
            player_address: None,
            notes: None,
            payment_method: PaymentMethod::Online,
            payment_id: None,
            email_sent: false,
            sms_sent: false,
            created_at: now,
            updated_at: now,
        };
        queries::insert_booking(&conn, &booking).unwrap();

        let err = create_review(&mut conn, &user, review_request("b-1", 5)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_rating_and_comment_validation() {
        let (mut conn, user) = setup();
        completed_booking(&conn, "b-1", &user.id, 10);

        let err = create_review(&mut conn, &user, review_request("b-1", 0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = create_review(&mut conn, &user, review_request("b-1", 6)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut req = review_request("b-1", 5);
        req.comment = "too short".to_string();
        let err = create_review(&mut conn, &user, req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_zero_reviews_resets_aggregates() {
        let (conn, _user) = setup();
        recompute_turf_rating(&conn, "t-1").unwrap();

        let turf = queries::get_turf(&conn, "t-1").unwrap().unwrap();
        assert_eq!(turf.average_rating, 0.0);
        assert_eq!(turf.total_reviews, 0);
        assert!(!turf.is_top_rated);
    }
}
