use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Booking;

/// Operating hours: slots start at 06:00 through 22:00, last slot ends 23:00.
pub const OPEN_HOUR: u32 = 6;
pub const CLOSE_HOUR: u32 = 23;

#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub start_time: String,
    pub end_time: String,
    pub hour: u32,
    pub price: f64,
}

/// Half-open interval overlap on zero-padded HH:MM strings, where
/// lexicographic order equals temporal order. Touching intervals
/// (one ending exactly when the other starts) do not overlap.
pub fn conflicts(a_start: &str, a_end: &str, b_start: &str, b_end: &str) -> bool {
    a_start < b_end && b_start < a_end
}

/// First non-cancelled booking whose [start, end) interval overlaps the
/// candidate. Callers pass bookings already filtered to (turf, date).
pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    start_time: &str,
    end_time: &str,
) -> Option<&'a Booking> {
    bookings
        .iter()
        .find(|b| conflicts(&b.start_time, &b.end_time, start_time, end_time))
}

/// Parses the hour component of an HH:MM time, validating the full format.
pub fn parse_hour(time: &str) -> Result<u32, AppError> {
    let err = || AppError::Validation(format!("invalid time format: {time}"));

    let (hour_str, minute_str) = time.split_once(':').ok_or_else(err)?;
    if hour_str.len() != 2 || minute_str.len() != 2 {
        return Err(err());
    }
    let hour: u32 = hour_str.parse().map_err(|_| err())?;
    let minute: u32 = minute_str.parse().map_err(|_| err())?;
    if hour > 23 || minute > 59 {
        return Err(err());
    }
    Ok(hour)
}

pub fn validate_date(date: &str) -> Result<(), AppError> {
    let valid = date.len() == 10
        && chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if !valid {
        return Err(AppError::Validation(format!(
            "date must be in YYYY-MM-DD format: {date}"
        )));
    }
    Ok(())
}

/// Pricing is hour-granular: minutes are parsed but ignored, so 10:00-11:30
/// prices the same as 10:00-11:00. Intentional product behavior.
pub fn quote_price(
    start_time: &str,
    end_time: &str,
    price_per_hour: f64,
) -> Result<f64, AppError> {
    let start_hour = parse_hour(start_time)?;
    let end_hour = parse_hour(end_time)?;
    if end_hour <= start_hour {
        return Err(AppError::Validation(
            "end time must be after start time".to_string(),
        ));
    }
    Ok((end_hour - start_hour) as f64 * price_per_hour)
}

/// Open hourly slots for a turf on a date, ascending. A slot hour is excluded
/// when a live booking covers it, or — for today — when the hour is not
/// strictly in the future (the current hour is excluded too; policy, not an
/// off-by-one).
pub fn available_slots(
    price_per_hour: f64,
    bookings: &[Booking],
    date: &str,
    now: NaiveDateTime,
) -> Result<Vec<Slot>, AppError> {
    let occupied: Vec<(u32, u32)> = bookings
        .iter()
        .map(|b| Ok((parse_hour(&b.start_time)?, parse_hour(&b.end_time)?)))
        .collect::<Result<_, AppError>>()?;

    let is_today = date == now.format("%Y-%m-%d").to_string();
    let current_hour = now.hour();

    let mut slots = vec![];
    for hour in OPEN_HOUR..CLOSE_HOUR {
        if is_today && hour <= current_hour {
            continue;
        }
        let booked = occupied
            .iter()
            .any(|&(start, end)| hour >= start && hour < end);
        if booked {
            continue;
        }
        slots.push(Slot {
            start_time: format!("{hour:02}:00"),
            end_time: format!("{:02}:00", hour + 1),
            hour,
            price: price_per_hour,
        });
    }
    Ok(slots)
}

/// Confirmation code: GT + millisecond timestamp + 4 random alphanumerics.
/// The random suffix keeps same-millisecond creations distinct; the UNIQUE
/// column on booking_ref is the hard guarantee.
pub fn new_booking_ref() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();
    format!("GT{millis}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, PaymentMethod};

    fn booking(start: &str, end: &str) -> Booking {
        let now = chrono::Utc::now().naive_utc();
        Booking {
            id: "b-1".to_string(),
            booking_ref: "GT1TEST".to_string(),
            turf_id: "t-1".to_string(),
            user_id: "u-1".to_string(),
            date: "2025-06-16".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
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
        }
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_overlapping_intervals_conflict() {
        assert!(conflicts("10:00", "11:00", "10:30", "11:30"));
        assert!(conflicts("10:30", "11:30", "10:00", "11:00"));
        // Candidate fully contains existing
        assert!(conflicts("10:00", "11:00", "09:00", "12:00"));
        // Existing fully contains candidate
        assert!(conflicts("09:00", "12:00", "10:00", "11:00"));
        assert!(conflicts("10:00", "11:00", "10:00", "11:00"));
    }

    #[test]
    fn test_touching_intervals_do_not_conflict() {
        assert!(!conflicts("10:00", "11:00", "11:00", "12:00"));
        assert!(!conflicts("11:00", "12:00", "10:00", "11:00"));
    }

    #[test]
    fn test_disjoint_intervals_do_not_conflict() {
        assert!(!conflicts("06:00", "08:00", "20:00", "22:00"));
    }

    #[test]
    fn test_find_conflict_skips_clear_slots() {
        let bookings = vec![booking("10:00", "11:00")];
        assert!(find_conflict(&bookings, "10:30", "11:30").is_some());
        assert!(find_conflict(&bookings, "11:00", "12:00").is_none());
        assert!(find_conflict(&bookings, "09:00", "10:00").is_none());
    }

    #[test]
    fn test_parse_hour() {
        assert_eq!(parse_hour("06:00").unwrap(), 6);
        assert_eq!(parse_hour("22:30").unwrap(), 22);
        assert!(parse_hour("24:00").is_err());
        assert!(parse_hour("10:60").is_err());
        assert!(parse_hour("10").is_err());
        assert!(parse_hour("1:00").is_err());
        assert!(parse_hour("ab:cd").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2025-06-16").is_ok());
        assert!(validate_date("2025-13-01").is_err());
        assert!(validate_date("16-06-2025").is_err());
        assert!(validate_date("not-a-date").is_err());
    }

    #[test]
    fn test_quote_price() {
        assert_eq!(quote_price("14:00", "17:00", 500.0).unwrap(), 1500.0);
        assert_eq!(quote_price("10:00", "11:00", 800.0).unwrap(), 800.0);
    }

    #[test]
    fn test_quote_price_ignores_minutes() {
        // 10:00-11:30 prices as one hour
        assert_eq!(quote_price("10:00", "11:30", 500.0).unwrap(), 500.0);
    }

    #[test]
    fn test_quote_price_rejects_inverted_interval() {
        assert!(quote_price("11:00", "11:00", 500.0).is_err());
        assert!(quote_price("12:00", "10:00", 500.0).is_err());
    }

    #[test]
    fn test_all_slots_open_on_future_date() {
        let slots = available_slots(500.0, &[], "2025-06-16", dt("2025-06-01 12:00")).unwrap();
        assert_eq!(slots.len(), 17);
        assert_eq!(slots[0].hour, 6);
        assert_eq!(slots[0].start_time, "06:00");
        assert_eq!(slots[0].end_time, "07:00");
        assert_eq!(slots[16].hour, 22);
        assert_eq!(slots[16].end_time, "23:00");
        assert!(slots.iter().all(|s| s.price == 500.0));
    }

    #[test]
    fn test_booked_hours_excluded() {
        let bookings = vec![booking("09:00", "11:00")];
        let slots = available_slots(500.0, &bookings, "2025-06-16", dt("2025-06-01 12:00")).unwrap();
        let hours: Vec<u32> = slots.iter().map(|s| s.hour).collect();
        assert!(!hours.contains(&9));
        assert!(!hours.contains(&10));
        assert!(hours.contains(&8));
        assert!(hours.contains(&11));
        assert_eq!(hours.len(), 15);
    }

    #[test]
    fn test_today_excludes_current_and_past_hours() {
        let slots = available_slots(500.0, &[], "2025-06-16", dt("2025-06-16 14:10")).unwrap();
        let hours: Vec<u32> = slots.iter().map(|s| s.hour).collect();
        assert!(!hours.contains(&14), "current hour must be excluded");
        assert!(!hours.contains(&6));
        assert_eq!(hours, (15..23).collect::<Vec<u32>>());
    }

    #[test]
    fn test_fully_booked_day_yields_no_slots() {
        let bookings = vec![booking("06:00", "23:00")];
        let slots = available_slots(500.0, &bookings, "2025-06-16", dt("2025-06-01 12:00")).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn test_booking_refs_distinct_within_same_millisecond() {
        let a = new_booking_ref();
        let b = new_booking_ref();
        assert_ne!(a, b);
        assert!(a.starts_with("GT"));
    }
}
