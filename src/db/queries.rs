use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Booking, BookingStatus, PaymentMethod, Review, Turf, TurfCategory, User, UserRole,
};

// ── Users ──

pub fn get_user_by_token(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, role, token FROM users WHERE token = ?1",
        params![token],
        |row| {
            let role_str: String = row.get(4)?;
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                role: UserRole::parse(&role_str),
                token: row.get(5)?,
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, role, token FROM users WHERE id = ?1",
        params![id],
        |row| {
            let role_str: String = row.get(4)?;
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                role: UserRole::parse(&role_str),
                token: row.get(5)?,
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, phone, role, token)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           email = excluded.email,
           phone = excluded.phone,
           role = excluded.role,
           token = excluded.token",
        params![
            user.id,
            user.name,
            user.email,
            user.phone,
            user.role.as_str(),
            user.token,
        ],
    )?;
    Ok(())
}

// ── Turfs ──

#[derive(Debug, Default, Clone)]
pub struct TurfFilter {
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub location: Option<String>,
}

const TURF_COLUMNS: &str = "id, name, description, location, price_per_hour, category, amenities, \
     image_url, owner_id, is_active, average_rating, total_reviews, is_top_rated, \
     created_at, updated_at";

pub fn create_turf(conn: &Connection, turf: &Turf) -> anyhow::Result<()> {
    let amenities = serde_json::to_string(&turf.amenities)?;
    let created_at = turf.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = turf.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO turfs (id, name, description, location, price_per_hour, category, amenities,
                            image_url, owner_id, is_active, average_rating, total_reviews,
                            is_top_rated, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            turf.id,
            turf.name,
            turf.description,
            turf.location,
            turf.price_per_hour,
            turf.category.as_str(),
            amenities,
            turf.image_url,
            turf.owner_id,
            turf.is_active as i32,
            turf.average_rating,
            turf.total_reviews,
            turf.is_top_rated as i32,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_turf(conn: &Connection, id: &str) -> anyhow::Result<Option<Turf>> {
    let result = conn.query_row(
        &format!("SELECT {TURF_COLUMNS} FROM turfs WHERE id = ?1"),
        params![id],
        |row| Ok(parse_turf_row(row)),
    );

    match result {
        Ok(turf) => Ok(Some(turf?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn turf_filter_clauses(
    filter: &TurfFilter,
) -> (String, Vec<Box<dyn rusqlite::types::ToSql>>) {
    let mut clauses = vec!["is_active = 1".to_string()];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(category) = &filter.category {
        params_vec.push(Box::new(category.clone()));
        clauses.push(format!("category = ?{}", params_vec.len()));
    }
    if let Some(min) = filter.min_price {
        params_vec.push(Box::new(min));
        clauses.push(format!("price_per_hour >= ?{}", params_vec.len()));
    }
    if let Some(max) = filter.max_price {
        params_vec.push(Box::new(max));
        clauses.push(format!("price_per_hour <= ?{}", params_vec.len()));
    }
    if let Some(location) = &filter.location {
        params_vec.push(Box::new(format!("%{}%", location.to_lowercase())));
        clauses.push(format!("LOWER(location) LIKE ?{}", params_vec.len()));
    }

    (clauses.join(" AND "), params_vec)
}

pub fn list_turfs(
    conn: &Connection,
    filter: &TurfFilter,
    sort_by: &str,
    sort_desc: bool,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Turf>> {
    // Sort column is interpolated into SQL, so it must come from a whitelist.
    let sort_col = match sort_by {
        "price_per_hour" | "average_rating" | "name" => sort_by,
        _ => "created_at",
    };
    let order = if sort_desc { "DESC" } else { "ASC" };

    let (where_clause, mut params_vec) = turf_filter_clauses(filter);
    params_vec.push(Box::new(limit));
    let limit_idx = params_vec.len();
    params_vec.push(Box::new(offset));
    let offset_idx = params_vec.len();

    let sql = format!(
        "SELECT {TURF_COLUMNS} FROM turfs WHERE {where_clause} \
         ORDER BY {sort_col} {order} LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_turf_row(row)))?;

    let mut turfs = vec![];
    for row in rows {
        turfs.push(row??);
    }
    Ok(turfs)
}

pub fn count_turfs(conn: &Connection, filter: &TurfFilter) -> anyhow::Result<i64> {
    let (where_clause, params_vec) = turf_filter_clauses(filter);
    let sql = format!("SELECT COUNT(*) FROM turfs WHERE {where_clause}");

    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let count: i64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn update_turf_rating(
    conn: &Connection,
    turf_id: &str,
    average_rating: f64,
    total_reviews: i64,
    is_top_rated: bool,
) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE turfs SET average_rating = ?1, total_reviews = ?2, is_top_rated = ?3,
                          updated_at = datetime('now')
         WHERE id = ?4",
        params![average_rating, total_reviews, is_top_rated as i32, turf_id],
    )?;
    Ok(())
}

fn parse_turf_row(row: &rusqlite::Row) -> anyhow::Result<Turf> {
    let category_str: String = row.get(5)?;
    let amenities_json: String = row.get(6)?;
    let created_at_str: String = row.get(13)?;
    let updated_at_str: String = row.get(14)?;

    Ok(Turf {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        price_per_hour: row.get(4)?,
        category: TurfCategory::parse(&category_str).unwrap_or(TurfCategory::Multipurpose),
        amenities: serde_json::from_str(&amenities_json).unwrap_or_default(),
        image_url: row.get(7)?,
        owner_id: row.get(8)?,
        is_active: row.get::<_, i32>(9)? != 0,
        average_rating: row.get(10)?,
        total_reviews: row.get(11)?,
        is_top_rated: row.get::<_, i32>(12)? != 0,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, booking_ref, turf_id, user_id, date, start_time, end_time, \
     total_price, status, player_name, player_phone, player_age, player_gender, player_address, \
     notes, payment_method, payment_id, email_sent, sms_sent, created_at, updated_at";

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let created_at = booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO bookings (id, booking_ref, turf_id, user_id, date, start_time, end_time,
                               total_price, status, player_name, player_phone, player_age,
                               player_gender, player_address, notes, payment_method, payment_id,
                               email_sent, sms_sent, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21)",
        params![
            booking.id,
            booking.booking_ref,
            booking.turf_id,
            booking.user_id,
            booking.date,
            booking.start_time,
            booking.end_time,
            booking.total_price,
            booking.status.as_str(),
            booking.player_name,
            booking.player_phone,
            booking.player_age,
            booking.player_gender,
            booking.player_address,
            booking.notes,
            booking.payment_method.as_str(),
            booking.payment_id,
            booking.email_sent as i32,
            booking.sms_sent as i32,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

/// Claims one row per occupied hour. The UNIQUE(turf_id, date, hour) key makes
/// concurrent overlapping inserts fail at the storage layer; the error is left
/// as rusqlite's constraint violation for the caller to map.
pub fn insert_booking_slots(
    conn: &Connection,
    booking_id: &str,
    turf_id: &str,
    date: &str,
    start_hour: u32,
    end_hour: u32,
) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare(
        "INSERT INTO booking_slots (booking_id, turf_id, date, hour) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for hour in start_hour..end_hour {
        stmt.execute(params![booking_id, turf_id, date, hour])?;
    }
    Ok(())
}

pub fn delete_booking_slots(conn: &Connection, booking_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM booking_slots WHERE booking_id = ?1",
        params![booking_id],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Non-cancelled bookings for a turf on a date, in start-time order.
pub fn get_live_bookings_for_turf_date(
    conn: &Connection,
    turf_id: &str,
    date: &str,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE turf_id = ?1 AND date = ?2 AND status != 'cancelled'
         ORDER BY start_time ASC"
    ))?;

    let rows = stmt.query_map(params![turf_id, date], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub struct UserBooking {
    pub booking: Booking,
    pub turf_name: String,
    pub turf_location: String,
}

pub fn get_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<UserBooking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}, t.name, t.location
         FROM bookings b LEFT JOIN turfs t ON b.turf_id = t.id
         WHERE b.user_id = ?1
         ORDER BY b.created_at DESC",
        BOOKING_COLUMNS
            .split(", ")
            .map(|c| format!("b.{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    ))?;

    let rows = stmt.query_map(params![user_id], |row| {
        let turf_name: Option<String> = row.get(21)?;
        let turf_location: Option<String> = row.get(22)?;
        Ok((parse_booking_row(row), turf_name, turf_location))
    })?;

    let mut bookings = vec![];
    for row in rows {
        let (booking, turf_name, turf_location) = row?;
        bookings.push(UserBooking {
            booking: booking?,
            turf_name: turf_name.unwrap_or_else(|| "Unknown Turf".to_string()),
            turf_location: turf_location.unwrap_or_default(),
        });
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

pub fn set_notification_flags(
    conn: &Connection,
    id: &str,
    email_sent: bool,
    sms_sent: bool,
) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE bookings SET email_sent = ?1, sms_sent = ?2 WHERE id = ?3",
        params![email_sent as i32, sms_sent as i32, id],
    )?;
    Ok(())
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let status_str: String = row.get(8)?;
    let payment_method_str: String = row.get(15)?;
    let created_at_str: String = row.get(19)?;
    let updated_at_str: String = row.get(20)?;

    Ok(Booking {
        id: row.get(0)?,
        booking_ref: row.get(1)?,
        turf_id: row.get(2)?,
        user_id: row.get(3)?,
        date: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        total_price: row.get(7)?,
        status: BookingStatus::parse(&status_str),
        player_name: row.get(9)?,
        player_phone: row.get(10)?,
        player_age: row.get(11)?,
        player_gender: row.get(12)?,
        player_address: row.get(13)?,
        notes: row.get(14)?,
        payment_method: PaymentMethod::parse(&payment_method_str),
        payment_id: row.get(16)?,
        email_sent: row.get::<_, i32>(17)? != 0,
        sms_sent: row.get::<_, i32>(18)? != 0,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Reviews ──

pub fn insert_review(conn: &Connection, review: &Review) -> anyhow::Result<()> {
    let created_at = review.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    conn.execute(
        "INSERT INTO reviews (id, turf_id, user_id, booking_id, rating, comment, player_name, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            review.id,
            review.turf_id,
            review.user_id,
            review.booking_id,
            review.rating,
            review.comment,
            review.player_name,
            created_at,
        ],
    )?;
    Ok(())
}

pub fn review_exists_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE booking_id = ?1",
        params![booking_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_reviews_for_turf(
    conn: &Connection,
    turf_id: &str,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Review>> {
    let mut stmt = conn.prepare(
        "SELECT id, turf_id, user_id, booking_id, rating, comment, player_name, created_at
         FROM reviews WHERE turf_id = ?1
         ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
    )?;

    let rows = stmt.query_map(params![turf_id, limit, offset], |row| {
        let created_at_str: String = row.get(7)?;
        Ok(Review {
            id: row.get(0)?,
            turf_id: row.get(1)?,
            user_id: row.get(2)?,
            booking_id: row.get(3)?,
            rating: row.get(4)?,
            comment: row.get(5)?,
            player_name: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    })?;

    let mut reviews = vec![];
    for row in rows {
        reviews.push(row?);
    }
    Ok(reviews)
}

pub fn count_reviews_for_turf(conn: &Connection, turf_id: &str) -> anyhow::Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reviews WHERE turf_id = ?1",
        params![turf_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn get_ratings_for_turf(conn: &Connection, turf_id: &str) -> anyhow::Result<Vec<i64>> {
    let mut stmt = conn.prepare("SELECT rating FROM reviews WHERE turf_id = ?1")?;
    let rows = stmt.query_map(params![turf_id], |row| row.get(0))?;

    let mut ratings = vec![];
    for row in rows {
        ratings.push(row?);
    }
    Ok(ratings)
}

// ── Favorites ──

pub fn add_favorite(conn: &Connection, user_id: &str, turf_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO favorites (user_id, turf_id) VALUES (?1, ?2)",
        params![user_id, turf_id],
    )?;
    Ok(())
}

pub fn remove_favorite(conn: &Connection, user_id: &str, turf_id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM favorites WHERE user_id = ?1 AND turf_id = ?2",
        params![user_id, turf_id],
    )?;
    Ok(count > 0)
}

pub fn is_favorite(conn: &Connection, user_id: &str, turf_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM favorites WHERE user_id = ?1 AND turf_id = ?2",
        params![user_id, turf_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_favorite_turfs(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Turf>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM favorites f INNER JOIN turfs t ON f.turf_id = t.id
         WHERE f.user_id = ?1
         ORDER BY f.created_at DESC",
        TURF_COLUMNS
            .split(", ")
            .map(|c| format!("t.{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    ))?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_turf_row(row)))?;

    let mut turfs = vec![];
    for row in rows {
        turfs.push(row??);
    }
    Ok(turfs)
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc())
}
