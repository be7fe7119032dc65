use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    /// Human-facing confirmation code, distinct from the row id. Generated
    /// once at creation and never regenerated.
    pub booking_ref: String,
    pub turf_id: String,
    pub user_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM, zero-padded
    pub start_time: String,
    /// HH:MM, zero-padded
    pub end_time: String,
    pub total_price: f64,
    pub status: BookingStatus,
    pub player_name: String,
    pub player_phone: String,
    pub player_age: Option<i64>,
    pub player_gender: Option<String>,
    pub player_address: Option<String>,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    pub email_sent: bool,
    pub sms_sent: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cash" => PaymentMethod::Cash,
            _ => PaymentMethod::Online,
        }
    }
}
