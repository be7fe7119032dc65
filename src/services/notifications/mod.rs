pub mod mail;
pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::queries;
use crate::models::Booking;
use crate::state::AppState;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> anyhow::Result<()>;
}

pub fn booking_email(booking: &Booking, turf_name: &str) -> (String, String) {
    let subject = format!("Booking Confirmation - {turf_name}");
    let body = format!(
        "Dear {name},\n\n\
         Your turf booking has been confirmed.\n\n\
         Turf: {turf_name}\n\
         Date: {date}\n\
         Time: {start} - {end}\n\
         Total Amount: Rs. {price}\n\
         Booking ID: {booking_ref}\n\n\
         Please arrive 15 minutes before your scheduled time and bring a valid ID.\n\n\
         Thank you for choosing GoTurf!",
        name = booking.player_name,
        date = booking.date,
        start = booking.start_time,
        end = booking.end_time,
        price = booking.total_price,
        booking_ref = booking.booking_ref,
    );
    (subject, body)
}

pub fn booking_sms(booking: &Booking, turf_name: &str) -> String {
    format!(
        "Hi {name}! Your GoTurf booking is confirmed.\n\
         Turf: {turf_name}\n\
         Date: {date}\n\
         Time: {start}-{end}\n\
         Booking ID: {booking_ref}",
        name = booking.player_name,
        date = booking.date,
        start = booking.start_time,
        end = booking.end_time,
        booking_ref = booking.booking_ref,
    )
}

/// Best-effort confirmation dispatch, run after the booking transaction has
/// committed. Failures are logged and recorded in the email_sent/sms_sent
/// flags; they never fail the booking.
pub async fn dispatch_booking_confirmation(
    state: Arc<AppState>,
    booking: Booking,
    turf_name: String,
    user_email: String,
) {
    let (subject, email_body) = booking_email(&booking, &turf_name);
    let email_sent = match state.email.send_email(&user_email, &subject, &email_body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, booking_id = %booking.id, "confirmation email failed");
            false
        }
    };

    let sms_body = booking_sms(&booking, &turf_name);
    let sms_to = format!("{}{}", state.config.sms_country_prefix, booking.player_phone);
    let sms_sent = match state.sms.send_sms(&sms_to, &sms_body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, booking_id = %booking.id, "confirmation SMS failed");
            false
        }
    };

    let db = state.db.lock().unwrap();
    if let Err(e) = queries::set_notification_flags(&db, &booking.id, email_sent, sms_sent) {
        tracing::error!(error = %e, booking_id = %booking.id, "failed to record notification flags");
    }
}
