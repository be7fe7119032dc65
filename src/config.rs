use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub mail_api_key: String,
    pub mail_from: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_phone_number: String,
    pub sms_country_prefix: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "goturf.db".to_string()),
            razorpay_key_id: env::var("RAZORPAY_KEY_ID").unwrap_or_default(),
            razorpay_key_secret: env::var("RAZORPAY_KEY_SECRET").unwrap_or_default(),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "bookings@goturf.example".to_string()),
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID").unwrap_or_default(),
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN").unwrap_or_default(),
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            sms_country_prefix: env::var("SMS_COUNTRY_PREFIX").unwrap_or_else(|_| "+91".to_string()),
        }
    }
}
