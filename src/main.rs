use std::sync::{Arc, Mutex};

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use goturf::config::AppConfig;
use goturf::services::notifications::mail::HttpMailProvider;
use goturf::services::notifications::twilio::TwilioSmsProvider;
use goturf::services::payments::razorpay::RazorpayGateway;
use goturf::state::AppState;
use goturf::{db, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let conn = db::init_db(&config.database_url)?;

    let payments = RazorpayGateway::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    );
    let email = HttpMailProvider::new(config.mail_api_key.clone(), config.mail_from.clone());
    let sms = TwilioSmsProvider::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_phone_number.clone(),
    );

    let port = config.port;
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config,
        payments: Box::new(payments),
        email: Box::new(email),
        sms: Box::new(sms),
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/turfs",
            get(handlers::turfs::list_turfs).post(handlers::turfs::create_turf),
        )
        .route("/api/turfs/:id", get(handlers::turfs::get_turf))
        .route(
            "/api/turfs/:id/available-slots",
            get(handlers::turfs::available_slots),
        )
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings/my", get(handlers::bookings::my_bookings))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route("/api/reviews", post(handlers::reviews::create_review))
        .route(
            "/api/reviews/turf/:turf_id",
            get(handlers::reviews::turf_reviews),
        )
        .route(
            "/api/favorites",
            get(handlers::favorites::list_favorites).post(handlers::favorites::add_favorite),
        )
        .route(
            "/api/favorites/:turf_id",
            delete(handlers::favorites::remove_favorite),
        )
        .route(
            "/api/favorites/check/:turf_id",
            get(handlers::favorites::check_favorite),
        )
        .route(
            "/api/payments/create-order",
            post(handlers::payments::create_order),
        )
        .route(
            "/api/payments/verify",
            post(handlers::payments::verify_payment),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
