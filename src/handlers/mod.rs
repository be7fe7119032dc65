pub mod bookings;
pub mod favorites;
pub mod health;
pub mod payments;
pub mod reviews;
pub mod turfs;

use axum::http::HeaderMap;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

/// Resolves the acting user from the bearer token. Missing or unknown tokens
/// are 401; role checks downstream return 403.
pub fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() {
        return Err(AppError::Unauthenticated);
    }

    let db = state.db.lock().unwrap();
    queries::get_user_by_token(&db, token)?.ok_or(AppError::Unauthenticated)
}
