use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub turf_id: String,
    pub user_id: String,
    pub booking_id: String,
    pub rating: i64,
    pub comment: String,
    pub player_name: String,
    pub created_at: NaiveDateTime,
}
