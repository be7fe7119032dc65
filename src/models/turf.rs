use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turf {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price_per_hour: f64,
    pub category: TurfCategory,
    pub amenities: Vec<String>,
    pub image_url: Option<String>,
    pub owner_id: String,
    pub is_active: bool,
    // Derived rating aggregates, owned by the review-aggregation routine.
    pub average_rating: f64,
    pub total_reviews: i64,
    pub is_top_rated: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TurfCategory {
    Football,
    Cricket,
    Hockey,
    Badminton,
    Basketball,
    Multipurpose,
}

impl TurfCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurfCategory::Football => "football",
            TurfCategory::Cricket => "cricket",
            TurfCategory::Hockey => "hockey",
            TurfCategory::Badminton => "badminton",
            TurfCategory::Basketball => "basketball",
            TurfCategory::Multipurpose => "multipurpose",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "football" => Some(TurfCategory::Football),
            "cricket" => Some(TurfCategory::Cricket),
            "hockey" => Some(TurfCategory::Hockey),
            "badminton" => Some(TurfCategory::Badminton),
            "basketball" => Some(TurfCategory::Basketball),
            "multipurpose" => Some(TurfCategory::Multipurpose),
            _ => None,
        }
    }
}
