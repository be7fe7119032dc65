use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub token: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Player,
    Owner,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Player => "player",
            UserRole::Owner => "owner",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "owner" => UserRole::Owner,
            "admin" => UserRole::Admin,
            _ => UserRole::Player,
        }
    }
}
