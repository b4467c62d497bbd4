use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential record as persisted in the aggregate user index.
/// The username is the map key and is not repeated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub password_hash: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Everything about a user except the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl UserInfo {
    pub fn from_record(username: &str, record: &UserRecord) -> Self {
        Self {
            username: username.to_string(),
            email: record.email.clone(),
            created_at: record.created_at,
        }
    }
}
