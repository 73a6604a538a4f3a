use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Direct message. Rows are never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The other participant, seen from `user_id`
    pub fn peer_of(&self, user_id: i64) -> i64 {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: String,
}
