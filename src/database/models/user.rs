use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::application::AppliedJob;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// External identity; the `userId` claim of the owner's token
    pub user_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub pincode: Option<String>,
    #[sqlx(skip)]
    pub applied_for: Vec<AppliedJob>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload as received; required fields are checked by the service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub pincode: Option<String>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub pincode: Option<String>,
}

/// Display info for the other side of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    pub user_id: i64,
    pub full_name: String,
}
