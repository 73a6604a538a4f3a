use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: i64,
    pub user_id: i64,
    pub skill: String,
    pub level: Option<String>,
    pub rating: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSkill {
    pub skill: String,
    pub level: Option<String>,
    pub rating: Option<i32>,
}

/// Replacement values for an existing skill row
#[derive(Debug, Clone, PartialEq)]
pub struct SkillChanges {
    pub user_id: Option<i64>,
    pub skill: String,
    pub level: Option<String>,
    pub rating: Option<i32>,
}
