use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub id: i64,
    pub user_id: i64,
    pub employment_type: String,
    pub location: String,
    pub shift: String,
    pub workplace: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Preference {
    pub fn clear(&mut self, field: PreferenceField) {
        match field {
            PreferenceField::EmploymentType => self.employment_type.clear(),
            PreferenceField::Location => self.location.clear(),
            PreferenceField::Shift => self.shift.clear(),
            PreferenceField::Workplace => self.workplace.clear(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPreference {
    #[serde(deserialize_with = "super::numeric_id::deserialize")]
    pub user_id: i64,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub shift: String,
    #[serde(default)]
    pub workplace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdate {
    #[serde(default, deserialize_with = "super::numeric_id::option::deserialize")]
    pub user_id: Option<i64>,
    pub employment_type: Option<String>,
    pub location: Option<String>,
    pub shift: Option<String>,
    pub workplace: Option<String>,
}

impl PreferenceUpdate {
    pub fn apply(&self, preference: &mut Preference) {
        if let Some(user_id) = self.user_id {
            preference.user_id = user_id;
        }
        if let Some(v) = &self.employment_type {
            preference.employment_type = v.clone();
        }
        if let Some(v) = &self.location {
            preference.location = v.clone();
        }
        if let Some(v) = &self.shift {
            preference.shift = v.clone();
        }
        if let Some(v) = &self.workplace {
            preference.workplace = v.clone();
        }
    }
}

/// The only preference columns a caller may clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceField {
    EmploymentType,
    Location,
    Shift,
    Workplace,
}

impl PreferenceField {
    pub fn column(self) -> &'static str {
        match self {
            PreferenceField::EmploymentType => "employment_type",
            PreferenceField::Location => "location",
            PreferenceField::Shift => "shift",
            PreferenceField::Workplace => "workplace",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PreferenceField::EmploymentType => "employmentType",
            PreferenceField::Location => "location",
            PreferenceField::Shift => "shift",
            PreferenceField::Workplace => "workplace",
        }
    }
}

impl FromStr for PreferenceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employmentType" => Ok(PreferenceField::EmploymentType),
            "location" => Ok(PreferenceField::Location),
            "shift" => Ok(PreferenceField::Shift),
            "workplace" => Ok(PreferenceField::Workplace),
            other => Err(format!("Invalid field name: {}", other)),
        }
    }
}

impl fmt::Display for PreferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
