use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// String form of a job id. Clients send `7`, `"7"` and occasionally
/// something stranger; every comparison goes through this.
pub fn job_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One entry of a user's applied-jobs list, stored as the client sent it.
/// Only `id` is interpreted (through [`job_key`]); `appliedOn` and `status`
/// are named so applicant lookups can project them, whatever their type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJob {
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_on: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppliedJob {
    pub fn new(id: Value) -> Self {
        Self {
            id,
            applied_on: None,
            status: None,
            extra: Map::new(),
        }
    }

    pub fn key(&self) -> String {
        job_key(&self.id)
    }

    pub fn matches(&self, job_id: &str) -> bool {
        self.key() == job_id
    }

    /// An object is taken as a full entry; any other value is a bare job id.
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
            id => Ok(Self::new(id)),
        }
    }
}

/// Sets `status` on every entry matching `job_id` and returns the first one
/// touched. Other fields and other entries are left alone; `None` means
/// nothing matched and nothing changed.
pub fn apply_status(entries: &mut [AppliedJob], job_id: &str, status: &str) -> Option<AppliedJob> {
    let mut first = None;
    for entry in entries.iter_mut().filter(|e| e.matches(job_id)) {
        entry.status = Some(Value::String(status.to_string()));
        if first.is_none() {
            first = Some(entry.clone());
        }
    }
    first
}

/// A user listed against a job, without their full `appliedFor` list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: String,
    pub applied_on: Option<Value>,
    pub status: Option<Value>,
}

/// Outcome of a per-entry status write
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    UserMissing,
    EntryMissing,
    Updated(AppliedJob),
}
