use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Uploaded resume metadata. `file_path` is relative to the upload directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub user_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: String,
    pub file_size: i64,
}

/// At most one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub user_id: i64,
    pub github_link: Option<String>,
    pub linked_in_link: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioLinks {
    pub github_link: Option<String>,
    pub linked_in_link: Option<String>,
}

impl PortfolioLinks {
    /// Drops empty strings so they never overwrite stored links
    pub fn normalized(self) -> Self {
        let keep = |link: Option<String>| link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty());
        Self {
            github_link: keep(self.github_link),
            linked_in_link: keep(self.linked_in_link),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.github_link.is_none() && self.linked_in_link.is_none()
    }

    /// Apply onto an existing row, keeping links that were not supplied
    pub fn merge_into(&self, portfolio: &mut Portfolio) {
        if let Some(link) = &self.github_link {
            portfolio.github_link = Some(link.clone());
        }
        if let Some(link) = &self.linked_in_link {
            portfolio.linked_in_link = Some(link.clone());
        }
    }
}
