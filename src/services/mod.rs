//! Request-to-data logic shared by the handlers. Every function is generic
//! over the store traits it needs, so the same code runs against Postgres
//! and the in-memory store.

pub mod applications;
pub mod conversations;
pub mod matching;
pub mod notifications;
pub mod preferences;
pub mod profile;
pub mod skills;
pub mod users;

use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("file storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ServiceError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
