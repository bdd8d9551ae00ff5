use thiserror::Error;
use tokio::{io, task::JoinError};

use crate::settings::SettingsError;

pub type SchemaResult<T> = core::result::Result<T, SchemaError>;
pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

/// Failure to turn a decoded export into the typed model.
///
/// `path` is a JSON path of the object holding the offending key, e.g.
/// `$.dayEntries[3]`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("{entity}.{field} (key \"{key}\") at {path}: missing required field")]
    MissingField {
        entity: &'static str,
        field: String,
        key: String,
        path: String,
    },
    #[error("{entity}.{field} (key \"{key}\") at {path}: expected {expected}, found {actual}")]
    TypeMismatch {
        entity: &'static str,
        field: String,
        key: String,
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("{entity} at {path}: expected object, found {actual}")]
    NotAnObject {
        entity: &'static str,
        path: String,
        actual: &'static str,
    },
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("{entity} has no registered field '{field}'")]
    UnregisteredField { entity: &'static str, field: String },
    /// An overflow entry that would decode as registered data.
    #[error("{entity} overflow key \"{key}\" collides with a registered field")]
    OverflowCollision { entity: &'static str, key: String },
    #[error("{entity} milestone {milestone} has no progress set")]
    EmptyMilestone {
        entity: &'static str,
        milestone: String,
    },
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Json(err.to_string())
    }
}

impl SchemaError {
    /// Entity named by the error, if any.
    pub fn entity(&self) -> Option<&'static str> {
        match self {
            SchemaError::MissingField { entity, .. }
            | SchemaError::TypeMismatch { entity, .. }
            | SchemaError::NotAnObject { entity, .. }
            | SchemaError::UnregisteredField { entity, .. }
            | SchemaError::OverflowCollision { entity, .. }
            | SchemaError::EmptyMilestone { entity, .. } => Some(entity),
            SchemaError::Json(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("{0}")]
    Settings(#[from] SettingsError),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("worker task failed: {0}")]
    Join(#[from] JoinError),
    #[error("{0}")]
    Other(String),
}
