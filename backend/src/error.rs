use crate::store::StoreError;
use actix_web::http::StatusCode;
use common::outcome::ErrorKind;
use thiserror::Error;

/// Failure of a backend operation, as reported to the caller.
///
/// Notification failures are deliberately absent from the transition paths: they are
/// logged and recorded in the outbox, never turned into a `WorkflowError` there.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("storage failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("notification failed: {0}")]
    Notification(#[from] crate::notifications::NotificationError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::NotFound(_) => ErrorKind::NotFound,
            WorkflowError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            WorkflowError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            WorkflowError::InvalidInput(_) => ErrorKind::InvalidInput,
            WorkflowError::Persistence(_) => ErrorKind::PersistenceError,
            WorkflowError::Notification(_) => ErrorKind::NotificationError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidTransition => StatusCode::CONFLICT,
            ErrorKind::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::PersistenceError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::NotificationError => StatusCode::BAD_GATEWAY,
        }
    }
}

