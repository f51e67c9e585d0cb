use thiserror::Error;

use crate::domain::types::EventId;
use crate::repository::errors::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The event is unknown to the catalog or no longer active.
    ///
    /// Callers must re-validate the event before retrying.
    #[error("event {0} is unknown or inactive")]
    InvalidEvent(EventId),
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// A value failed domain type constraints.
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    /// A submitted form failed validation.
    #[error("invalid form: {0}")]
    Form(String),
    /// The storage layer failed; the cause is preserved for the caller.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
