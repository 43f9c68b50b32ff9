use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StoreError;

/// Failure of a single field. Sibling fields in the same request are unaffected.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Access Denied")]
    AccessDenied,

    #[error("Parameters incorrectly formatted or out of range ({field})")]
    Validation { field: &'static str },

    #[error("Invalid arguments: {0}")]
    BadArguments(String),

    #[error("Cannot query field '{0}'")]
    UnknownField(String),

    #[error("email not found")]
    EmailNotFound,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Internal Server Error")]
    Internal(String),
}

impl GraphError {
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::AccessDenied => "ACCESS_DENIED",
            GraphError::Validation { .. } => "VALIDATION_ERROR",
            GraphError::BadArguments(_) => "BAD_ARGUMENTS",
            GraphError::UnknownField(_) => "UNKNOWN_FIELD",
            GraphError::EmailNotFound => "EMAIL_NOT_FOUND",
            GraphError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            GraphError::InvalidPassword => "INVALID_PASSWORD",
            GraphError::InvalidRefreshToken => "INVALID_TOKEN",
            GraphError::NotFound(_) => "NOT_FOUND",
            GraphError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        GraphError::Internal(detail.into())
    }
}

impl From<AuthError> for GraphError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) | AuthError::MalformedAuthHeader => GraphError::InvalidRefreshToken,
            other => {
                tracing::error!("Auth failure while resolving field: {}", other);
                GraphError::Internal(other.to_string())
            }
        }
    }
}

impl From<StoreError> for GraphError {
    fn from(err: StoreError) -> Self {
        tracing::error!("Store failure while resolving field: {}", err);
        GraphError::Internal(err.to_string())
    }
}
