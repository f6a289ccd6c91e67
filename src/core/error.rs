use serde::Serialize;
use std::fmt;

/// Error categories exposed by every core operation. Transport adapters
/// map these onto their own status codes.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input, locally recoverable by the caller.
    ValidationFailed,
    /// Entity absent OR actor lacks visibility. Deliberately never
    /// distinguished, so non-members cannot probe for chat existence.
    NotFoundOrForbidden,
    /// Actor is a member but lacks the required role. Only used where the
    /// actor's own membership is not a secret.
    InsufficientPermission,
    AlreadyExists,
    CapacityExceeded,
    InvalidState,
    Unavailable,
    Internal,
}

pub struct AppError {
    kind: ErrorKind,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            kind,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    // Common error constructors
    pub fn validation(message: &'static str) -> Self {
        Self::new(ErrorKind::ValidationFailed, message)
    }

    pub fn not_found_or_forbidden(message: &'static str) -> Self {
        Self::new(ErrorKind::NotFoundOrForbidden, message)
    }

    pub fn insufficient_permission(message: &'static str) -> Self {
        Self::new(ErrorKind::InsufficientPermission, message)
    }

    pub fn already_exists(message: &'static str) -> Self {
        Self::new(ErrorKind::AlreadyExists, message)
    }

    pub fn capacity_exceeded(message: &'static str) -> Self {
        Self::new(ErrorKind::CapacityExceeded, message)
    }

    pub fn invalid_state(message: &'static str) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn unavailable(message: &'static str) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn internal(message: &'static str) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("details", &self.details)
            .finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({})", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found_or_forbidden("Resource not found"),

            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::already_exists("Resource already exists")
            }

            sqlx::Error::Database(db) => {
                Self::new(ErrorKind::Internal, "Database error").with_details(db.to_string())
            }

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::unavailable("Database unavailable")
            }

            _ => Self::internal("Internal server error"),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::validation("Validation error").with_details(err.to_string())
    }
}
