use thiserror::Error;

/// Caller-facing failures of the moderation, registration and engagement actions.
///
/// Everything except `StorageUnavailable` is a recoverable outcome the controller
/// maps to a user-facing response. `StorageUnavailable` means the database could
/// not be reached or failed mid-operation; the write either fully applied or did
/// not, so retrying the whole operation is safe.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} is {from}, cannot {attempted}")]
    InvalidTransition {
        entity: &'static str,
        id: String,
        from: String,
        attempted: &'static str,
    },

    #[error("rejection reason must be at least {min_len} characters")]
    InvalidReason { min_len: usize },

    #[error("event is not open for registration")]
    EventNotOpen,

    #[error("event is full")]
    EventFull,

    #[error("already registered for this event")]
    AlreadyRegistered,

    #[error("already liked")]
    AlreadyLiked,

    #[error("not liked")]
    NotLiked,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(
        entity: &'static str,
        id: impl ToString,
        from: impl ToString,
        attempted: &'static str,
    ) -> Self {
        CoreError::InvalidTransition {
            entity,
            id: id.to_string(),
            from: from.to_string(),
            attempted,
        }
    }

    /// Stable machine-readable code, distinct for every kind so clients can tell
    /// "someone just took the last seat" apart from "you already did this".
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "not_found",
            CoreError::InvalidTransition { .. } => "invalid_transition",
            CoreError::InvalidReason { .. } => "invalid_reason",
            CoreError::EventNotOpen => "event_not_open",
            CoreError::EventFull => "event_full",
            CoreError::AlreadyRegistered => "already_registered",
            CoreError::AlreadyLiked => "already_liked",
            CoreError::NotLiked => "not_liked",
            CoreError::InvalidInput(_) => "invalid_input",
            CoreError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => sqlx_err.into(),
            Err(err) => CoreError::StorageUnavailable(err),
        }
    }
}

/// A row that vanished or a reference to a missing row is permanent, so it
/// surfaces as `NotFound` rather than as a retryable storage failure.
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => CoreError::not_found("record", "requested"),
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                CoreError::not_found(
                    "referenced record",
                    db_err.constraint().unwrap_or("unknown constraint"),
                )
            }
            _ => CoreError::StorageUnavailable(err.into()),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
