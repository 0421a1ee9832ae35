use std::error::Error as StdError;

use thiserror::Error;

use crate::domain::UserKey;

type Cause = Box<dyn StdError + Send + Sync>;

/// Failure reported by the query executor.
///
/// Carries the opaque driver (or row decoding) cause and, when the driver
/// supplied one, the vendor error code. Only the repository inspects the
/// code, to reclassify duplicate-key violations.
#[derive(Debug, Error)]
#[error("persistence error (code: {code:?}): {cause}")]
pub struct PersistenceError {
    #[source]
    cause: Cause,
    code: Option<String>,
}

impl PersistenceError {
    pub fn new(cause: impl Into<Cause>, code: Option<String>) -> Self {
        Self {
            cause: cause.into(),
            code,
        }
    }

    /// Vendor error code captured from the driver, if any.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}

/// Errors surfaced by the user repository and service.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User already exists")]
    AlreadyExists,

    #[error("User not found: {key}")]
    NotFound { key: UserKey },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl UserError {
    pub fn not_found(key: &UserKey) -> Self {
        Self::NotFound { key: key.clone() }
    }
}

pub type UserResult<T> = Result<T, UserError>;
