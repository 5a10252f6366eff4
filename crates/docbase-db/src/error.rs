use thiserror::Error;

/// Storage-layer outcomes. The first three variants are recoverable and
/// surfaced to the user; the rest are faults of the current operation.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("username is already taken")]
    DuplicateUsername,

    /// Covers both unknown username and wrong password. The caller must not
    /// be able to tell which one failed.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("no document with id {0}")]
    DocumentNotFound(i64),

    /// A role tag read back from storage that no variant recognizes.
    #[error("unrecognized role tag in storage: {0:?}")]
    RoleParse(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl DbError {
    /// True for outcomes the presentation layer reports as a plain message
    /// rather than propagating as a fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DbError::DuplicateUsername
                | DbError::InvalidCredentials
                | DbError::DocumentNotFound(_)
        )
    }
}
