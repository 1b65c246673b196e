use thiserror::Error;

/// Domain error taxonomy shared by every repository.
///
/// Pool and SQLite failures collapse into `Unavailable`; uniqueness
/// violations are translated to `Conflict` by the repository that owns the
/// constraint, since only it knows which invariant was hit.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// True when the error is a SQLite UNIQUE/PRIMARY KEY constraint violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
    const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == SQLITE_CONSTRAINT_UNIQUE
    )
}
