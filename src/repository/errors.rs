use thiserror::Error;

/// Failures surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// The database rejected or failed a query.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),
    /// A stored row did not satisfy domain constraints.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// A writer panicked while holding the in-memory ledger lock.
    #[error("ledger lock poisoned")]
    LockPoisoned,
}

/// Convenient alias for results returned from repository methods.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
