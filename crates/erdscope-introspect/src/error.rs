use std::time::Duration;

use thiserror::Error;

/// Failure of a single database operation (open, ping, query, row decode).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    /// The driver reported an error.
    #[error("{0}")]
    Driver(String),
    /// A result value could not be converted to the requested shape.
    #[error("column {column}: {message}")]
    Decode { column: usize, message: String },
    /// The caller-supplied deadline expired before the operation finished.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl DbError {
    pub fn driver(err: impl std::fmt::Display) -> Self {
        Self::Driver(err.to_string())
    }
}

/// Fatal catalog query failures raised by an extractor.
///
/// Foreign-key and per-table primary-key failures are not represented here:
/// they are logged and extraction continues.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Listing the tables failed; no partial schema is produced.
    #[error("query tables: {0}")]
    TableDiscovery(#[source] DbError),
    /// Listing the columns of one table failed.
    #[error("query columns for {table}: {source}")]
    ColumnDiscovery {
        table: String,
        #[source]
        source: DbError,
    },
}

/// Errors returned by [`crate::Introspector::connect_and_extract`].
#[derive(Debug, Error)]
pub enum Error {
    /// No extractor is installed under the canonical driver key.
    #[error("dialect not registered: {driver:?} (available: {available:?})")]
    DialectNotRegistered {
        driver: String,
        available: Vec<String>,
    },
    /// Opening the connection failed (bad DSN, credentials, unknown driver).
    #[error("connection error: {0}")]
    Connection(String),
    /// The connection or reachability probe did not finish in time.
    #[error("timed out after {0:?} waiting for the database")]
    Timeout(Duration),
    /// The reachability probe failed.
    #[error("database unreachable: {0}")]
    Unreachable(String),
    /// The extractor failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Convenience alias for orchestration results.
pub type Result<T> = std::result::Result<T, Error>;
