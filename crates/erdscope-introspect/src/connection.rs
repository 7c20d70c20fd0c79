//! The database capability extractors run against.
//!
//! Drivers decode each catalog result row into [`CatalogRow`] values so that
//! extractors never touch driver-specific row types.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::DbError;

/// A single decoded result value.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<&str> for CatalogValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CatalogValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CatalogValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for CatalogValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CatalogValue>> From<Option<T>> for CatalogValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row, values in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    values: Vec<CatalogValue>,
}

impl CatalogRow {
    pub fn new(values: Vec<CatalogValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> Result<&CatalogValue, DbError> {
        self.values.get(idx).ok_or_else(|| DbError::Decode {
            column: idx,
            message: format!("row has only {} column(s)", self.values.len()),
        })
    }

    /// Non-null text value.
    pub fn text(&self, idx: usize) -> Result<String, DbError> {
        self.opt_text(idx)?.ok_or(DbError::Decode {
            column: idx,
            message: "unexpected NULL".to_string(),
        })
    }

    /// Text value; numbers and booleans are rendered as text.
    pub fn opt_text(&self, idx: usize) -> Result<Option<String>, DbError> {
        Ok(match self.get(idx)? {
            CatalogValue::Null => None,
            CatalogValue::Text(value) => Some(value.clone()),
            CatalogValue::Int(value) => Some(value.to_string()),
            CatalogValue::Float(value) => Some(value.to_string()),
            CatalogValue::Bool(value) => Some(value.to_string()),
        })
    }

    /// Integer value; floats are rounded and numeric text is parsed.
    pub fn opt_int(&self, idx: usize) -> Result<Option<i64>, DbError> {
        match self.get(idx)? {
            CatalogValue::Null => Ok(None),
            CatalogValue::Int(value) => Ok(Some(*value)),
            CatalogValue::Float(value) => Ok(Some(value.round() as i64)),
            CatalogValue::Bool(value) => Ok(Some(i64::from(*value))),
            CatalogValue::Text(value) => parse_int(value).map(Some).ok_or_else(|| DbError::Decode {
                column: idx,
                message: format!("expected an integer, got {value:?}"),
            }),
        }
    }

    /// Non-null boolean; integers are true when non-zero.
    pub fn flag(&self, idx: usize) -> Result<bool, DbError> {
        let invalid = |found: &dyn std::fmt::Debug| DbError::Decode {
            column: idx,
            message: format!("expected a boolean, got {found:?}"),
        };
        match self.get(idx)? {
            CatalogValue::Bool(value) => Ok(*value),
            CatalogValue::Int(value) => Ok(*value != 0),
            CatalogValue::Text(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "t" | "true" => Ok(true),
                "0" | "f" | "false" => Ok(false),
                _ => Err(invalid(value)),
            },
            other => Err(invalid(other)),
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|value| value.round() as i64))
}

/// An open, dialect-specific database connection.
///
/// Query parameters are positional strings written with the dialect's own
/// placeholder syntax (`$1`, `?`, `@P1`, `:1`).
#[async_trait]
pub trait CatalogConnection: Send {
    /// Round-trip to the server to prove it is reachable.
    async fn ping(&mut self) -> Result<(), DbError>;

    /// Run a catalog query and collect every row.
    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, DbError>;

    /// Close the connection.
    async fn close(self: Box<Self>) -> Result<(), DbError>;
}

/// Opens connections for canonical driver keys.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, driver: &str, dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError>;
}

/// Absolute point in time after which database work is abandoned.
///
/// Dropping the in-flight future on expiry releases any open cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Run `operation`, failing with [`DbError::DeadlineExceeded`] if it does not finish in time.
    pub async fn bound<T, F>(&self, operation: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        match tokio::time::timeout_at(self.at, operation).await {
            Ok(result) => result,
            Err(_) => Err(DbError::DeadlineExceeded),
        }
    }
}

/// Issue one catalog query under `deadline`.
pub async fn fetch(
    conn: &mut dyn CatalogConnection,
    deadline: Deadline,
    sql: &str,
    params: &[&str],
) -> Result<Vec<CatalogRow>, DbError> {
    deadline.bound(conn.query(sql, params)).await
}
