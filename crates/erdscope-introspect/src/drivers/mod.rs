//! Database drivers behind [`Connector`].

use async_trait::async_trait;

use crate::connection::{CatalogConnection, Connector};
use crate::dialect::Dialect;
use crate::error::DbError;

#[cfg(feature = "oracle")]
mod odpi;
mod sqlx_driver;
mod tds;

/// Opens real connections for canonical driver keys.
///
/// Postgres, MySQL and SQLite go through sqlx, SQL Server through tiberius,
/// and Oracle through ODPI-C when the `oracle` feature is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConnector;

#[async_trait]
impl Connector for NativeConnector {
    async fn open(&self, driver: &str, dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
        let Some(dialect) = Dialect::from_driver(driver) else {
            return Err(DbError::Driver(format!("unknown driver {driver:?}")));
        };
        match dialect {
            Dialect::Postgres => sqlx_driver::open_postgres(dsn).await,
            Dialect::MySql => sqlx_driver::open_mysql(dsn).await,
            Dialect::Sqlite => sqlx_driver::open_sqlite(dsn).await,
            Dialect::SqlServer => tds::open(dsn).await,
            Dialect::Oracle => open_oracle(dsn).await,
        }
    }
}

#[cfg(feature = "oracle")]
async fn open_oracle(dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
    odpi::open(dsn).await
}

#[cfg(not(feature = "oracle"))]
async fn open_oracle(_dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
    Err(DbError::Driver(
        "oracle support is not compiled in (enable the `oracle` feature)".to_string(),
    ))
}
