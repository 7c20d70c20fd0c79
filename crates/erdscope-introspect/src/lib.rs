//! Catalog introspection for Postgres, MySQL, SQL Server, Oracle and SQLite.
//!
//! [`Introspector::connect_and_extract`] resolves a driver name through an
//! [`ExtractorRegistry`], opens a connection, probes it and hands it to the
//! dialect's [`Extractor`].

mod catalog;
pub mod connection;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod extractor;
mod mapper;
pub mod mysql;
pub mod oracle;
pub mod orchestrator;
pub mod postgres;
pub mod registry;
pub mod sqlite;
pub mod sqlserver;

pub use connection::{CatalogConnection, CatalogRow, CatalogValue, Connector, Deadline};
pub use dialect::{normalize_driver, Dialect};
pub use drivers::NativeConnector;
pub use error::{DbError, Error, ExtractError, Result};
pub use extractor::Extractor;
pub use mysql::MySqlExtractor;
pub use oracle::OracleExtractor;
pub use orchestrator::Introspector;
pub use postgres::PostgresExtractor;
pub use registry::ExtractorRegistry;
pub use sqlite::SqliteExtractor;
pub use sqlserver::SqlServerExtractor;

pub use erdscope_core::Schema;
