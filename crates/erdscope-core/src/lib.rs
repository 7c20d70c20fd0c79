//! Core contracts and helpers for erdscope.
//!
//! This crate defines the dialect-agnostic schema model that every extractor
//! populates, together with validation and connection-string redaction helpers
//! shared by the introspection engine and the CLI.

pub mod error;
pub mod redaction;
pub mod schema;
pub mod validation;

pub use error::{Error, Result};
pub use redaction::{quote_ado_value, redact_connection_string, RedactedConnection};
pub use schema::{Column, ForeignKey, Schema, Table, COLUMN_LIST_SEPARATOR};
pub use validation::validate_schema;
