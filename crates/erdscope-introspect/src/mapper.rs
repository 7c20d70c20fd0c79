//! Row decoding and model mapping shared by the dialect extractors.

use erdscope_core::{Column, ForeignKey, Table};

use crate::connection::CatalogRow;
use crate::dialect::Dialect;
use crate::error::{DbError, ExtractError};

/// A table row as listed by a catalog, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub schema: String,
    pub name: String,
    pub comment: Option<String>,
    pub size_8k_pages: Option<i64>,
}

/// A column row with nullability already decoded from the engine's encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// Decode the `(schema, name, comment, size_8k_pages)` table shape.
pub fn decode_table(row: &CatalogRow) -> Result<RawTable, DbError> {
    Ok(RawTable {
        schema: row.text(0)?,
        name: row.text(1)?,
        comment: row.opt_text(2)?,
        size_8k_pages: row.opt_int(3)?,
    })
}

/// Decode every table row; any undecodable row fails discovery.
pub fn decode_tables(rows: &[CatalogRow]) -> Result<Vec<RawTable>, DbError> {
    rows.iter().map(decode_table).collect()
}

/// Decode the
/// `(from_schema, from_table, from_column, to_schema, to_table, to_column, constraint)`
/// foreign-key shape.
pub fn decode_foreign_key(row: &CatalogRow) -> Result<ForeignKey, DbError> {
    Ok(ForeignKey {
        from_schema: row.opt_text(0)?.unwrap_or_default(),
        from_table: row.text(1)?,
        from_column: row.text(2)?,
        to_schema: row.opt_text(3)?.unwrap_or_default(),
        to_table: row.text(4)?,
        to_column: row.text(5)?,
        constraint: row.opt_text(6)?.unwrap_or_default(),
    })
}

/// Decode foreign-key rows, skipping (and logging) rows that cannot be decoded.
pub fn decode_foreign_keys(dialect: Dialect, rows: &[CatalogRow]) -> Vec<ForeignKey> {
    rows.iter()
        .filter_map(|row| match decode_foreign_key(row) {
            Ok(fk) => Some(fk),
            Err(err) => {
                tracing::warn!(
                    event = "foreign_key_row_skipped",
                    dialect = %dialect,
                    error = %err
                );
                None
            }
        })
        .collect()
}

/// Decode single-column primary-key rows, skipping (and logging) bad rows.
pub fn decode_primary_key_names(dialect: Dialect, table: &str, rows: &[CatalogRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| match row.text(0) {
            Ok(name) => Some(name),
            Err(err) => {
                tracing::warn!(
                    event = "primary_key_row_skipped",
                    dialect = %dialect,
                    table = %table,
                    error = %err
                );
                None
            }
        })
        .collect()
}

pub fn map_tables(raw: Vec<RawTable>) -> Vec<Table> {
    raw.into_iter()
        .map(|table| Table {
            schema: table.schema,
            name: table.name,
            columns: Vec::new(),
            rows: None,
            comment: non_blank(table.comment),
            size_8k_pages: positive(table.size_8k_pages),
        })
        .collect()
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<Column> {
    raw.into_iter()
        .map(|col| Column {
            name: col.name,
            data_type: col.data_type,
            nullable: col.nullable,
            pk: false,
        })
        .collect()
}

/// Flag the named columns as primary key. Names with no matching column are ignored.
pub fn apply_primary_key(table: &mut Table, names: &[String]) {
    for name in names {
        if !table.mark_primary_key(name) {
            tracing::debug!(
                event = "primary_key_column_missing",
                table = %table.qualified_name(),
                column = %name
            );
        }
    }
}

/// Record a failed primary-key lookup; the table keeps its unflagged columns.
pub fn warn_primary_key(dialect: Dialect, table: &Table, err: &DbError) {
    tracing::warn!(
        event = "primary_key_lookup_failed",
        dialect = %dialect,
        table = %table.qualified_name(),
        error = %err
    );
}

/// Keep the foreign keys of a successful lookup, or log the failure and keep none.
pub fn foreign_keys_or_empty(
    dialect: Dialect,
    result: Result<Vec<ForeignKey>, DbError>,
) -> Vec<ForeignKey> {
    match result {
        Ok(foreign_keys) => foreign_keys,
        Err(err) => {
            tracing::warn!(
                event = "foreign_keys_unavailable",
                dialect = %dialect,
                error = %err
            );
            Vec::new()
        }
    }
}

pub fn column_error(table: &Table, source: DbError) -> ExtractError {
    ExtractError::ColumnDiscovery {
        table: table.qualified_name(),
        source,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|pages| *pages > 0)
}
