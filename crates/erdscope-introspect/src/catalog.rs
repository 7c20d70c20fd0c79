//! Three-phase extraction over `information_schema`-style catalogs.
//!
//! Postgres, MySQL, SQL Server and Oracle all expose tables, columns, primary
//! keys and foreign keys through catalog views that can be read with one table
//! query, two per-table queries and one global foreign-key query. They differ
//! in SQL text, placeholder syntax and nullability encoding, which
//! [`CatalogQueries`] captures. SQLite uses pragmas instead and has its own flow.

use erdscope_core::Schema;

use crate::connection::{fetch, CatalogConnection, CatalogRow, Deadline};
use crate::dialect::Dialect;
use crate::error::{DbError, ExtractError};
use crate::mapper::{self, RawColumn};

/// Catalog SQL and row decoding for one dialect.
///
/// Result shapes:
/// - `LIST_TABLES`: `(schema, name, comment, size_8k_pages)`, ordered by schema and name
/// - `LIST_COLUMNS(schema, table)`: `(name, type, nullable)`, in ordinal order
/// - `PRIMARY_KEY(schema, table)`: `(column_name)`
/// - `LIST_FOREIGN_KEYS`: `(from_schema, from_table, from_column, to_schema, to_table, to_column, constraint)`
pub trait CatalogQueries {
    const DIALECT: Dialect;
    const LIST_TABLES: &'static str;
    const LIST_COLUMNS: &'static str;
    const PRIMARY_KEY: &'static str;
    const LIST_FOREIGN_KEYS: &'static str;

    /// Decode one `LIST_COLUMNS` row, mapping the engine's nullability encoding to a boolean.
    fn decode_column(row: &CatalogRow) -> Result<RawColumn, DbError>;
}

/// Run table, column/primary-key and foreign-key discovery in sequence.
///
/// Table and column failures abort the extraction. A failed primary-key lookup
/// leaves that table's columns unflagged, and a failed foreign-key lookup
/// yields an empty foreign-key list; both are logged.
pub async fn extract_catalog<Q: CatalogQueries>(
    conn: &mut dyn CatalogConnection,
    deadline: Deadline,
) -> Result<Schema, ExtractError> {
    let rows = fetch(conn, deadline, Q::LIST_TABLES, &[])
        .await
        .map_err(ExtractError::TableDiscovery)?;
    let raw_tables = mapper::decode_tables(&rows).map_err(ExtractError::TableDiscovery)?;
    let mut tables = mapper::map_tables(raw_tables);

    for table in &mut tables {
        let params = [table.schema.as_str(), table.name.as_str()];
        let raw_columns = fetch(conn, deadline, Q::LIST_COLUMNS, &params)
            .await
            .and_then(|rows| rows.iter().map(Q::decode_column).collect::<Result<Vec<_>, _>>());
        let raw_columns = raw_columns.map_err(|source| mapper::column_error(table, source))?;
        table.columns = mapper::map_columns(raw_columns);

        let params = [table.schema.as_str(), table.name.as_str()];
        match fetch(conn, deadline, Q::PRIMARY_KEY, &params).await {
            Ok(rows) => {
                let names =
                    mapper::decode_primary_key_names(Q::DIALECT, &table.qualified_name(), &rows);
                mapper::apply_primary_key(table, &names);
            }
            Err(err) => mapper::warn_primary_key(Q::DIALECT, table, &err),
        }
    }

    let foreign_keys = fetch(conn, deadline, Q::LIST_FOREIGN_KEYS, &[])
        .await
        .map(|rows| mapper::decode_foreign_keys(Q::DIALECT, &rows));
    let foreign_keys = mapper::foreign_keys_or_empty(Q::DIALECT, foreign_keys);

    tracing::debug!(
        event = "catalog_extracted",
        dialect = %Q::DIALECT,
        tables = tables.len(),
        foreign_keys = foreign_keys.len()
    );

    Ok(Schema {
        tables,
        foreign_keys,
    })
}
