//! SQLite extraction over `sqlite_master` and the table-valued pragma functions.
//!
//! SQLite has no namespaces, so every table and foreign key carries an empty
//! schema. Columns and primary keys come from the same `pragma_table_info`
//! rows, and foreign keys are grouped per constraint on the client.

use std::collections::HashMap;

use async_trait::async_trait;

use erdscope_core::{Column, ForeignKey, Schema, Table, COLUMN_LIST_SEPARATOR};

use crate::connection::{fetch, CatalogConnection, CatalogRow, Deadline};
use crate::dialect::Dialect;
use crate::error::{DbError, ExtractError};
use crate::extractor::Extractor;
use crate::mapper::{self, RawTable};

mod queries;

const DEFAULT_DATABASE: &str = "main";

/// Extractor for SQLite files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteExtractor;

#[async_trait]
impl Extractor for SqliteExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn extract(
        &self,
        conn: &mut dyn CatalogConnection,
        deadline: Deadline,
    ) -> Result<Schema, ExtractError> {
        let database = database_name(conn, deadline).await;

        let list_tables = if dbstat_available(conn, deadline).await {
            queries::LIST_TABLES_WITH_SIZE
        } else {
            queries::LIST_TABLES
        };
        let rows = fetch(conn, deadline, list_tables, &[])
            .await
            .map_err(ExtractError::TableDiscovery)?;
        let raw_tables = rows
            .iter()
            .map(decode_table)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ExtractError::TableDiscovery)?;
        let mut tables = mapper::map_tables(raw_tables);

        let mut primary_keys = HashMap::new();
        for table in &mut tables {
            let params = [table.name.as_str(), database.as_str()];
            let rows = fetch(conn, deadline, queries::TABLE_INFO, &params)
                .await
                .map_err(|source| mapper::column_error(table, source))?;
            let pk_order = apply_table_info(table, &rows)
                .map_err(|source| mapper::column_error(table, source))?;
            primary_keys.insert(table.name.clone(), pk_order);
        }

        let foreign_keys = fetch(conn, deadline, queries::LIST_FOREIGN_KEYS, &[database.as_str()])
            .await
            .map(|rows| group_foreign_keys(&rows, &primary_keys));
        let foreign_keys = mapper::foreign_keys_or_empty(Dialect::Sqlite, foreign_keys);

        tracing::debug!(
            event = "catalog_extracted",
            dialect = %Dialect::Sqlite,
            database = %database,
            tables = tables.len(),
            foreign_keys = foreign_keys.len()
        );

        Ok(Schema {
            tables,
            foreign_keys,
        })
    }
}

/// Name of the first attached database, `main` when it cannot be read.
async fn database_name(conn: &mut dyn CatalogConnection, deadline: Deadline) -> String {
    let rows = match fetch(conn, deadline, queries::DATABASE_LIST, &[]).await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!(event = "sqlite_database_list_failed", error = %err);
            return DEFAULT_DATABASE.to_string();
        }
    };
    rows.first()
        .and_then(|row| row.opt_text(1).ok().flatten())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
}

async fn dbstat_available(conn: &mut dyn CatalogConnection, deadline: Deadline) -> bool {
    match fetch(conn, deadline, queries::PROBE_DBSTAT, &[]).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(event = "sqlite_dbstat_unavailable", error = %err);
            false
        }
    }
}

fn decode_table(row: &CatalogRow) -> Result<RawTable, DbError> {
    Ok(RawTable {
        schema: String::new(),
        name: row.text(0)?,
        comment: None,
        size_8k_pages: row.opt_int(1)?,
    })
}

/// Fill `table.columns` from `pragma_table_info` rows and return the
/// primary-key column names in key order.
fn apply_table_info(table: &mut Table, rows: &[CatalogRow]) -> Result<Vec<String>, DbError> {
    let mut key_positions = Vec::new();
    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name = row.text(1)?;
        let not_null = row.flag(3)?;
        let pk_position = row.opt_int(5)?.unwrap_or(0);
        if pk_position > 0 {
            key_positions.push((pk_position, name.clone()));
        }
        columns.push(Column {
            name,
            data_type: row.opt_text(2)?.unwrap_or_default(),
            nullable: !not_null,
            pk: pk_position > 0,
        });
    }
    table.columns = columns;

    key_positions.sort_by_key(|(position, _)| *position);
    Ok(key_positions.into_iter().map(|(_, name)| name).collect())
}

/// One referencing column of a foreign-key constraint.
#[derive(Debug, Clone, PartialEq)]
struct ForeignKeyLink {
    from_table: String,
    id: i64,
    to_table: String,
    from_column: String,
    to_column: Option<String>,
}

fn decode_link(row: &CatalogRow) -> Result<ForeignKeyLink, DbError> {
    Ok(ForeignKeyLink {
        from_table: row.text(0)?,
        id: row.opt_int(1)?.unwrap_or_default(),
        to_table: row.text(3)?,
        from_column: row.text(4)?,
        to_column: row.opt_text(5)?,
    })
}

/// Fold per-column rows (already ordered by table, id, seq) into one foreign
/// key per constraint.
fn group_foreign_keys(
    rows: &[CatalogRow],
    primary_keys: &HashMap<String, Vec<String>>,
) -> Vec<ForeignKey> {
    let mut groups: Vec<Vec<ForeignKeyLink>> = Vec::new();
    for row in rows {
        let link = match decode_link(row) {
            Ok(link) => link,
            Err(err) => {
                tracing::warn!(
                    event = "foreign_key_row_skipped",
                    dialect = %Dialect::Sqlite,
                    error = %err
                );
                continue;
            }
        };
        match groups.last_mut() {
            Some(group)
                if group[0].from_table == link.from_table && group[0].id == link.id =>
            {
                group.push(link)
            }
            _ => groups.push(vec![link]),
        }
    }

    groups
        .into_iter()
        .filter_map(|group| build_foreign_key(group, primary_keys))
        .collect()
}

fn build_foreign_key(
    group: Vec<ForeignKeyLink>,
    primary_keys: &HashMap<String, Vec<String>>,
) -> Option<ForeignKey> {
    let first = &group[0];
    let from_columns: Vec<&str> = group.iter().map(|link| link.from_column.as_str()).collect();

    let explicit: Option<Vec<&str>> = group
        .iter()
        .map(|link| link.to_column.as_deref())
        .collect();
    let to_columns = match explicit {
        Some(columns) => columns.iter().map(|column| column.to_string()).collect(),
        None => match parent_primary_key(primary_keys, &first.to_table) {
            Some(columns) if columns.len() == from_columns.len() => columns.clone(),
            _ => {
                tracing::warn!(
                    event = "foreign_key_row_skipped",
                    dialect = %Dialect::Sqlite,
                    table = %first.from_table,
                    references = %first.to_table,
                    reason = "parent primary key does not match the referencing columns"
                );
                return None;
            }
        },
    };

    Some(ForeignKey {
        from_schema: String::new(),
        from_table: first.from_table.clone(),
        from_column: from_columns.join(COLUMN_LIST_SEPARATOR),
        to_schema: String::new(),
        to_table: first.to_table.clone(),
        to_column: to_columns.join(COLUMN_LIST_SEPARATOR),
        constraint: String::new(),
    })
}

// SQLite table names compare case-insensitively.
fn parent_primary_key<'a>(
    primary_keys: &'a HashMap<String, Vec<String>>,
    table: &str,
) -> Option<&'a Vec<String>> {
    primary_keys.get(table).or_else(|| {
        primary_keys
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(table))
            .map(|(_, columns)| columns)
    })
}
