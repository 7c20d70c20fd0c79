use crate::catalog::CatalogQueries;
use crate::connection::CatalogRow;
use crate::dialect::Dialect;
use crate::error::DbError;
use crate::mapper::RawColumn;

const LIST_TABLES: &str = r#"
    SELECT
      CAST(t.table_schema AS CHAR) AS table_schema,
      CAST(t.table_name AS CHAR) AS table_name,
      CAST(t.table_comment AS CHAR) AS table_comment,
      CAST(ROUND(t.data_length / 8192) AS SIGNED) AS size_8k_pages
    FROM information_schema.tables t
    WHERE t.table_type = 'BASE TABLE'
      AND t.table_schema NOT IN ('mysql', 'information_schema', 'performance_schema', 'sys')
    ORDER BY t.table_schema, t.table_name
"#;

const LIST_COLUMNS: &str = r#"
    SELECT
      CAST(c.column_name AS CHAR) AS column_name,
      CAST(c.column_type AS CHAR) AS column_type,
      CAST(c.is_nullable = 'YES' AS SIGNED) AS nullable
    FROM information_schema.columns c
    WHERE c.table_schema = ?
      AND c.table_name = ?
    ORDER BY c.ordinal_position
"#;

const PRIMARY_KEY: &str = r#"
    SELECT CAST(k.column_name AS CHAR) AS column_name
    FROM information_schema.key_column_usage k
    JOIN information_schema.table_constraints tc
      ON k.constraint_name = tc.constraint_name
     AND k.table_schema = tc.table_schema
     AND k.table_name = tc.table_name
    WHERE tc.constraint_type = 'PRIMARY KEY'
      AND k.table_schema = ?
      AND k.table_name = ?
    ORDER BY k.ordinal_position
"#;

// key_column_usage pairs each child column with its parent column on the same
// row, so ordering both aggregates by ordinal_position keeps them aligned.
const LIST_FOREIGN_KEYS: &str = r#"
    SELECT
      CAST(k.table_schema AS CHAR) AS from_schema,
      CAST(k.table_name AS CHAR) AS from_table,
      GROUP_CONCAT(k.column_name ORDER BY k.ordinal_position SEPARATOR ', ') AS from_column,
      CAST(k.referenced_table_schema AS CHAR) AS to_schema,
      CAST(k.referenced_table_name AS CHAR) AS to_table,
      GROUP_CONCAT(k.referenced_column_name ORDER BY k.ordinal_position SEPARATOR ', ') AS to_column,
      CAST(k.constraint_name AS CHAR) AS constraint_name
    FROM information_schema.key_column_usage k
    WHERE k.referenced_table_name IS NOT NULL
      AND k.table_schema NOT IN ('mysql', 'information_schema', 'performance_schema', 'sys')
    GROUP BY k.table_schema, k.table_name, k.referenced_table_schema, k.referenced_table_name, k.constraint_name
    ORDER BY k.table_schema, k.table_name, k.constraint_name
"#;

/// Catalog queries for MySQL and MariaDB.
pub struct MySqlCatalog;

impl CatalogQueries for MySqlCatalog {
    const DIALECT: Dialect = Dialect::MySql;
    const LIST_TABLES: &'static str = LIST_TABLES;
    const LIST_COLUMNS: &'static str = LIST_COLUMNS;
    const PRIMARY_KEY: &'static str = PRIMARY_KEY;
    const LIST_FOREIGN_KEYS: &'static str = LIST_FOREIGN_KEYS;

    fn decode_column(row: &CatalogRow) -> Result<RawColumn, DbError> {
        Ok(RawColumn {
            name: row.text(0)?,
            data_type: row.text(1)?,
            nullable: row.flag(2)?,
        })
    }
}
