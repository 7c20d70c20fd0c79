use crate::catalog::CatalogQueries;
use crate::connection::CatalogRow;
use crate::dialect::Dialect;
use crate::error::DbError;
use crate::mapper::RawColumn;

// sys.tables only lists user tables. used_pages is already counted in 8 KiB pages.
const LIST_TABLES: &str = r#"
    SELECT
      s.name AS schema_name,
      t.name AS table_name,
      CAST(sep.value AS NVARCHAR(4000)) AS table_comment,
      CAST(SUM(au.used_pages) AS BIGINT) AS size_8k_pages
    FROM sys.schemas AS s
    JOIN sys.tables AS t
      ON s.schema_id = t.schema_id
    LEFT JOIN sys.extended_properties AS sep
      ON t.object_id = sep.major_id
     AND sep.minor_id = 0
     AND sep.class = 1
     AND sep.name = 'MS_Description'
    LEFT JOIN sys.partitions AS p
      ON t.object_id = p.object_id
    LEFT JOIN sys.allocation_units AS au
      ON au.container_id = p.hobt_id
    GROUP BY s.name, t.name, CAST(sep.value AS NVARCHAR(4000))
    ORDER BY s.name, t.name
"#;

const LIST_COLUMNS: &str = r#"
    SELECT
      COLUMN_NAME,
      DATA_TYPE,
      CASE WHEN IS_NULLABLE = 'YES' THEN 1 ELSE 0 END AS NULLABLE
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = @P1
      AND TABLE_NAME = @P2
    ORDER BY ORDINAL_POSITION
"#;

const PRIMARY_KEY: &str = r#"
    SELECT k.COLUMN_NAME
    FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS t
    JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE k
      ON t.CONSTRAINT_NAME = k.CONSTRAINT_NAME
     AND t.TABLE_SCHEMA = k.TABLE_SCHEMA
     AND t.TABLE_NAME = k.TABLE_NAME
    WHERE t.CONSTRAINT_TYPE = 'PRIMARY KEY'
      AND k.TABLE_SCHEMA = @P1
      AND k.TABLE_NAME = @P2
    ORDER BY k.ORDINAL_POSITION
"#;

const LIST_FOREIGN_KEYS: &str = r#"
    SELECT
      OBJECT_SCHEMA_NAME(fkc.parent_object_id) AS from_schema,
      OBJECT_NAME(fkc.parent_object_id) AS from_table,
      STRING_AGG(CAST(c.name AS NVARCHAR(MAX)), ', ')
        WITHIN GROUP (ORDER BY fkc.constraint_column_id) AS from_column,
      OBJECT_SCHEMA_NAME(fkc.referenced_object_id) AS to_schema,
      OBJECT_NAME(fkc.referenced_object_id) AS to_table,
      STRING_AGG(CAST(rc.name AS NVARCHAR(MAX)), ', ')
        WITHIN GROUP (ORDER BY fkc.constraint_column_id) AS to_column,
      fk.name AS constraint_name
    FROM sys.foreign_keys fk
    JOIN sys.foreign_key_columns fkc
      ON fk.object_id = fkc.constraint_object_id
    JOIN sys.columns c
      ON fkc.parent_object_id = c.object_id
     AND fkc.parent_column_id = c.column_id
    JOIN sys.columns rc
      ON fkc.referenced_object_id = rc.object_id
     AND fkc.referenced_column_id = rc.column_id
    GROUP BY fk.name, fkc.parent_object_id, fkc.referenced_object_id
    ORDER BY from_schema, from_table, constraint_name
"#;

/// Catalog queries for Microsoft SQL Server.
pub struct SqlServerCatalog;

impl CatalogQueries for SqlServerCatalog {
    const DIALECT: Dialect = Dialect::SqlServer;
    const LIST_TABLES: &'static str = LIST_TABLES;
    const LIST_COLUMNS: &'static str = LIST_COLUMNS;
    const PRIMARY_KEY: &'static str = PRIMARY_KEY;
    const LIST_FOREIGN_KEYS: &'static str = LIST_FOREIGN_KEYS;

    fn decode_column(row: &CatalogRow) -> Result<RawColumn, DbError> {
        Ok(RawColumn {
            name: row.text(0)?,
            data_type: row.text(1)?,
            nullable: row.opt_int(2)? == Some(1),
        })
    }
}
