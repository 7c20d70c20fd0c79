use crate::catalog::CatalogQueries;
use crate::connection::CatalogRow;
use crate::dialect::Dialect;
use crate::error::DbError;
use crate::mapper::RawColumn;

// Schemas are owners that Oracle does not maintain itself.
const LIST_TABLES: &str = r#"
    SELECT
      ausr.username,
      atab.table_name,
      acom.comments,
      ROUND(NVL(atab.blocks * NVL(ts.block_size, 8192) / 8192, 1)) AS size_8k_pages
    FROM all_users ausr
    JOIN all_tables atab
      ON ausr.username = atab.owner
    LEFT JOIN all_tab_comments acom
      ON acom.owner = atab.owner
     AND acom.table_name = atab.table_name
    LEFT JOIN user_tablespaces ts
      ON atab.tablespace_name = ts.tablespace_name
    WHERE ausr.oracle_maintained = 'N'
    ORDER BY ausr.username, atab.table_name
"#;

const LIST_COLUMNS: &str = r#"
    SELECT column_name, data_type, nullable
    FROM all_tab_columns
    WHERE owner = :1
      AND table_name = :2
    ORDER BY column_id
"#;

const PRIMARY_KEY: &str = r#"
    SELECT acc.column_name
    FROM all_cons_columns acc
    JOIN all_constraints ac
      ON acc.owner = ac.owner
     AND acc.constraint_name = ac.constraint_name
    WHERE ac.constraint_type = 'P'
      AND acc.owner = :1
      AND acc.table_name = :2
    ORDER BY acc.position
"#;

const LIST_FOREIGN_KEYS: &str = r#"
    SELECT
      a.owner AS from_schema,
      a.table_name AS from_table,
      LISTAGG(acc.column_name, ', ') WITHIN GROUP (ORDER BY acc.position) AS from_column,
      rcc.owner AS to_schema,
      rcc.table_name AS to_table,
      LISTAGG(rcc.column_name, ', ') WITHIN GROUP (ORDER BY rcc.position) AS to_column,
      a.constraint_name
    FROM all_users ausr
    JOIN all_constraints a
      ON ausr.username = a.owner
    JOIN all_cons_columns acc
      ON a.owner = acc.owner
     AND a.constraint_name = acc.constraint_name
    JOIN all_cons_columns rcc
      ON a.r_owner = rcc.owner
     AND a.r_constraint_name = rcc.constraint_name
     AND NVL(acc.position, 0) = NVL(rcc.position, 0)
    WHERE a.constraint_type = 'R'
      AND ausr.oracle_maintained = 'N'
    GROUP BY a.owner, a.table_name, rcc.owner, rcc.table_name, a.constraint_name
    ORDER BY a.owner, a.table_name, a.constraint_name
"#;

/// Catalog queries for Oracle's `all_*` dictionary views.
pub struct OracleCatalog;

impl CatalogQueries for OracleCatalog {
    const DIALECT: Dialect = Dialect::Oracle;
    const LIST_TABLES: &'static str = LIST_TABLES;
    const LIST_COLUMNS: &'static str = LIST_COLUMNS;
    const PRIMARY_KEY: &'static str = PRIMARY_KEY;
    const LIST_FOREIGN_KEYS: &'static str = LIST_FOREIGN_KEYS;

    fn decode_column(row: &CatalogRow) -> Result<RawColumn, DbError> {
        Ok(RawColumn {
            name: row.text(0)?,
            data_type: row.text(1)?,
            nullable: row.opt_text(2)?.as_deref() == Some("Y"),
        })
    }
}
