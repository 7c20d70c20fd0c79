//! SQLite catalog SQL. Table-valued pragma functions take the schema as their last argument.

pub const DATABASE_LIST: &str = "PRAGMA database_list";

/// Succeeds only when the `dbstat` virtual table is compiled in.
pub const PROBE_DBSTAT: &str = "SELECT COUNT(*) FROM dbstat";

pub const LIST_TABLES_WITH_SIZE: &str = r#"
    SELECT m.name, s.size_8k_pages
    FROM sqlite_master m
    LEFT JOIN (
      SELECT name, (SUM(pgsize) + 8191) / 8192 AS size_8k_pages
      FROM dbstat
      GROUP BY name
    ) s ON m.name = s.name
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite\_%' ESCAPE '\'
    ORDER BY m.name
"#;

pub const LIST_TABLES: &str = r#"
    SELECT m.name, NULL AS size_8k_pages
    FROM sqlite_master m
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite\_%' ESCAPE '\'
    ORDER BY m.name
"#;

/// Params: table, schema. Rows: `(cid, name, type, notnull, dflt_value, pk)`.
pub const TABLE_INFO: &str = r#"
    SELECT cid, name, type, "notnull", dflt_value, pk
    FROM pragma_table_info(?, ?)
    ORDER BY cid
"#;

/// Params: schema. One row per referencing column, ordered by constraint and position.
pub const LIST_FOREIGN_KEYS: &str = r#"
    SELECT m.name, fk.id, fk.seq, fk."table", fk."from", fk."to"
    FROM sqlite_master m
    JOIN pragma_foreign_key_list(m.name, ?) fk
    WHERE m.type = 'table'
      AND m.name NOT LIKE 'sqlite\_%' ESCAPE '\'
    ORDER BY m.name, fk.id, fk.seq
"#;
