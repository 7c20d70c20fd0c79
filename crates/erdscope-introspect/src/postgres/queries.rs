use crate::catalog::CatalogQueries;
use crate::connection::CatalogRow;
use crate::dialect::Dialect;
use crate::error::DbError;
use crate::mapper::RawColumn;

const LIST_TABLES: &str = r#"
    select
      t.table_schema::text,
      t.table_name::text,
      obj_description(format('%I.%I', t.table_schema, t.table_name)::regclass, 'pg_class') as table_comment,
      (pg_table_size(format('%I.%I', t.table_schema, t.table_name)::regclass) / 8192)::bigint as size_8k_pages
    from information_schema.tables t
    where t.table_type = 'BASE TABLE'
      and t.table_schema not in ('pg_catalog', 'information_schema', 'pg_toast')
    order by t.table_schema, t.table_name
"#;

const LIST_COLUMNS: &str = r#"
    select
      c.column_name::text,
      c.data_type::text,
      (c.is_nullable = 'YES') as nullable
    from information_schema.columns c
    where c.table_schema = $1
      and c.table_name = $2
    order by c.ordinal_position
"#;

const PRIMARY_KEY: &str = r#"
    select a.attname::text
    from pg_index i
    join pg_class c on i.indrelid = c.oid
    join pg_namespace ns on c.relnamespace = ns.oid
    join pg_attribute a on a.attrelid = c.oid and a.attnum = any(i.indkey)
    where ns.nspname = $1
      and c.relname = $2
      and i.indisprimary
"#;

// Parent columns are paired through position_in_unique_constraint, then both
// lists are aggregated in child ordinal order.
const LIST_FOREIGN_KEYS: &str = r#"
    select
      tc.table_schema::text as from_schema,
      tc.table_name::text as from_table,
      string_agg(kcu.column_name::text, ', ' order by kcu.ordinal_position) as from_column,
      rkcu.table_schema::text as to_schema,
      rkcu.table_name::text as to_table,
      string_agg(rkcu.column_name::text, ', ' order by kcu.ordinal_position) as to_column,
      tc.constraint_name::text
    from information_schema.table_constraints tc
    join information_schema.key_column_usage kcu
      on tc.constraint_name = kcu.constraint_name
     and tc.constraint_schema = kcu.constraint_schema
     and tc.table_name = kcu.table_name
    join information_schema.referential_constraints rc
      on tc.constraint_name = rc.constraint_name
     and tc.constraint_schema = rc.constraint_schema
    join information_schema.key_column_usage rkcu
      on rc.unique_constraint_name = rkcu.constraint_name
     and rc.unique_constraint_schema = rkcu.constraint_schema
     and rkcu.ordinal_position = kcu.position_in_unique_constraint
    where tc.constraint_type = 'FOREIGN KEY'
      and tc.table_schema not in ('pg_catalog', 'information_schema', 'pg_toast')
    group by tc.table_schema, tc.table_name, rkcu.table_schema, rkcu.table_name, tc.constraint_name
    order by tc.table_schema, tc.table_name, tc.constraint_name
"#;

/// Catalog queries for PostgreSQL.
pub struct PostgresCatalog;

impl CatalogQueries for PostgresCatalog {
    const DIALECT: Dialect = Dialect::Postgres;
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
