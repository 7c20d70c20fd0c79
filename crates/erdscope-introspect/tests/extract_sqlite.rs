#[macro_use]
mod support;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use erdscope_core::Schema;
use erdscope_introspect::{Deadline, Error, Extractor, ExtractorRegistry, Introspector, SqliteExtractor};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use uuid::Uuid;

use support::{Script, ScriptedConnection, NULL};

/// A SQLite file in the temp dir, removed on drop.
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    async fn create(ddl: &[&str]) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("erdscope-{}.db", Uuid::new_v4()));
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .context("creating sqlite fixture")?;
        for statement in ddl {
            sqlx::query(statement)
                .execute(&mut conn)
                .await
                .with_context(|| format!("executing {statement}"))?;
        }
        conn.close().await?;
        Ok(Self { path })
    }

    fn dsn(&self) -> String {
        format!("sqlite://{}?mode=ro", self.path.display())
    }

    async fn extract(&self) -> Result<Schema> {
        let introspector = Introspector::native(Arc::new(ExtractorRegistry::builtin()));
        Ok(introspector
            .connect_and_extract("sqlite3", &self.dsn(), Duration::from_secs(10))
            .await?)
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[tokio::test]
async fn users_table_end_to_end() -> Result<()> {
    let db = TempDb::create(&[
        "CREATE TABLE users (id INTEGER NOT NULL PRIMARY KEY, name VARCHAR(100) NOT NULL, email VARCHAR(255))",
    ])
    .await?;

    let schema = db.extract().await?;

    assert_eq!(schema.tables.len(), 1);
    let users = &schema.tables[0];
    assert_eq!(users.schema, "");
    assert_eq!(users.name, "users");
    assert_eq!(users.comment, None);
    assert!(users.size_8k_pages.is_none_or(|pages| pages > 0));

    let columns: Vec<_> = users
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.data_type.as_str(), c.nullable, c.pk))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("id", "INTEGER", false, true),
            ("name", "VARCHAR(100)", false, false),
            ("email", "VARCHAR(255)", true, false),
        ]
    );
    assert!(schema.foreign_keys.is_empty());
    Ok(())
}

#[tokio::test]
async fn orders_reference_customers_end_to_end() -> Result<()> {
    let db = TempDb::create(&[
        "CREATE TABLE customers (id INTEGER NOT NULL PRIMARY KEY)",
        "CREATE TABLE orders (id INTEGER NOT NULL PRIMARY KEY, customer_id INTEGER REFERENCES customers(id))",
    ])
    .await?;

    let schema = db.extract().await?;

    let names: Vec<_> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "orders"]);
    assert_eq!(schema.foreign_keys.len(), 1);
    let fk = &schema.foreign_keys[0];
    assert_eq!(fk.from_table, "orders");
    assert_eq!(fk.from_column, "customer_id");
    assert_eq!(fk.to_table, "customers");
    assert_eq!(fk.to_column, "id");
    assert!(fk.from_schema.is_empty() && fk.to_schema.is_empty());
    Ok(())
}

#[tokio::test]
async fn composite_and_implicit_foreign_keys_end_to_end() -> Result<()> {
    let db = TempDb::create(&[
        "CREATE TABLE order_slots (id INTEGER NOT NULL, slot INTEGER NOT NULL, PRIMARY KEY (slot, id))",
        "CREATE TABLE order_lines (line INTEGER NOT NULL PRIMARY KEY, order_id INTEGER, slot_no INTEGER, \
         FOREIGN KEY (order_id, slot_no) REFERENCES order_slots (id, slot))",
        "CREATE TABLE slot_notes (slot_no INTEGER, order_id INTEGER, \
         FOREIGN KEY (slot_no, order_id) REFERENCES order_slots)",
    ])
    .await?;

    let schema = db.extract().await?;

    let lines = schema
        .foreign_keys
        .iter()
        .find(|fk| fk.from_table == "order_lines")
        .context("order_lines foreign key")?;
    assert_eq!(lines.from_column, "order_id, slot_no");
    assert_eq!(lines.to_column, "id, slot");

    let notes = schema
        .foreign_keys
        .iter()
        .find(|fk| fk.from_table == "slot_notes")
        .context("slot_notes foreign key")?;
    assert_eq!(notes.from_column, "slot_no, order_id");
    assert_eq!(notes.to_column, "slot, id");

    let slots = schema.find_table("", "order_slots").context("order_slots")?;
    assert_eq!(slots.primary_key_columns(), vec!["id", "slot"]);
    Ok(())
}

#[tokio::test]
async fn missing_file_is_a_connection_error() {
    let path = std::env::temp_dir().join(format!("erdscope-missing-{}.db", Uuid::new_v4()));
    let introspector = Introspector::native(Arc::new(ExtractorRegistry::builtin()));

    let err = introspector
        .connect_and_extract("sqlite", &format!("sqlite://{}?mode=ro", path.display()), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Connection(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn missing_dbstat_leaves_size_absent() -> Result<()> {
    let script = Script::new()
        .fail("database_list", "not authorized")
        .fail("from dbstat", "no such table: dbstat")
        .on_params(
            "pragma_foreign_key_list",
            &["main"],
            vec![row!["orders", 0i64, 0i64, "customers", "customer_id", NULL]],
        )
        .on_params(
            "pragma_table_info",
            &["customers", "main"],
            vec![row![0i64, "id", "INTEGER", 1i64, NULL, 1i64]],
        )
        .on_params(
            "pragma_table_info",
            &["orders", "main"],
            vec![
                row![0i64, "id", "INTEGER", 1i64, NULL, 1i64],
                row![1i64, "customer_id", "INTEGER", 0i64, NULL, 0i64],
            ],
        )
        .on("sqlite_master", vec![row!["customers", NULL], row!["orders", NULL]]);
    let (mut conn, log) = ScriptedConnection::new(script);

    let schema = SqliteExtractor
        .extract(&mut conn, Deadline::after(Duration::from_secs(5)))
        .await?;

    assert!(schema.tables.iter().all(|t| t.size_8k_pages.is_none()));
    assert_eq!(log.count_matching("sum(pgsize)"), 0);
    assert_eq!(schema.foreign_keys.len(), 1);
    assert_eq!(schema.foreign_keys[0].to_column, "id");
    assert!(schema.tables[1].columns[1].nullable);
    Ok(())
}
