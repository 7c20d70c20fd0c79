use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Column, ColumnIndex, Connection, Decode, Row, Type, TypeInfo, ValueRef};

use crate::connection::{CatalogConnection, CatalogRow, CatalogValue};
use crate::error::DbError;

/// A single sqlx connection used for catalog reads.
struct SqlxConnection<C> {
    conn: C,
}

pub async fn open_postgres(dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
    let options = PgConnectOptions::from_str(dsn).map_err(DbError::driver)?;
    let conn = PgConnection::connect_with(&options)
        .await
        .map_err(DbError::driver)?;
    Ok(Box::new(SqlxConnection { conn }))
}

pub async fn open_mysql(dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
    let options = MySqlConnectOptions::from_str(dsn).map_err(DbError::driver)?;
    let conn = MySqlConnection::connect_with(&options)
        .await
        .map_err(DbError::driver)?;
    Ok(Box::new(SqlxConnection { conn }))
}

/// SQLite files are always opened read-only; a missing file is an error.
pub async fn open_sqlite(dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
    let options = SqliteConnectOptions::from_str(dsn)
        .map_err(DbError::driver)?
        .read_only(true)
        .create_if_missing(false);
    let conn = SqliteConnection::connect_with(&options)
        .await
        .map_err(DbError::driver)?;
    Ok(Box::new(SqlxConnection { conn }))
}

macro_rules! catalog_connection {
    ($conn:ty) => {
        #[async_trait]
        impl CatalogConnection for SqlxConnection<$conn> {
            async fn ping(&mut self) -> Result<(), DbError> {
                self.conn.ping().await.map_err(DbError::driver)
            }

            async fn query(
                &mut self,
                sql: &str,
                params: &[&str],
            ) -> Result<Vec<CatalogRow>, DbError> {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = query.bind(*param);
                }
                let rows = query
                    .fetch_all(&mut self.conn)
                    .await
                    .map_err(DbError::driver)?;
                rows.iter().map(decode_row).collect()
            }

            async fn close(self: Box<Self>) -> Result<(), DbError> {
                self.conn.close().await.map_err(DbError::driver)
            }
        }
    };
}

catalog_connection!(PgConnection);
catalog_connection!(MySqlConnection);
catalog_connection!(SqliteConnection);

/// Convert every value of a row by probing the Rust types catalog columns use.
fn decode_row<R>(row: &R) -> Result<CatalogRow, DbError>
where
    R: Row,
    usize: ColumnIndex<R>,
    for<'r> bool: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i32: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i16: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> f64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> Vec<u8>: Decode<'r, R::Database> + Type<R::Database>,
{
    let values = (0..row.len())
        .map(|idx| decode_value(row, idx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CatalogRow::new(values))
}

fn decode_value<R>(row: &R, idx: usize) -> Result<CatalogValue, DbError>
where
    R: Row,
    usize: ColumnIndex<R>,
    for<'r> bool: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i32: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i16: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> f64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> Vec<u8>: Decode<'r, R::Database> + Type<R::Database>,
{
    let raw = row.try_get_raw(idx).map_err(DbError::driver)?;
    if raw.is_null() {
        return Ok(CatalogValue::Null);
    }

    let type_name = row.column(idx).type_info().name().to_ascii_uppercase();
    if type_name.contains("BOOL") {
        if let Ok(value) = row.try_get::<bool, _>(idx) {
            return Ok(CatalogValue::Bool(value));
        }
    }
    if let Ok(value) = row.try_get::<i64, _>(idx) {
        return Ok(CatalogValue::Int(value));
    }
    if let Ok(value) = row.try_get::<i32, _>(idx) {
        return Ok(CatalogValue::Int(i64::from(value)));
    }
    if let Ok(value) = row.try_get::<i16, _>(idx) {
        return Ok(CatalogValue::Int(i64::from(value)));
    }
    if let Ok(value) = row.try_get::<f64, _>(idx) {
        return Ok(CatalogValue::Float(value));
    }
    if let Ok(value) = row.try_get::<String, _>(idx) {
        return Ok(CatalogValue::Text(value));
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(idx) {
        return Ok(CatalogValue::Text(String::from_utf8_lossy(&value).into_owned()));
    }

    Err(DbError::Decode {
        column: idx,
        message: format!("unsupported column type {type_name}"),
    })
}
