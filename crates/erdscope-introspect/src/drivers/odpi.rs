//! Oracle over the `oracle` crate (ODPI-C). Calls are blocking and run on
//! tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;

use crate::connection::{CatalogConnection, CatalogRow, CatalogValue};
use crate::error::DbError;

struct OdpiConnection {
    conn: Arc<::oracle::Connection>,
}

/// Connect with an EZCONNECT string, `user/password@host:port/service`.
pub async fn open(dsn: &str) -> Result<Box<dyn CatalogConnection>, DbError> {
    let (credentials, connect_string) = dsn.rsplit_once('@').ok_or_else(|| {
        DbError::Driver("expected user/password@host:port/service".to_string())
    })?;
    let (user, password) = credentials.split_once('/').unwrap_or((credentials, ""));
    let (user, password, connect_string) =
        (user.to_string(), password.to_string(), connect_string.to_string());

    let conn = blocking(move || {
        ::oracle::Connection::connect(user, password, connect_string).map_err(DbError::driver)
    })
    .await?;
    Ok(Box::new(OdpiConnection {
        conn: Arc::new(conn),
    }))
}

#[async_trait]
impl CatalogConnection for OdpiConnection {
    async fn ping(&mut self) -> Result<(), DbError> {
        let conn = Arc::clone(&self.conn);
        blocking(move || conn.ping().map_err(DbError::driver)).await
    }

    async fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<CatalogRow>, DbError> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();
        let params: Vec<String> = params.iter().map(|param| param.to_string()).collect();
        blocking(move || {
            let binds: Vec<&dyn ::oracle::sql_type::ToSql> = params
                .iter()
                .map(|param| param as &dyn ::oracle::sql_type::ToSql)
                .collect();
            let rows = conn.query(&sql, &binds).map_err(DbError::driver)?;
            let mut out = Vec::new();
            for row in rows {
                let row = row.map_err(DbError::driver)?;
                let values = (0..row.sql_values().len())
                    .map(|idx| {
                        row.get::<usize, Option<String>>(idx)
                            .map(CatalogValue::from)
                            .map_err(|err| DbError::Decode {
                                column: idx,
                                message: err.to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                out.push(CatalogRow::new(values));
            }
            Ok(out)
        })
        .await
    }

    async fn close(self: Box<Self>) -> Result<(), DbError> {
        let conn = self.conn;
        blocking(move || conn.close().map_err(DbError::driver)).await
    }
}

async fn blocking<T, F>(work: F) -> Result<T, DbError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(DbError::driver)?
}
