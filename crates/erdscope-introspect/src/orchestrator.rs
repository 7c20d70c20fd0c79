//! Connect to a database, probe it and run the matching extractor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use erdscope_core::{redact_connection_string, Schema};

use crate::connection::{CatalogConnection, Connector, Deadline};
use crate::dialect::normalize_driver;
use crate::drivers::NativeConnector;
use crate::error::{DbError, Error, Result};
use crate::registry::ExtractorRegistry;

const CLOSE_GRACE: Duration = Duration::from_millis(500);

/// Entry point for one-shot schema extraction.
///
/// Each call opens its own connection and closes it before returning, so an
/// `Introspector` can be shared across tasks.
#[derive(Clone)]
pub struct Introspector {
    registry: Arc<ExtractorRegistry>,
    connector: Arc<dyn Connector>,
}

impl Introspector {
    pub fn new(registry: Arc<ExtractorRegistry>, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry,
            connector,
        }
    }

    /// Use the drivers compiled into this build.
    pub fn native(registry: Arc<ExtractorRegistry>) -> Self {
        Self::new(registry, Arc::new(NativeConnector))
    }

    /// Normalize `driver`, open `dsn`, ping it and extract its schema.
    ///
    /// `timeout` bounds the whole call: connect, ping and every catalog query
    /// share one deadline. Nothing is retried.
    pub async fn connect_and_extract(
        &self,
        driver: &str,
        dsn: &str,
        timeout: Duration,
    ) -> Result<Schema> {
        let key = normalize_driver(driver);
        let Some(extractor) = self.registry.resolve(&key) else {
            return Err(Error::DialectNotRegistered {
                driver: key,
                available: self.registry.registered(),
            });
        };

        let target = redact_connection_string(dsn).redacted;
        let started = Instant::now();
        tracing::info!(event = "extraction_started", driver = %key, dsn = %target);

        let deadline = Deadline::after(timeout);
        let mut conn = deadline
            .bound(self.connector.open(&key, dsn))
            .await
            .map_err(|err| match err {
                DbError::DeadlineExceeded => Error::Timeout(timeout),
                other => Error::Connection(other.to_string()),
            })?;

        if let Err(err) = deadline.bound(conn.ping()).await {
            close(conn, deadline, &key).await;
            return Err(match err {
                DbError::DeadlineExceeded => Error::Timeout(timeout),
                other => Error::Unreachable(other.to_string()),
            });
        }

        let result = extractor.extract(conn.as_mut(), deadline).await;
        close(conn, deadline, &key).await;
        let schema = result.inspect_err(|err| {
            tracing::warn!(event = "extraction_failed", driver = %key, dsn = %target, error = %err);
        })?;

        tracing::info!(
            event = "extraction_finished",
            driver = %key,
            dsn = %target,
            tables = schema.tables.len(),
            foreign_keys = schema.foreign_keys.len(),
            duration_ms = started.elapsed().as_millis() as u64
        );
        Ok(schema)
    }
}

impl std::fmt::Debug for Introspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Introspector")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

// Closing gets whatever is left of the deadline plus a short grace period;
// on expiry the connection is dropped instead.
async fn close(conn: Box<dyn CatalogConnection>, deadline: Deadline, driver: &str) {
    let limit = deadline.remaining() + CLOSE_GRACE;
    match tokio::time::timeout(limit, conn.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::warn!(event = "connection_close_failed", driver = %driver, error = %err);
        }
        Err(_) => {
            tracing::warn!(
                event = "connection_close_failed",
                driver = %driver,
                error = "close did not finish in time; connection dropped"
            );
        }
    }
}
