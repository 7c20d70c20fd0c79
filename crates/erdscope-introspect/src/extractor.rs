use async_trait::async_trait;

use erdscope_core::Schema;

use crate::connection::{CatalogConnection, Deadline};
use crate::dialect::Dialect;
use crate::error::ExtractError;

/// Trait implemented by per-engine catalog extractors.
///
/// `conn` is open and has already answered a ping. Every catalog query must be
/// issued through `deadline`. On success the schema may lack foreign keys or
/// primary-key flags (those lookups are best-effort), but tables and columns
/// are complete.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The engine family this extractor reads.
    fn dialect(&self) -> Dialect;

    /// Read the catalog and build a schema snapshot.
    async fn extract(
        &self,
        conn: &mut dyn CatalogConnection,
        deadline: Deadline,
    ) -> Result<Schema, ExtractError>;
}
