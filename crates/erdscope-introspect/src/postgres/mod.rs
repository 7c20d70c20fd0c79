use async_trait::async_trait;

use erdscope_core::Schema;

use crate::catalog::extract_catalog;
use crate::connection::{CatalogConnection, Deadline};
use crate::dialect::Dialect;
use crate::error::ExtractError;
use crate::extractor::Extractor;

mod queries;

use queries::PostgresCatalog;

/// Extractor for PostgreSQL, reading `information_schema` and `pg_catalog`.
///
/// Sizes come from `pg_table_size`, comments from `obj_description`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresExtractor;

#[async_trait]
impl Extractor for PostgresExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn extract(
        &self,
        conn: &mut dyn CatalogConnection,
        deadline: Deadline,
    ) -> Result<Schema, ExtractError> {
        extract_catalog::<PostgresCatalog>(conn, deadline).await
    }
}
