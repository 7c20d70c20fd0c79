use async_trait::async_trait;

use erdscope_core::Schema;

use crate::catalog::extract_catalog;
use crate::connection::{CatalogConnection, Deadline};
use crate::dialect::Dialect;
use crate::error::ExtractError;
use crate::extractor::Extractor;

mod queries;

use queries::MySqlCatalog;

/// Extractor for MySQL and MariaDB, reading `information_schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlExtractor;

#[async_trait]
impl Extractor for MySqlExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn extract(
        &self,
        conn: &mut dyn CatalogConnection,
        deadline: Deadline,
    ) -> Result<Schema, ExtractError> {
        extract_catalog::<MySqlCatalog>(conn, deadline).await
    }
}
