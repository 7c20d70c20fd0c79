use async_trait::async_trait;

use erdscope_core::Schema;

use crate::catalog::extract_catalog;
use crate::connection::{CatalogConnection, Deadline};
use crate::dialect::Dialect;
use crate::error::ExtractError;
use crate::extractor::Extractor;

mod queries;

use queries::SqlServerCatalog;

/// Extractor for Microsoft SQL Server, reading `sys.*` and `INFORMATION_SCHEMA`.
///
/// `sys.tables` lists user tables only, so no system-schema filter is applied.
/// Comments come from the `MS_Description` extended property.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerExtractor;

#[async_trait]
impl Extractor for SqlServerExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    async fn extract(
        &self,
        conn: &mut dyn CatalogConnection,
        deadline: Deadline,
    ) -> Result<Schema, ExtractError> {
        extract_catalog::<SqlServerCatalog>(conn, deadline).await
    }
}
