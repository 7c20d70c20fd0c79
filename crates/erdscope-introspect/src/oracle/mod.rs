use async_trait::async_trait;

use erdscope_core::Schema;

use crate::catalog::extract_catalog;
use crate::connection::{CatalogConnection, Deadline};
use crate::dialect::Dialect;
use crate::error::ExtractError;
use crate::extractor::Extractor;

mod queries;

use queries::OracleCatalog;

/// Extractor for Oracle, reading the `all_*` dictionary views.
///
/// Only schemas owned by non-Oracle-maintained users are listed. A column is
/// nullable when `all_tab_columns.nullable` is `'Y'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleExtractor;

#[async_trait]
impl Extractor for OracleExtractor {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    async fn extract(
        &self,
        conn: &mut dyn CatalogConnection,
        deadline: Deadline,
    ) -> Result<Schema, ExtractError> {
        extract_catalog::<OracleCatalog>(conn, deadline).await
    }
}
