//! Process-wide lookup from driver names to extractors.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::dialect::Dialect;
use crate::extractor::Extractor;
use crate::mysql::MySqlExtractor;
#[cfg(feature = "oracle")]
use crate::oracle::OracleExtractor;
use crate::postgres::PostgresExtractor;
use crate::sqlite::SqliteExtractor;
use crate::sqlserver::SqlServerExtractor;

/// Extractors keyed by lowercase driver name.
///
/// Aliases of one engine share a single extractor instance. Registration
/// replaces any previous entry under the same key.
#[derive(Default)]
pub struct ExtractorRegistry {
    extractors: RwLock<BTreeMap<String, Arc<dyn Extractor>>>,
}

impl ExtractorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every extractor compiled into this build, under each
    /// of its dialect's registry keys.
    pub fn builtin() -> Self {
        let registry = Self::new();
        registry.register_dialect(Arc::new(PostgresExtractor));
        registry.register_dialect(Arc::new(MySqlExtractor));
        registry.register_dialect(Arc::new(SqlServerExtractor));
        registry.register_dialect(Arc::new(SqliteExtractor));
        #[cfg(feature = "oracle")]
        registry.register_dialect(Arc::new(OracleExtractor));
        registry
    }

    /// Install `extractor` under `name` (case-insensitive).
    pub fn register(&self, name: &str, extractor: Arc<dyn Extractor>) {
        let mut extractors = self
            .extractors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        extractors.insert(name.to_lowercase(), extractor);
    }

    /// Install `extractor` under every registry key of its dialect.
    pub fn register_dialect(&self, extractor: Arc<dyn Extractor>) {
        let dialect: Dialect = extractor.dialect();
        for key in dialect.registry_keys() {
            self.register(key, Arc::clone(&extractor));
        }
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Extractor>> {
        let extractors = self
            .extractors
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        extractors.get(&name.to_lowercase()).cloned()
    }

    /// Registered keys in sorted order.
    pub fn registered(&self) -> Vec<String> {
        let extractors = self
            .extractors
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        extractors.keys().cloned().collect()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_installs_every_alias() {
        let registry = ExtractorRegistry::builtin();
        let registered = registry.registered();
        for key in [
            "mariadb",
            "mssql",
            "mysql",
            "postgres",
            "postgresql",
            "sqlite",
            "sqlite3",
            "sqlserver",
        ] {
            assert!(registered.contains(&key.to_string()), "missing {key}");
        }
        assert_eq!(
            registered.iter().any(|key| key == "godror"),
            cfg!(feature = "oracle")
        );
    }

    #[test]
    fn aliases_share_one_instance() {
        let registry = ExtractorRegistry::builtin();
        let postgres = registry.resolve("postgres").unwrap();
        let postgresql = registry.resolve("postgresql").unwrap();
        assert!(Arc::ptr_eq(&postgres, &postgresql));

        let sqlite = registry.resolve("sqlite3").unwrap();
        assert_eq!(sqlite.dialect(), Dialect::Sqlite);
    }

    #[test]
    fn keys_are_case_insensitive_and_overwrite() {
        let registry = ExtractorRegistry::new();
        registry.register("MySQL", Arc::new(MySqlExtractor));
        assert_eq!(registry.resolve("mysql").unwrap().dialect(), Dialect::MySql);

        registry.register("mysql", Arc::new(PostgresExtractor));
        assert_eq!(registry.resolve("MYSQL").unwrap().dialect(), Dialect::Postgres);
        assert_eq!(registry.registered(), vec!["mysql".to_string()]);
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert!(ExtractorRegistry::builtin().resolve("snowflake").is_none());
    }
}
