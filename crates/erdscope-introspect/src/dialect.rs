use std::fmt;

/// Database engine families with a catalog extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    SqlServer,
    Oracle,
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::SqlServer,
        Dialect::Oracle,
        Dialect::Sqlite,
    ];

    /// Canonical driver key, as produced by [`normalize_driver`].
    pub fn key(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "godror",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Every registry key the dialect's extractor is installed under.
    pub fn registry_keys(self) -> &'static [&'static str] {
        match self {
            Dialect::Postgres => &["postgres", "postgresql"],
            Dialect::MySql => &["mysql", "mariadb"],
            Dialect::SqlServer => &["sqlserver", "mssql"],
            Dialect::Oracle => &["godror", "oracle"],
            Dialect::Sqlite => &["sqlite3", "sqlite"],
        }
    }

    /// Resolve a user-supplied driver name through the alias table.
    pub fn from_driver(driver: &str) -> Option<Self> {
        let key = normalize_driver(driver);
        Self::ALL.into_iter().find(|dialect| dialect.key() == key)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Map a driver name to its canonical key.
///
/// Input is trimmed and compared case-insensitively; unknown names come back
/// lowercased so that a later registry lookup reports them verbatim.
pub fn normalize_driver(driver: &str) -> String {
    let lowered = driver.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "postgres" | "postgresql" | "pg" => "postgres",
        "mysql" | "mariadb" => "mysql",
        "sqlite" | "sqlite3" => "sqlite",
        "mssql" | "sqlserver" => "sqlserver",
        "oracle" | "godror" => "godror",
        _ => return lowered,
    };
    canonical.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgres_aliases_collapse() {
        assert_eq!(normalize_driver("  PostgreSQL "), "postgres");
        assert_eq!(normalize_driver("pg"), "postgres");
        assert_eq!(normalize_driver("postgres"), "postgres");
    }

    #[test]
    fn alias_table_covers_every_family() {
        let cases = [
            ("MariaDB", "mysql"),
            ("sqlite3", "sqlite"),
            ("MSSQL", "sqlserver"),
            ("sqlserver", "sqlserver"),
            ("Oracle", "godror"),
            ("godror", "godror"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_driver(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["pg", " MySQL", "sqlite3", "mssql", "oracle", "Snowflake "] {
            let once = normalize_driver(input);
            assert_eq!(normalize_driver(&once), once);
        }
    }

    #[test]
    fn unknown_drivers_are_lowercased() {
        assert_eq!(normalize_driver("Snowflake"), "snowflake");
        assert_eq!(Dialect::from_driver("Snowflake"), None);
    }

    #[test]
    fn registry_keys_resolve_to_their_dialect() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_driver(dialect.key()), Some(dialect));
            for alias in dialect.registry_keys() {
                assert_eq!(Dialect::from_driver(alias), Some(dialect));
            }
        }
    }
}
