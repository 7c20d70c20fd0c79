use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Separator used when a composite key is flattened into one column-list string.
pub const COLUMN_LIST_SEPARATOR: &str = ", ";

/// Relational schema snapshot extracted from a live database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    /// Tables ordered by (schema, name).
    #[serde(default)]
    pub tables: Vec<Table>,
    /// Foreign keys, one entry per constraint.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Schema {
    /// Look up a table by namespace and name. Pass `""` for engines without namespaces.
    pub fn find_table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|table| table.schema == schema && table.name == name)
    }
}

/// A base table with its ordered columns and optional size/comment metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Table {
    /// Namespace; empty for engines without one (SQLite).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Row-count estimate, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub comment: Option<String>,
    /// Storage size in 8 KiB pages.
    #[serde(default, rename = "size8kPages", skip_serializing_if = "is_unsized")]
    pub size_8k_pages: Option<i64>,
}

impl Table {
    /// Create an empty table with the given namespace and name.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// `schema.name`, or just `name` when the table has no namespace.
    pub fn qualified_name(&self) -> String {
        if self.schema.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.schema, self.name)
        }
    }

    /// Names of the columns flagged as primary key, in column order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| column.pk)
            .map(|column| column.name.as_str())
            .collect()
    }

    /// Flag every column whose name exactly matches `column` as a primary-key column.
    ///
    /// Returns `false` when no such column exists; the table is left untouched.
    pub fn mark_primary_key(&mut self, column: &str) -> bool {
        let mut found = false;
        for candidate in self.columns.iter_mut().filter(|c| c.name == column) {
            candidate.pk = true;
            found = true;
        }
        found
    }
}

fn is_blank(comment: &Option<String>) -> bool {
    comment.as_deref().is_none_or(|text| text.trim().is_empty())
}

fn is_unsized(pages: &Option<i64>) -> bool {
    pages.is_none_or(|pages| pages <= 0)
}

/// A table column. `type` holds the engine-native type string, unnormalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub pk: bool,
}

/// A foreign key constraint. Composite keys are flattened into `", "`-joined
/// column lists whose positions pair child column `i` with parent column `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKey {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from_schema: String,
    pub from_table: String,
    pub from_column: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub to_schema: String,
    pub to_table: String,
    pub to_column: String,
    /// Constraint name; empty when the engine does not expose one.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub constraint: String,
}

impl ForeignKey {
    /// Child columns in key order.
    pub fn from_columns(&self) -> Vec<&str> {
        split_column_list(&self.from_column)
    }

    /// Parent columns in key order.
    pub fn to_columns(&self) -> Vec<&str> {
        split_column_list(&self.to_column)
    }
}

fn split_column_list(list: &str) -> Vec<&str> {
    if list.is_empty() {
        return Vec::new();
    }
    list.split(COLUMN_LIST_SEPARATOR).collect()
}
