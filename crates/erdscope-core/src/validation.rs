use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// Validate internal consistency of an extracted schema.
///
/// This checks:
/// - duplicate (schema, table) pairs
/// - duplicate column names within a table
/// - foreign keys whose child and parent column lists differ in length
///
/// Foreign keys pointing at tables outside the snapshot are allowed.
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let mut tables = BTreeSet::new();

    for table in &schema.tables {
        if !tables.insert((table.schema.as_str(), table.name.as_str())) {
            return Err(Error::InvalidSchema(format!(
                "duplicate table name: {}",
                table.qualified_name()
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.name.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate column name: {}.{}",
                    table.qualified_name(),
                    column.name
                )));
            }
        }
    }

    for fk in &schema.foreign_keys {
        let from = fk.from_columns();
        let to = fk.to_columns();
        if from.is_empty() || from.len() != to.len() {
            return Err(Error::InvalidSchema(format!(
                "foreign key {} on {} pairs {} column(s) with {}",
                if fk.constraint.is_empty() { "<unnamed>" } else { fk.constraint.as_str() },
                fk.from_table,
                from.len(),
                to.len()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKey, Table};

    fn column(name: &str) -> Column {
        Column {
            name: name.to_string(),
            data_type: "int".to_string(),
            nullable: false,
            pk: false,
        }
    }

    #[test]
    fn accepts_dangling_foreign_key_targets() {
        let mut orders = Table::new("app", "orders");
        orders.columns = vec![column("id"), column("customer_id")];
        let schema = Schema {
            tables: vec![orders],
            foreign_keys: vec![ForeignKey {
                from_schema: "app".to_string(),
                from_table: "orders".to_string(),
                from_column: "customer_id".to_string(),
                to_schema: "crm".to_string(),
                to_table: "customers".to_string(),
                to_column: "id".to_string(),
                constraint: "orders_customer_fk".to_string(),
            }],
        };

        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn rejects_duplicate_tables_in_same_namespace() {
        let schema = Schema {
            tables: vec![Table::new("app", "users"), Table::new("app", "users")],
            foreign_keys: Vec::new(),
        };

        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("app.users"));
    }

    #[test]
    fn same_name_in_different_namespaces_is_fine() {
        let schema = Schema {
            tables: vec![Table::new("app", "users"), Table::new("audit", "users")],
            foreign_keys: Vec::new(),
        };

        assert!(validate_schema(&schema).is_ok());
    }

    #[test]
    fn rejects_duplicate_columns() {
        let mut users = Table::new("", "users");
        users.columns = vec![column("id"), column("id")];
        let schema = Schema {
            tables: vec![users],
            foreign_keys: Vec::new(),
        };

        assert!(validate_schema(&schema).is_err());
    }

    #[test]
    fn rejects_misaligned_composite_keys() {
        let schema = Schema {
            tables: Vec::new(),
            foreign_keys: vec![ForeignKey {
                from_table: "order_lines".to_string(),
                from_column: "order_id, line_no".to_string(),
                to_table: "orders".to_string(),
                to_column: "id".to_string(),
                ..ForeignKey::default()
            }],
        };

        let err = validate_schema(&schema).unwrap_err();
        assert!(err.to_string().contains("<unnamed>"));
    }
}
