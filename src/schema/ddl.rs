use super::types::TableSchema;

/// Body of the CREATE TABLE statement for a table schema
pub fn generate_table_definition(schema: &TableSchema) -> String {
    let mut parts = vec!["\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];

    for col in schema.columns {
        let null_constraint = if col.nullable { "" } else { " NOT NULL" };
        parts.push(format!(
            "\"{}\" {}{}",
            col.name,
            col.col_type.sql(),
            null_constraint
        ));
    }

    for key in schema.unique {
        let columns: Vec<String> = key.iter().map(|c| format!("\"{}\"", c)).collect();
        parts.push(format!("UNIQUE ({})", columns.join(", ")));
    }

    for fk in schema.foreign_keys {
        parts.push(format!(
            "FOREIGN KEY (\"{}\") REFERENCES \"{}\"(\"{}\") ON DELETE CASCADE",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    parts.join(", ")
}

/// `(column, index name)` for every foreign key column
pub fn generate_indexes(schema: &TableSchema) -> Vec<(&'static str, String)> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| (fk.column, fk.index_name(schema.name)))
        .collect()
}
