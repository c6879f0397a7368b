//! Reference-data tables, parents before children

use super::types::*;

pub static COUNTRIES: TableSchema = TableSchema {
    name: "countries",
    dataset: Dataset::Countries,
    columns: &[
        Column::required("name", ColumnType::Text),
        Column::required("alpha2", ColumnType::Text),
        Column::required("alpha3", ColumnType::Text),
    ],
    foreign_keys: &[],
    unique: &[&["alpha2"], &["alpha3"]],
};

pub static ZONES: TableSchema = TableSchema {
    name: "zones",
    dataset: Dataset::Zones,
    columns: &[
        Column::required("country_id", ColumnType::Integer),
        Column::required("code", ColumnType::Text),
        Column::required("name", ColumnType::Text),
        Column::required("type", ColumnType::Text),
    ],
    foreign_keys: &[ForeignKey::new("country_id", "countries")],
    unique: &[&["country_id", "code"]],
};

pub static PLACES: TableSchema = TableSchema {
    name: "places",
    dataset: Dataset::Places,
    columns: &[
        Column::required("zone_id", ColumnType::Integer),
        Column::required("code", ColumnType::Text),
        Column::required("name", ColumnType::Text),
        Column::new("name_ascii", ColumnType::Text),
        Column::new("flags", ColumnType::Text),
        Column::new("coordinates", ColumnType::Text),
    ],
    foreign_keys: &[ForeignKey::new("zone_id", "zones")],
    unique: &[&["zone_id", "code"]],
};

pub static ALL_TABLES: &[&TableSchema] = &[&COUNTRIES, &ZONES, &PLACES];

/// Get table by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
