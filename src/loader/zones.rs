use anyhow::Result;
use std::collections::HashSet;

use super::lookup::{country_id, zone_id};
use super::{load_each, LoadStats, Outcome};
use crate::db::{Database, DbResult};
use crate::parser::SubdivisionRecord;
use crate::schema::ZONES;
use crate::ui::Ui;

/// Subdivision categories that are never loaded as zones
#[derive(Debug, Clone, Default)]
pub struct RejectedZoneTypes(HashSet<String>);

impl RejectedZoneTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(types.into_iter().map(|t| normalize(t.as_ref())).collect())
    }

    /// Blank types are rejected along with the listed categories
    pub fn rejects(&self, kind: &str) -> bool {
        let kind = normalize(kind);
        kind.is_empty() || self.0.contains(&kind)
    }
}

fn normalize(kind: &str) -> String {
    kind.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Insert a zone under its country unless the type is rejected, the country
/// is unknown, or the (country, code) pair already exists
pub fn insert_zone(
    db: &mut Database,
    record: &SubdivisionRecord,
    rejected: &RejectedZoneTypes,
) -> DbResult<Outcome> {
    if rejected.rejects(&record.kind) {
        return Ok(Outcome::Rejected);
    }

    let Some(country_id) = country_id(db, &record.country)? else {
        return Ok(Outcome::Unresolved);
    };

    if zone_id(db, country_id, &record.code)?.is_some() {
        return Ok(Outcome::Existing);
    }

    let id = db.insert_row(
        ZONES.name,
        &[
            country_id.into(),
            record.code.as_str().into(),
            record.name.as_str().into(),
            record.kind.as_str().into(),
        ],
    )?;
    Ok(Outcome::Inserted(id))
}

pub fn load_zones(
    db: &mut Database,
    records: &[SubdivisionRecord],
    rejected: &RejectedZoneTypes,
    ui: &mut impl Ui,
) -> Result<LoadStats> {
    load_each(
        ZONES.name,
        records,
        ui,
        |record| insert_zone(db, record, rejected),
        |record| format!("{}-{}", record.country, record.code),
    )
}
