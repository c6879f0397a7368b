use anyhow::Result;

use super::lookup::{country_id, place_id, zone_id};
use super::{load_each, LoadStats, Outcome};
use crate::db::{Database, DbResult, SqlValue};
use crate::parser::LocodeRecord;
use crate::schema::PLACES;
use crate::ui::Ui;

/// Insert a place under its zone. Rows whose country or subdivision cannot
/// be resolved are skipped, as are rows with no location code (the country
/// header lines of the code list).
pub fn insert_place(db: &mut Database, record: &LocodeRecord) -> DbResult<Outcome> {
    if record.location.is_empty() {
        return Ok(Outcome::Rejected);
    }

    let Some(country_id) = country_id(db, &record.country)? else {
        return Ok(Outcome::Unresolved);
    };
    let Some(zone_id) = zone_id(db, country_id, &record.subdivision)? else {
        return Ok(Outcome::Unresolved);
    };

    if place_id(db, zone_id, &record.location)?.is_some() {
        return Ok(Outcome::Existing);
    }

    let id = db.insert_row(
        PLACES.name,
        &[
            zone_id.into(),
            record.location.as_str().into(),
            record.name.as_str().into(),
            optional(&record.name_ascii),
            optional(&record.function),
            optional(&record.coordinates),
        ],
    )?;
    Ok(Outcome::Inserted(id))
}

pub fn load_places(
    db: &mut Database,
    records: &[LocodeRecord],
    ui: &mut impl Ui,
) -> Result<LoadStats> {
    load_each(
        PLACES.name,
        records,
        ui,
        |record| insert_place(db, record),
        |record| format!("{} {}", record.country, record.location),
    )
}

fn optional(value: &str) -> SqlValue {
    if value.is_empty() {
        SqlValue::Null
    } else {
        value.into()
    }
}
