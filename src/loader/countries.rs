use anyhow::Result;

use super::lookup::country_id;
use super::{load_each, LoadStats, Outcome};
use crate::db::{Database, DbResult};
use crate::parser::CountryRecord;
use crate::schema::COUNTRIES;
use crate::ui::Ui;

/// Insert a country unless one with the same alpha-2 code exists
pub fn insert_country(db: &mut Database, record: &CountryRecord) -> DbResult<Outcome> {
    if record.alpha2.is_empty() {
        return Ok(Outcome::Rejected);
    }
    if country_id(db, &record.alpha2)?.is_some() {
        return Ok(Outcome::Existing);
    }

    let id = db.insert_row(
        COUNTRIES.name,
        &[
            record.name.as_str().into(),
            record.alpha2.as_str().into(),
            record.alpha3.as_str().into(),
        ],
    )?;
    Ok(Outcome::Inserted(id))
}

pub fn load_countries(
    db: &mut Database,
    records: &[CountryRecord],
    ui: &mut impl Ui,
) -> Result<LoadStats> {
    load_each(
        COUNTRIES.name,
        records,
        ui,
        |record| insert_country(db, record),
        |record| record.alpha2.clone(),
    )
}
