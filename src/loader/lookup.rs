//! Natural-key lookups used to resolve parents and detect duplicates.

use crate::db::{Database, DbResult, SqlValue};
use crate::schema::{COUNTRIES, PLACES, ZONES};

pub fn country_id(db: &mut Database, alpha2: &str) -> DbResult<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE alpha2 = ?1",
        db.qualify(COUNTRIES.name)?
    );
    first_id(db, &sql, &[alpha2.into()])
}

pub fn zone_id(db: &mut Database, country_id: i64, code: &str) -> DbResult<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE country_id = ?1 AND code = ?2",
        db.qualify(ZONES.name)?
    );
    first_id(db, &sql, &[country_id.into(), code.into()])
}

pub fn place_id(db: &mut Database, zone_id: i64, code: &str) -> DbResult<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE zone_id = ?1 AND code = ?2",
        db.qualify(PLACES.name)?
    );
    first_id(db, &sql, &[zone_id.into(), code.into()])
}

fn first_id(db: &mut Database, sql: &str, params: &[SqlValue]) -> DbResult<Option<i64>> {
    db.execute(sql, params)?;
    Ok(db
        .fetchone()
        .and_then(|row| row.first().and_then(SqlValue::as_i64)))
}
