//! End-to-end loader tests against small CSV fixtures and in-memory
//! databases. No network access is needed.

use std::fs;
use tempfile::TempDir;

use unlocode_to_sqlite::config::{Config, ConnectionInfo};
use unlocode_to_sqlite::db::{Database, SqlValue};
use unlocode_to_sqlite::download::SourceFiles;
use unlocode_to_sqlite::filter::resolve_tables;
use unlocode_to_sqlite::loader::{country_id, zone_id, LoadStats, ReferenceLoader};
use unlocode_to_sqlite::schema::ALL_TABLES;
use unlocode_to_sqlite::ui::{Phase, SilentUi, Ui};

// =============================================================================
// Fixtures
// =============================================================================

const COUNTRIES_CSV: &str = "\
name,alpha2,alpha3
Canada,CA,CAN
Andorra,AD,AND
Russian Federation,RU,RUS
";

/// Québec is spelled in ISO-8859-1, as in the published files
const SUBDIVISIONS_CSV: &[u8] = b"\
\"AD\",\"02\",\"Canillo\",\"Parish\"
\"CA\",\"ON\",\"Ontario\",\"Province\"
\"CA\",\"ON\",\"Ontario\",\"Province\"
\"CA\",\"QC\",\"Qu\xe9bec\",\"Province\"
\"RU\",\"AMU\",\"Amurskaya oblast'\",\"Oblast\"
\"XX\",\"01\",\"Nowhere\",\"Province\"
\"CA\",\"NU\",\"Nunavut\",\"\"
";

const CODE_LIST_PART1: &str = "\
,\"CA\",,\".CANADA\",\".CANADA\",,,,,,,
,\"CA\",\"TOR\",\"Toronto\",\"Toronto\",\"ON\",\"AI\",\"1-345---\",\"0701\",\"YTO\",\"4342N 07925W\",\"\"
,\"CA\",\"OTT\",\"Ottawa\",\"Ottawa\",\"ON\",\"AI\",\"1-345---\",\"0701\",\"\",\"4525N 07542W\",\"\"
,\"CA\",\"MTR\",\"Montréal\",\"Montreal\",\"QC\",\"AI\",\"1-345---\",\"0701\",\"YMQ\",\"4531N 07334W\",\"\"
,\"AD\",\"ALV\",\"Andorra la Vella\",\"Andorra la Vella\",,\"AI\",\"--3-----\",\"0601\",\"\",\"4230N 00131E\",\"\"
,\"CA\",\"ZZZ\",\"Ghost Town\",\"Ghost Town\",\"YT\",\"RL\",\"--3-----\",\"0601\",\"\",\"\",\"\"
";

const CODE_LIST_PART2: &str = "\
,\"CA\",\"HAM\",\"Hamilton\",\"Hamilton\",\"ON\",\"AI\",\"1-3-----\",\"0701\",\"\",\"\",\"\"
,\"CA\",\"TOR\",\"Toronto\",\"Toronto\",\"ON\",\"AI\",\"1-345---\",\"0701\",\"YTO\",\"4342N 07925W\",\"\"
";

struct Fixture {
    _dir: TempDir,
    sources: SourceFiles,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    fs::write(root.join("countries.csv"), COUNTRIES_CSV).unwrap();
    fs::write(root.join("2024-2 SubdivisionCodes.csv"), SUBDIVISIONS_CSV).unwrap();
    fs::write(root.join("2024-2 UNLOCODE CodeListPart2.csv"), CODE_LIST_PART2).unwrap();
    fs::write(root.join("2024-2 UNLOCODE CodeListPart1.csv"), CODE_LIST_PART1).unwrap();

    let sources = SourceFiles::discover(root, root.join("countries.csv")).unwrap();
    Fixture { _dir: dir, sources }
}

fn memory_db() -> Database {
    Database::connect(&ConnectionInfo::in_memory("refdata")).unwrap()
}

fn load(db: &mut Database, config: &Config, sources: &SourceFiles) -> unlocode_to_sqlite::LoadSummary {
    ReferenceLoader::new(db, config)
        .run(sources, ALL_TABLES, &mut SilentUi)
        .unwrap()
}

fn count(db: &mut Database, table: &str, filter: &str, params: &[SqlValue]) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {} {}", db.qualify(table).unwrap(), filter);
    db.execute(&sql, params).unwrap();
    db.fetchone().unwrap()[0].as_i64().unwrap()
}

fn single_value(db: &mut Database, sql: &str, params: &[SqlValue]) -> SqlValue {
    db.execute(sql, params).unwrap();
    let mut row = db.fetchone().expect("no row returned");
    row.remove(0)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_full_load_counts() {
    let fx = fixture();
    let mut db = memory_db();

    let summary = load(&mut db, &Config::default(), &fx.sources);

    assert!(summary.skipped.is_empty());
    assert_eq!(
        summary.stats("countries"),
        Some(&LoadStats {
            read: 3,
            inserted: 3,
            ..LoadStats::default()
        })
    );
    assert_eq!(
        summary.stats("zones"),
        Some(&LoadStats {
            read: 7,
            inserted: 2,
            existing: 1,
            rejected: 3,
            unresolved: 1,
            failed: 0,
        })
    );
    assert_eq!(
        summary.stats("places"),
        Some(&LoadStats {
            read: 8,
            inserted: 4,
            existing: 1,
            rejected: 1,
            unresolved: 2,
            failed: 0,
        })
    );
    assert_eq!(summary.total_inserted(), 9);
}

#[test]
fn test_second_run_is_idempotent() {
    let fx = fixture();
    let mut db = memory_db();
    let config = Config::default();

    load(&mut db, &config, &fx.sources);
    let summary = load(&mut db, &config, &fx.sources);

    assert!(summary.loaded.is_empty());
    assert_eq!(summary.skipped, vec!["countries", "zones", "places"]);
    assert_eq!(count(&mut db, "countries", "", &[]), 3);
    assert_eq!(count(&mut db, "zones", "", &[]), 2);
    assert_eq!(count(&mut db, "places", "", &[]), 4);
}

#[test]
fn test_rejected_types_never_inserted() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    let rejected = count(
        &mut db,
        "zones",
        "WHERE lower(type) IN ('parish', 'oblast') OR trim(type) = ''",
        &[],
    );
    assert_eq!(rejected, 0);
}

#[test]
fn test_custom_rejection_list() {
    let fx = fixture();
    let mut db = memory_db();
    let config = Config {
        rejected_zone_types: vec!["province".to_string()],
        ..Config::default()
    };

    let summary = load(&mut db, &config, &fx.sources);

    // Parish and Oblast are accepted, every province is turned away
    assert_eq!(count(&mut db, "zones", "", &[]), 2);
    assert_eq!(
        count(&mut db, "zones", "WHERE code IN ('02', 'AMU')", &[]),
        2
    );
    assert_eq!(summary.stats("places").unwrap().inserted, 0);
}

#[test]
fn test_lookups_resolve_natural_keys() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    let canada = country_id(&mut db, "CA").unwrap().expect("Canada not loaded");
    let sql = format!(
        "SELECT id FROM {} WHERE alpha3 = ?1",
        db.qualify("countries").unwrap()
    );
    assert_eq!(single_value(&mut db, &sql, &["CAN".into()]).as_i64(), Some(canada));
    assert_eq!(country_id(&mut db, "XX").unwrap(), None);

    let ontario = zone_id(&mut db, canada, "ON").unwrap().expect("Ontario not loaded");
    let sql = format!(
        "SELECT country_id FROM {} WHERE id = ?1",
        db.qualify("zones").unwrap()
    );
    assert_eq!(single_value(&mut db, &sql, &[ontario.into()]).as_i64(), Some(canada));
    assert_eq!(
        count(&mut db, "zones", "WHERE code = 'ON'", &[]),
        1,
        "duplicate subdivision row inserted twice"
    );
}

#[test]
fn test_places_reference_their_zone() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    let canada = country_id(&mut db, "CA").unwrap().unwrap();
    let ontario = zone_id(&mut db, canada, "ON").unwrap().unwrap();

    let sql = format!(
        "SELECT zone_id, name, flags, coordinates FROM {} WHERE code = 'TOR'",
        db.qualify("places").unwrap()
    );
    db.execute(&sql, &[]).unwrap();
    let rows = db.fetchall();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].as_i64(), Some(ontario));
    assert_eq!(rows[0][1].as_str(), Some("Toronto"));
    assert_eq!(rows[0][2].as_str(), Some("1-345---"));
    assert_eq!(rows[0][3].as_str(), Some("4342N 07925W"));

    let sql = format!(
        "SELECT coordinates FROM {} WHERE code = 'HAM'",
        db.qualify("places").unwrap()
    );
    assert!(single_value(&mut db, &sql, &[]).is_null());
}

#[test]
fn test_unresolved_places_are_skipped() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    assert_eq!(count(&mut db, "places", "WHERE code IN ('ALV', 'ZZZ')", &[]), 0);
    assert_eq!(count(&mut db, "places", "WHERE code = ''", &[]), 0);
}

#[test]
fn test_latin1_names_decoded() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    let sql = format!(
        "SELECT name FROM {} WHERE code = 'QC'",
        db.qualify("zones").unwrap()
    );
    assert_eq!(single_value(&mut db, &sql, &[]).as_str(), Some("Québec"));

    let sql = format!(
        "SELECT name FROM {} WHERE code = 'MTR'",
        db.qualify("places").unwrap()
    );
    assert_eq!(single_value(&mut db, &sql, &[]).as_str(), Some("Montréal"));
}

#[test]
fn test_deleting_country_cascades() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    let canada = country_id(&mut db, "CA").unwrap().unwrap();
    db.delete_row("countries", canada).unwrap();

    assert_eq!(count(&mut db, "zones", "", &[]), 0);
    assert_eq!(count(&mut db, "places", "", &[]), 0);
    assert_eq!(count(&mut db, "countries", "", &[]), 2);
}

// =============================================================================
// Table selection and schema handling
// =============================================================================

#[test]
fn test_include_loads_parents_only() {
    let fx = fixture();
    let mut db = memory_db();
    let tables = resolve_tables(Some(vec!["zones".to_string()]), None).unwrap();

    let summary = ReferenceLoader::new(&mut db, &Config::default())
        .run(&fx.sources, &tables, &mut SilentUi)
        .unwrap();

    assert_eq!(summary.loaded.len(), 2);
    assert!(db.table_exist("zones", None).unwrap());
    assert!(!db.table_exist("places", None).unwrap());
    assert!(db
        .index_exist("zones", "idx_zones_country_id", None)
        .unwrap());
}

#[test]
fn test_recreate_reloads_from_scratch() {
    let fx = fixture();
    let mut db = memory_db();
    load(&mut db, &Config::default(), &fx.sources);

    let canada = country_id(&mut db, "CA").unwrap().unwrap();
    db.update_row("countries", canada, &["Kanada".into(), "CA".into(), "CAN".into()])
        .unwrap();

    let config = Config {
        recreate: true,
        ..Config::default()
    };
    let summary = load(&mut db, &config, &fx.sources);

    assert!(summary.skipped.is_empty());
    assert_eq!(count(&mut db, "places", "", &[]), 4);
    assert_eq!(count(&mut db, "countries", "WHERE name = 'Canada'", &[]), 1);
}

#[test]
fn test_failed_dataset_is_rolled_back() {
    let fx = fixture();
    let mut db = memory_db();
    let sources = SourceFiles {
        subdivisions_csv: None,
        ..fx.sources.clone()
    };

    let err = ReferenceLoader::new(&mut db, &Config::default())
        .run(&sources, ALL_TABLES, &mut SilentUi)
        .unwrap_err();

    assert!(format!("{:#}", err).contains("zones"));
    assert!(!db.in_transaction());
    assert_eq!(count(&mut db, "countries", "", &[]), 3);
    assert_eq!(count(&mut db, "zones", "", &[]), 0);
}

/// Asks to stop at the first check and remembers the counters it was shown
#[derive(Default)]
struct StopImmediately {
    inserted_before_stop: u64,
}

impl Ui for StopImmediately {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}

    fn set_stats(&mut self, _table: &str, stats: &LoadStats) {
        self.inserted_before_stop = stats.inserted;
    }

    fn cancelled(&mut self) -> bool {
        true
    }
}

#[test]
fn test_cancelled_load_discards_inserted_rows() {
    let fx = fixture();
    let mut db = memory_db();
    let mut ui = StopImmediately::default();

    let err = ReferenceLoader::new(&mut db, &Config::default())
        .run(&fx.sources, ALL_TABLES, &mut ui)
        .unwrap_err();

    assert!(format!("{:#}", err).contains("Interrupted"));
    assert_eq!(ui.inserted_before_stop, 1);
    assert!(!db.in_transaction());
    assert!(db.autocommit());
    assert_eq!(count(&mut db, "countries", "", &[]), 0);
}

#[test]
fn test_manual_commit_mode_is_kept() {
    let fx = fixture();
    let info = ConnectionInfo {
        autocommit: false,
        ..ConnectionInfo::in_memory("refdata")
    };
    let mut db = Database::connect(&info).unwrap();

    let summary = load(&mut db, &Config::default(), &fx.sources);

    assert_eq!(summary.total_inserted(), 9);
    assert!(!db.autocommit());
    assert!(!db.in_transaction());

    let backup = tempfile::tempdir().unwrap();
    assert!(db.dump(None, backup.path()).unwrap().exists());
}

#[test]
fn test_on_disk_load_survives_reconnect() {
    let fx = fixture();
    let data_dir = tempfile::tempdir().unwrap();
    let info = ConnectionInfo::on_disk(data_dir.path(), "refdata");

    let mut db = Database::connect(&info).unwrap();
    load(&mut db, &Config::default(), &fx.sources);
    db.close().unwrap();

    assert!(data_dir.path().join("refdata.sqlite3").exists());

    let mut db = Database::connect(&info).unwrap();
    assert_eq!(db.row_count("places", None).unwrap(), 4);

    let backup = tempfile::tempdir().unwrap();
    let dest = db.dump(None, backup.path()).unwrap();
    assert!(dest.exists());
    db.close().unwrap();
}
