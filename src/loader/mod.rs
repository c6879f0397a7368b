//! Loads the scraped country codes and the UN/LOCODE release into the
//! countries, zones and places tables.
//!
//! Every dataset is loaded parents first. A table that already holds rows is
//! left alone, and within a load every row is checked against its natural
//! key, so running the loader twice never duplicates anything.

pub mod countries;
pub mod lookup;
pub mod places;
pub mod zones;

pub use countries::*;
pub use lookup::*;
pub use places::*;
pub use zones::*;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::fmt;
use std::ops::AddAssign;

use crate::config::Config;
use crate::db::{Database, DbResult};
use crate::download::SourceFiles;
use crate::parser::{read_countries, read_locodes, read_subdivisions};
use crate::schema::{generate_indexes, generate_table_definition, Dataset, TableSchema};
use crate::ui::{Phase, Ui};

const PROGRESS_EVERY: usize = 500;

/// What happened to a single input row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted(i64),
    /// A row with the same natural key is already stored
    Existing,
    /// Filtered out by type or missing its key
    Rejected,
    /// The parent country or zone could not be found
    Unresolved,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub read: u64,
    pub inserted: u64,
    pub existing: u64,
    pub rejected: u64,
    pub unresolved: u64,
    pub failed: u64,
}

impl LoadStats {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted(_) => self.inserted += 1,
            Outcome::Existing => self.existing += 1,
            Outcome::Rejected => self.rejected += 1,
            Outcome::Unresolved => self.unresolved += 1,
        }
    }
}

impl AddAssign for LoadStats {
    fn add_assign(&mut self, other: Self) {
        self.read += other.read;
        self.inserted += other.inserted;
        self.existing += other.existing;
        self.rejected += other.rejected;
        self.unresolved += other.unresolved;
        self.failed += other.failed;
    }
}

impl fmt::Display for LoadStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} read, {} inserted, {} existing, {} rejected, {} unresolved, {} failed",
            self.read, self.inserted, self.existing, self.rejected, self.unresolved, self.failed
        )
    }
}

/// Per-table results of one [`ReferenceLoader::run`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: Vec<(&'static str, LoadStats)>,
    /// Tables left untouched because they already held rows
    pub skipped: Vec<&'static str>,
}

impl LoadSummary {
    pub fn stats(&self, table: &str) -> Option<&LoadStats> {
        self.loaded
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, stats)| stats)
    }

    pub fn total_inserted(&self) -> u64 {
        self.loaded.iter().map(|(_, stats)| stats.inserted).sum()
    }
}

pub struct ReferenceLoader<'a> {
    db: &'a mut Database,
    rejected: RejectedZoneTypes,
    recreate: bool,
}

impl<'a> ReferenceLoader<'a> {
    pub fn new(db: &'a mut Database, config: &Config) -> Self {
        Self {
            db,
            rejected: RejectedZoneTypes::new(&config.rejected_zone_types),
            recreate: config.recreate,
        }
    }

    /// Create whatever tables and foreign-key indexes are missing. With
    /// `recreate` the tables are dropped first, children before parents.
    pub fn prepare_schema(&mut self, tables: &[&'static TableSchema]) -> DbResult<()> {
        if self.recreate {
            for table in tables.iter().rev() {
                if self.db.table_exist(table.name, None)? {
                    info!("Dropping table {}", table.name);
                    self.db.drop_table(table.name, None)?;
                }
            }
        }

        for table in tables {
            if !self.db.table_exist(table.name, None)? {
                self.db
                    .create_table(table.name, &generate_table_definition(table), None)?;
            }

            for (column, index) in generate_indexes(table) {
                if !self.db.index_exist(table.name, &index, None)? {
                    self.db.create_index(table.name, column, &index, None)?;
                }
            }
        }

        Ok(())
    }

    /// Load every table in `tables` (parents first) that is still empty
    pub fn run(
        &mut self,
        sources: &SourceFiles,
        tables: &[&'static TableSchema],
        ui: &mut impl Ui,
    ) -> Result<LoadSummary> {
        ui.set_phase(Phase::Loading);
        self.prepare_schema(tables)
            .context("Failed to prepare schema")?;

        let mut summary = LoadSummary::default();

        for table in tables {
            let rows = self.db.row_count(table.name, None)?;
            if rows > 0 {
                ui.log(format!("{}: {} rows present, skipping", table.name, rows));
                summary.skipped.push(table.name);
                continue;
            }

            ui.set_info(format!("Loading {}", table.name));
            let autocommit = self.db.autocommit();
            self.db.set_autocommit(false)?;

            match self.load_dataset(table.dataset, sources, ui) {
                Ok(stats) => {
                    self.db.commit()?;
                    self.db.set_autocommit(autocommit)?;
                    info!("{}: {}", table.name, stats);
                    ui.log(format!("{}: {}", table.name, stats));
                    summary.loaded.push((table.name, stats));
                }
                Err(err) => {
                    if let Err(rollback) = self.db.rollback() {
                        warn!("Rollback of {} failed: {}", table.name, rollback);
                    }
                    self.db.set_autocommit(autocommit)?;
                    return Err(err.context(format!("Failed to load {}", table.name)));
                }
            }
        }

        ui.set_phase(Phase::Complete);
        Ok(summary)
    }

    fn load_dataset(
        &mut self,
        dataset: Dataset,
        sources: &SourceFiles,
        ui: &mut impl Ui,
    ) -> Result<LoadStats> {
        match dataset {
            Dataset::Countries => {
                let records = read_countries(&sources.countries_csv)?;
                load_countries(self.db, &records, ui)
            }
            Dataset::Zones => {
                let path = sources
                    .subdivisions_csv
                    .as_ref()
                    .context("No SubdivisionCodes CSV file in the release")?;
                let records = read_subdivisions(path)?;
                load_zones(self.db, &records, &self.rejected, ui)
            }
            Dataset::Places => {
                if sources.locode_csvs.is_empty() {
                    warn!("No UNLOCODE code list files in the release");
                }

                let mut stats = LoadStats::default();
                for path in &sources.locode_csvs {
                    ui.log(format!("Reading {:?}", path.file_name().unwrap_or_default()));
                    let records = read_locodes(path)?;
                    stats += load_places(self.db, &records, ui)?;
                }
                Ok(stats)
            }
        }
    }
}

/// Feed every record through `insert`, counting outcomes. Database errors on
/// a single row are logged and counted as failed; the load carries on.
pub(crate) fn load_each<T>(
    label: &str,
    records: &[T],
    ui: &mut impl Ui,
    mut insert: impl FnMut(&T) -> DbResult<Outcome>,
    describe: impl Fn(&T) -> String,
) -> Result<LoadStats> {
    let total = records.len() as u64;
    let mut stats = LoadStats::default();

    for (idx, record) in records.iter().enumerate() {
        stats.read += 1;
        match insert(record) {
            Ok(outcome) => stats.record(outcome),
            Err(err) => {
                warn!("{}: skipping {}: {}", label, describe(record), err);
                stats.failed += 1;
            }
        }

        if idx % PROGRESS_EVERY == 0 {
            ui.set_progress(idx as u64 + 1, total, label);
            ui.set_stats(label, &stats);
            if ui.cancelled() {
                bail!("Interrupted while loading {}", label);
            }
        }
    }

    ui.set_progress(total, total, label);
    ui.set_stats(label, &stats);
    ui.clear_progress();
    Ok(stats)
}
