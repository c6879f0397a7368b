use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};
use unlocode_to_sqlite::{
    cli::{Cli, Commands},
    config::{Config, ConnectionInfo, SourceConfig},
    db::Database,
    download::{ensure_sources, SourceFiles},
    filter::resolve_tables,
    loader::{LoadSummary, ReferenceLoader},
    logging::init_logger,
    schema::{table_names, TableSchema},
    ui::{ConsoleUi, Ui, UiApp},
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logger(cli.log_level.into(), cli.log_file.as_deref())?;

    match cli.command {
        Commands::Sync {
            database,
            data_dir,
            cache_dir,
            force,
            recreate,
            include,
            exclude,
            config,
            tui,
        } => {
            let start = Instant::now();

            let config = build_config(config.as_deref(), &database, data_dir, recreate)?;
            let tables = resolve_tables(include, exclude)?;
            let mut db = connect(&config.connection);

            let (sources, summary) = if tui {
                let mut ui = UiApp::new()?;
                let result = sync(&mut db, &config, &tables, cache_dir, force, &mut ui);
                match &result {
                    Ok((_, summary)) => {
                        ui.finish(&format!("Inserted {} rows", summary.total_inserted()))?
                    }
                    Err(_) => ui.restore()?,
                }
                result?
            } else {
                sync(&mut db, &config, &tables, cache_dir, force, &mut ConsoleUi::new())?
            };

            db.close()?;
            print_summary(&summary, start.elapsed());
            if let Some(version) = sources.version {
                println!("UN/LOCODE release {}", version);
            }
        }

        Commands::Download { output, force } => {
            let sources = ensure_sources(output, force, &SourceConfig::default(), &mut ConsoleUi::new())?;
            println!(
                "UN/LOCODE release {} ({} code list files) cached with {:?}",
                sources.version.as_deref().unwrap_or("unknown"),
                sources.locode_csvs.len(),
                sources.countries_csv
            );
        }

        Commands::Load {
            input_dir,
            database,
            countries_csv,
            data_dir,
            recreate,
            include,
            exclude,
            config,
        } => {
            let start = Instant::now();

            let config = build_config(config.as_deref(), &database, data_dir, recreate)?;
            let tables = resolve_tables(include, exclude)?;
            let countries_csv = countries_csv.unwrap_or_else(|| input_dir.join("countries.csv"));
            let sources = SourceFiles::discover(&input_dir, countries_csv)?;

            let mut db = connect(&config.connection);
            let summary =
                ReferenceLoader::new(&mut db, &config).run(&sources, &tables, &mut ConsoleUi::new())?;
            db.close()?;

            print_summary(&summary, start.elapsed());
        }

        Commands::Dump {
            database,
            data_dir,
            output,
        } => {
            let info = ConnectionInfo {
                data_dir: Some(data_dir.clone()),
                ..ConnectionInfo::default()
            };
            let mut db = connect(&info);
            if !db.database_exist(&database)? {
                bail!("Database {} not found in {:?}", database, data_dir);
            }
            db.use_database(&database)?;

            let dest = db.dump(None, &output.unwrap_or(data_dir))?;
            db.close()?;
            println!("Dumped {} to {:?}", database, dest);
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

/// Start from the config file (or defaults) and apply the command-line flags
fn build_config(
    path: Option<&Path>,
    database: &str,
    data_dir: Option<PathBuf>,
    recreate: bool,
) -> Result<Config> {
    let mut config = Config::load_or_default(path)?;
    config.connection.database = Some(database.to_string());
    if data_dir.is_some() {
        config.connection.data_dir = data_dir;
    }
    config.recreate |= recreate;
    Ok(config)
}

fn connect(info: &ConnectionInfo) -> Database {
    match Database::connect(info) {
        Ok(db) => db,
        Err(err) => {
            eprintln!(
                "Could not connect to database {}: {}",
                info.database.as_deref().unwrap_or("(none)"),
                err
            );
            process::exit(1);
        }
    }
}

fn sync(
    db: &mut Database,
    config: &Config,
    tables: &[&'static TableSchema],
    cache_dir: Option<PathBuf>,
    force: bool,
    ui: &mut impl Ui,
) -> Result<(SourceFiles, LoadSummary)> {
    let sources = ensure_sources(cache_dir, force, &config.sources, ui)?;
    let summary = ReferenceLoader::new(db, config).run(&sources, tables, ui)?;
    Ok((sources, summary))
}

fn print_summary(summary: &LoadSummary, elapsed: Duration) {
    println!();
    for (table, stats) in &summary.loaded {
        println!("  {:<10} {}", table, stats);
    }
    for table in &summary.skipped {
        println!("  {:<10} already loaded", table);
    }
    println!(
        "\nInserted {} rows in {:.1}s",
        summary.total_inserted(),
        elapsed.as_secs_f64()
    );
}
