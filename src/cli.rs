use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unlocode-to-sqlite")]
#[command(version, about = "Load ISO country codes and UN/LOCODE into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (RUST_LOG is honored; this overrides it)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the sources (if needed) and load them
    Sync {
        /// Database to load into
        database: String,

        /// Directory holding the database files (in memory when omitted)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Custom cache directory
        #[arg(short, long)]
        cache_dir: Option<PathBuf>,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,

        /// Drop and recreate the tables before loading
        #[arg(short, long)]
        recreate: bool,

        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show the full-screen terminal UI
        #[arg(long)]
        tui: bool,
    },

    /// Download the country codes and latest UN/LOCODE release
    Download {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force re-download even if cached
        #[arg(short, long)]
        force: bool,
    },

    /// Load from an already extracted release directory
    Load {
        /// Directory containing the UN/LOCODE CSV files
        input_dir: PathBuf,

        /// Database to load into
        database: String,

        /// Country codes CSV (defaults to <input_dir>/countries.csv)
        #[arg(long)]
        countries_csv: Option<PathBuf>,

        /// Directory holding the database files (in memory when omitted)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Drop and recreate the tables before loading
        #[arg(short, long)]
        recreate: bool,

        /// Only include these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        include: Option<Vec<String>>,

        /// Exclude these tables (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,

        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a compacted backup copy of a database
    Dump {
        /// Database to back up
        database: String,

        /// Directory holding the database files
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Backup directory (defaults to the data directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List all managed table names
    ListTables,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
