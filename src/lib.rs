pub mod cli;
pub mod config;
pub mod db;
pub mod download;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod parser;
pub mod schema;
pub mod ui;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use db::{Database, DbError};
pub use loader::{LoadStats, LoadSummary, ReferenceLoader};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui, UiApp};
