//! Logger initialization.

use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Initialize `env_logger` at `level`, optionally appending to `log_file`
/// instead of stderr.
///
/// `RUST_LOG` is read first and `level` overrides it, so per-module filters
/// such as `RUST_LOG=unlocode_to_sqlite::db=debug` still apply.
///
/// Lines look like `INFO:unlocode_to_sqlite::db::client:2024/05/01 12:00:00:use:USE "refdata"`.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("unlocode_to_sqlite", level);

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}:{}:{}:{}",
            record.level(),
            record.target(),
            chrono::Local::now().format("%Y/%m/%d %H:%M:%S"),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // Only the first call in a process installs a logger
    builder
        .try_init()
        .context("Failed to initialize logger")?;

    Ok(())
}
