pub mod cache;
pub mod client;
pub mod extract;
pub mod scrape;

pub use cache::*;
pub use client::*;
pub use extract::*;
pub use scrape::*;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SourceConfig;
use crate::parser::write_countries;
use crate::ui::{Phase, Ui};

/// Input files for one load pass
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFiles {
    pub countries_csv: PathBuf,
    pub subdivisions_csv: Option<PathBuf>,
    /// `*UNLOCODE*.csv` files in lexicographic order
    pub locode_csvs: Vec<PathBuf>,
    pub version: Option<String>,
}

impl SourceFiles {
    /// Find the subdivision and code-list files inside `dir`
    pub fn discover(dir: &Path, countries_csv: PathBuf) -> Result<Self> {
        let mut subdivisions_csv = None;
        let mut locode_csvs = Vec::new();

        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?;
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if is_subdivision_file(name) {
                if subdivisions_csv.is_some() {
                    warn!("Ignoring extra subdivision file {:?}", path);
                    continue;
                }
                subdivisions_csv = Some(path);
            } else if is_locode_file(name) {
                locode_csvs.push(path);
            }
        }

        locode_csvs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(Self {
            countries_csv,
            subdivisions_csv,
            locode_csvs,
            version: None,
        })
    }
}

pub fn is_subdivision_file(name: &str) -> bool {
    name.contains("SubdivisionCodes") && name.to_ascii_lowercase().ends_with(".csv")
}

pub fn is_locode_file(name: &str) -> bool {
    name.contains("UNLOCODE") && name.to_ascii_lowercase().ends_with(".csv")
}

/// Scrape the country codes unless already cached
pub fn ensure_countries(
    cache: &CacheManager,
    client: &SourceClient,
    page_url: &str,
    force: bool,
    ui: &mut impl Ui,
) -> Result<PathBuf> {
    let path = cache.countries_csv();
    if path.exists() && !force {
        ui.log(format!("Using cached country codes {:?}", path));
        return Ok(path);
    }

    ui.set_phase(Phase::Scraping);
    ui.set_info(page_url);

    let html = client.fetch_page(page_url)?;
    let records = parse_country_table(&html);
    if records.is_empty() {
        bail!("No country codes found on {}", page_url);
    }

    write_countries(&path, &records)?;
    ui.log(format!("Scraped {} countries", records.len()));
    info!("Wrote {} countries to {:?}", records.len(), path);

    Ok(path)
}

/// Make sure the country codes and the latest UN/LOCODE release are on disk,
/// downloading whatever is missing
pub fn ensure_sources(
    cache_dir: Option<PathBuf>,
    force: bool,
    config: &SourceConfig,
    ui: &mut impl Ui,
) -> Result<SourceFiles> {
    let cache = CacheManager::new(cache_dir)?;
    let client = SourceClient::new(&config.user_agent)?;

    let countries_csv = ensure_countries(&cache, &client, &config.country_page_url, force, ui)?;

    ui.set_phase(Phase::Checking);
    ui.set_info(&config.unlocode_page_url);
    let page = client.fetch_page(&config.unlocode_page_url)?;
    let release = find_latest_release(&page, &config.unlocode_page_url)?
        .with_context(|| format!("No UN/LOCODE CSV release linked from {}", config.unlocode_page_url))?;

    ui.set_info(format!("UN/LOCODE release {}", release.version));
    let release_dir = cache.release_dir(&release.stem);

    if force || !cache.is_cached(&release.stem) {
        let zip_path = cache.zip_path(&release.stem);

        ui.set_phase(Phase::Downloading);
        client.download_zip(release.url.as_str(), &zip_path, ui)?;

        ui.set_phase(Phase::Extracting);
        let count = extract_csv(&zip_path, &release_dir, ui)?;
        info!("Extracted {} files to {:?}", count, release_dir);

        fs::remove_file(&zip_path).ok();
        cache.cleanup_old_releases(&release.stem)?;
    } else {
        ui.log(format!("Using cached release {}", release.version));
    }

    let mut files = SourceFiles::discover(&release_dir, countries_csv)?;
    files.version = Some(release.version);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_sorts_code_lists() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "2024-2 UNLOCODE CodeListPart3.csv",
            "2024-2 UNLOCODE CodeListPart1.csv",
            "2024-2 SubdivisionCodes.csv",
            "2024-2 UNLOCODE CodeListPart2.csv",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let files = SourceFiles::discover(dir.path(), dir.path().join("countries.csv")).unwrap();

        let names: Vec<_> = files
            .locode_csvs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "2024-2 UNLOCODE CodeListPart1.csv",
                "2024-2 UNLOCODE CodeListPart2.csv",
                "2024-2 UNLOCODE CodeListPart3.csv",
            ]
        );
        assert_eq!(
            files.subdivisions_csv,
            Some(dir.path().join("2024-2 SubdivisionCodes.csv"))
        );
    }
}
