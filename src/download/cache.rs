use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::is_subdivision_file;

const COUNTRIES_FILE: &str = "countries.csv";

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "unlocode-to-sqlite")
                    .context("Could not determine cache directory")?;
                proj_dirs.cache_dir().to_path_buf()
            }
        };

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Scraped country codes
    pub fn countries_csv(&self) -> PathBuf {
        self.cache_dir.join(COUNTRIES_FILE)
    }

    /// Directory holding the extracted CSVs of a release
    pub fn release_dir(&self, stem: &str) -> PathBuf {
        self.cache_dir.join(stem)
    }

    /// Get path to zip file for a release
    pub fn zip_path(&self, stem: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.zip", stem))
    }

    /// A release counts as cached once its subdivision file is extracted
    pub fn is_cached(&self, stem: &str) -> bool {
        let Ok(entries) = fs::read_dir(self.release_dir(stem)) else {
            return false;
        };

        entries
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_str().is_some_and(is_subdivision_file))
    }

    /// Remove extracted directories and zips of every other release
    pub fn cleanup_old_releases(&self, keep: &str) -> Result<()> {
        for entry in fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let stem = name.strip_suffix(".zip").unwrap_or(name);
            if stem == keep || !is_release_stem(stem) {
                continue;
            }

            if path.is_dir() {
                fs::remove_dir_all(&path).ok();
            } else {
                fs::remove_file(&path).ok();
            }
        }
        Ok(())
    }
}

fn is_release_stem(name: &str) -> bool {
    name.len() == "loc242csv".len()
        && name.starts_with("loc")
        && name.ends_with("csv")
        && name[3..6].chars().all(|c| c.is_ascii_digit())
}
