use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use zip::ZipArchive;

use crate::ui::Ui;

/// Extract the CSV members of a zip file into `dest_dir`, dropping any
/// directory prefix. Returns the number of files written.
pub fn extract_csv(zip_path: &Path, dest_dir: &Path, ui: &mut impl Ui) -> Result<usize> {
    let file = File::open(zip_path).context("Failed to open zip file")?;
    let reader = BufReader::new(file);
    let mut archive = ZipArchive::new(reader).context("Failed to read zip archive")?;

    fs::create_dir_all(dest_dir).context("Failed to create destination directory")?;

    let total_files = archive.len();
    let mut extracted = 0;

    for i in 0..total_files {
        let mut file = archive
            .by_index(i)
            .context("Failed to read file from archive")?;

        // Get the file name, stripping any directory prefix
        let name = file.name();
        let file_name = Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
            .to_string();

        ui.set_progress((i + 1) as u64, total_files as u64, "Extracting");

        if file.is_dir() || !file_name.to_ascii_lowercase().ends_with(".csv") {
            continue;
        }

        let dest_path = dest_dir.join(&file_name);
        let mut dest_file = File::create(&dest_path)
            .with_context(|| format!("Failed to create file: {:?}", dest_path))?;

        io::copy(&mut file, &mut dest_file)
            .with_context(|| format!("Failed to extract: {}", file_name))?;

        ui.log(format!("Extracted {}", file_name));
        extracted += 1;
    }

    ui.clear_progress();
    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    #[test]
    fn test_extracts_only_csv_members() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("loc242csv.zip");

        let mut writer = ZipWriter::new(File::create(&zip_path).unwrap());
        let options = SimpleFileOptions::default();
        writer
            .start_file("loc242csv/2024-2 SubdivisionCodes.csv", options)
            .unwrap();
        writer.write_all(b"\"CA\",\"ON\",\"Ontario\",\"Province\"\n").unwrap();
        writer.start_file("loc242csv/readme.txt", options).unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();

        let dest = dir.path().join("out");
        let count = extract_csv(&zip_path, &dest, &mut SilentUi::new()).unwrap();

        assert_eq!(count, 1);
        assert!(dest.join("2024-2 SubdivisionCodes.csv").exists());
        assert!(!dest.join("readme.txt").exists());
    }
}
