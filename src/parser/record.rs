//! CSV records for the three reference datasets.
//!
//! The UN/LOCODE files have no header row and are published in ISO-8859-1,
//! so they are read as raw bytes and decoded per field. The country cache is
//! written by this crate as UTF-8 with a header.

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder, Trim, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One row of the scraped country-code table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub alpha2: String,
    pub alpha3: String,
}

impl CountryRecord {
    pub fn new(name: &str, alpha2: &str, alpha3: &str) -> Self {
        Self {
            name: name.to_string(),
            alpha2: alpha2.to_string(),
            alpha3: alpha3.to_string(),
        }
    }
}

/// One row of `SubdivisionCodes.csv`: country, code, name, type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdivisionRecord {
    pub country: String,
    pub code: String,
    pub name: String,
    pub kind: String,
}

/// One row of a `UNLOCODE CodeListPart*.csv` file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocodeRecord {
    pub change: String,
    pub country: String,
    pub location: String,
    pub name: String,
    pub name_ascii: String,
    pub subdivision: String,
    pub status: String,
    pub function: String,
    pub date: String,
    pub iata: String,
    pub coordinates: String,
    pub remarks: String,
}

pub fn read_countries(path: &Path) -> Result<Vec<CountryRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
    parse_countries(file).with_context(|| format!("Failed to parse: {:?}", path))
}

pub fn parse_countries<R: Read>(reader: R) -> Result<Vec<CountryRecord>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for result in rdr.deserialize() {
        let record: CountryRecord = result.context("Malformed country row")?;
        records.push(record);
    }

    Ok(records)
}

pub fn write_countries(path: &Path, records: &[CountryRecord]) -> Result<()> {
    let mut writer =
        Writer::from_path(path).with_context(|| format!("Failed to create: {:?}", path))?;

    for record in records {
        writer
            .serialize(record)
            .context("Failed to write country row")?;
    }

    writer.flush().context("Failed to flush country file")?;
    Ok(())
}

pub fn read_subdivisions(path: &Path) -> Result<Vec<SubdivisionRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
    parse_subdivisions(file).with_context(|| format!("Failed to parse: {:?}", path))
}

pub fn parse_subdivisions<R: Read>(reader: R) -> Result<Vec<SubdivisionRecord>> {
    read_rows(reader, |row| SubdivisionRecord {
        country: field(row, 0),
        code: field(row, 1),
        name: field(row, 2),
        kind: field(row, 3),
    })
}

pub fn read_locodes(path: &Path) -> Result<Vec<LocodeRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
    parse_locodes(file).with_context(|| format!("Failed to parse: {:?}", path))
}

pub fn parse_locodes<R: Read>(reader: R) -> Result<Vec<LocodeRecord>> {
    read_rows(reader, |row| LocodeRecord {
        change: field(row, 0),
        country: field(row, 1),
        location: field(row, 2),
        name: field(row, 3),
        name_ascii: field(row, 4),
        subdivision: field(row, 5),
        status: field(row, 6),
        function: field(row, 7),
        date: field(row, 8),
        iata: field(row, 9),
        coordinates: field(row, 10),
        remarks: field(row, 11),
    })
}

fn read_rows<R: Read, T>(reader: R, build: impl Fn(&ByteRecord) -> T) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();

    while rdr.read_byte_record(&mut record).context("Malformed CSV row")? {
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(build(&record));
    }

    Ok(rows)
}

/// Field `idx`, decoded and trimmed; missing trailing fields read as empty
fn field(record: &ByteRecord, idx: usize) -> String {
    record
        .get(idx)
        .map(|bytes| decode(bytes).trim().to_string())
        .unwrap_or_default()
}

/// UTF-8 when valid, otherwise ISO-8859-1 (each byte is its own code point)
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode(b"Qu\xe9bec"), "Québec");
        assert_eq!(decode("Québec".as_bytes()), "Québec");
    }

    #[test]
    fn test_parse_subdivisions() {
        let data = "\"AD\",\"02\",\"Canillo\",\"Parish\"\n\"CA\",\"ON\",\"Ontario\",\"Province\"\n\n";
        let rows = parse_subdivisions(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[1],
            SubdivisionRecord {
                country: "CA".into(),
                code: "ON".into(),
                name: "Ontario".into(),
                kind: "Province".into(),
            }
        );
    }

    #[test]
    fn test_parse_short_subdivision_row() {
        let rows = parse_subdivisions("\"XX\",\"01\"\n".as_bytes()).unwrap();
        assert_eq!(rows[0].name, "");
        assert_eq!(rows[0].kind, "");
    }

    #[test]
    fn test_parse_locodes() {
        let data = concat!(
            ",\"CA\",,\".CANADA\",\".CANADA\",,,,,,,\n",
            ",\"CA\",\"TOR\",\"Toronto\",\"Toronto\",\"ON\",\"AI\",\"1-345---\",\"0701\",\"YTO\",\"4342N 07925W\",\"\"\n",
        );
        let rows = parse_locodes(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].location, "");
        assert_eq!(rows[1].location, "TOR");
        assert_eq!(rows[1].subdivision, "ON");
        assert_eq!(rows[1].function, "1-345---");
        assert_eq!(rows[1].coordinates, "4342N 07925W");
    }

    #[test]
    fn test_countries_round_trip_through_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.csv");
        let records = vec![
            CountryRecord::new("Canada", "CA", "CAN"),
            CountryRecord::new("Côte d'Ivoire", "CI", "CIV"),
        ];

        write_countries(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("name,alpha2,alpha3"));
        assert_eq!(read_countries(&path).unwrap(), records);
    }
}
