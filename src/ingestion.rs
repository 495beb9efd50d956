//! Ingestion - loads a directory of `;`-delimited company files into one table
//!
//! Each file is parsed independently. Lines that do not fit the header are
//! skipped, files that cannot be parsed at all are skipped with a warning,
//! and the surviving tables are stacked by column name with nulls filling
//! columns a file does not have.

use crate::error::{RadarError, Result};
use csv::ReaderBuilder;
use polars::prelude::*;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const FIELD_DELIMITER: u8 = b';';

/// One parsed file, before merging. Cells are text; empty cells are `None`.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
    pub skipped_lines: usize,
    /// Lines that were not valid UTF-8 and were decoded as ISO-8859-1.
    pub latin1_lines: usize,
}

impl RawTable {
    fn column_index(&self) -> HashMap<&str, usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx))
            .collect()
    }
}

/// List the `*.csv` files directly inside `dir`, sorted by path.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path.extension().and_then(|s| s.to_str()) == Some("csv");
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn to_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decode one field. Bytes that are not valid UTF-8 are read as ISO-8859-1,
/// the usual encoding of registry extracts; the flag reports that fallback.
fn decode_field(raw: &[u8]) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(raw) {
        Ok(s) => (Cow::Borrowed(s), false),
        Err(_) => (Cow::Owned(raw.iter().map(|&b| b as char).collect()), true),
    }
}

/// Blank headers become `Unnamed: {idx}` and repeated ones get a `.{n}` suffix,
/// so every column name in a table is unique.
fn normalize_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(idx, h)| {
            let base = match h.trim() {
                "" => format!("Unnamed: {}", idx),
                name => name.to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

/// Parse one file. Lines with more fields than the header are dropped;
/// short lines are padded with nulls.
pub fn parse_csv_file(path: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let raw_headers: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| decode_field(h).0.into_owned())
        .collect();
    let headers = normalize_headers(raw_headers.iter().map(String::as_str));
    if headers.is_empty() || (headers.len() == 1 && headers[0].starts_with("Unnamed")) {
        return Err(RadarError::MalformedFile(format!(
            "{}: no header row",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    let mut skipped_lines = 0;
    let mut latin1_lines = 0;
    for result in rdr.byte_records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    return Err(e.into());
                }
                debug!("Skipping unreadable line in {}: {}", path.display(), e);
                skipped_lines += 1;
                continue;
            }
        };

        if record.len() > headers.len() {
            debug!(
                "Skipping line {} in {}: {} fields, expected {}",
                record.position().map(|p| p.line()).unwrap_or_default(),
                path.display(),
                record.len(),
                headers.len()
            );
            skipped_lines += 1;
            continue;
        }

        let mut fell_back = false;
        let row: Vec<Option<String>> = (0..headers.len())
            .map(|idx| {
                record.get(idx).and_then(|raw| {
                    let (text, latin1) = decode_field(raw);
                    fell_back |= latin1;
                    to_cell(&text)
                })
            })
            .collect();
        if fell_back {
            latin1_lines += 1;
        }
        rows.push(row);
    }

    Ok(RawTable {
        source: path.to_path_buf(),
        headers,
        rows,
        skipped_lines,
        latin1_lines,
    })
}

/// Stack tables by column name. Column order is first-seen order across
/// the inputs.
pub fn merge_tables(tables: &[RawTable]) -> Result<DataFrame> {
    if tables.is_empty() {
        return Err(RadarError::NoInputFiles("no tables to merge".to_string()));
    }

    let mut columns: Vec<String> = Vec::new();
    let mut known: HashSet<String> = HashSet::new();
    for table in tables {
        for header in &table.headers {
            if known.insert(header.clone()) {
                columns.push(header.clone());
            }
        }
    }

    let indexes: Vec<HashMap<&str, usize>> = tables.iter().map(|t| t.column_index()).collect();
    let total_rows: usize = tables.iter().map(|t| t.rows.len()).sum();

    let series = columns
        .iter()
        .map(|name| {
            let mut values: Vec<Option<String>> = Vec::with_capacity(total_rows);
            for (table, index) in tables.iter().zip(&indexes) {
                match index.get(name.as_str()) {
                    Some(&idx) => values.extend(table.rows.iter().map(|row| row[idx].clone())),
                    None => values.extend(std::iter::repeat(None).take(table.rows.len())),
                }
            }
            Series::new(name.as_str(), values)
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(series)?)
}

/// Load every parseable `*.csv` file in `dir` into one DataFrame.
pub fn load_directory(dir: &Path) -> Result<DataFrame> {
    let files = discover_csv_files(dir)?;
    let mut tables = Vec::with_capacity(files.len());

    for path in files {
        match parse_csv_file(&path) {
            Ok(table) => {
                if table.skipped_lines > 0 {
                    warn!(
                        "Skipped {} malformed line(s) in {}",
                        table.skipped_lines,
                        path.display()
                    );
                }
                if table.latin1_lines > 0 {
                    warn!(
                        "Decoded {} non-UTF-8 line(s) in {} as ISO-8859-1",
                        table.latin1_lines,
                        path.display()
                    );
                }
                tables.push(table);
            }
            Err(e) => warn!("Erro ao ler csv {}: {}", path.display(), e),
        }
    }

    if tables.is_empty() {
        return Err(RadarError::NoInputFiles(dir.display().to_string()));
    }

    let df = merge_tables(&tables)?;
    info!(
        "Loaded {} rows from {} file(s) in {}",
        df.height(),
        tables.len(),
        dir.display()
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_parse_skips_long_lines_and_pads_short_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "a.csv",
            "cnae_principal;municipio-id;bairro\n4789004;3550308;Centro\n1;2;3;4\n4711302;3550308\n",
        );

        let table = parse_csv_file(&path).unwrap();
        assert_eq!(table.headers, vec!["cnae_principal", "municipio-id", "bairro"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped_lines, 1);
        assert_eq!(table.rows[1][2], None);
    }

    #[test]
    fn test_normalize_headers_dedups() {
        let record = csv::StringRecord::from(vec!["a", " a ", "", "b"]);
        assert_eq!(normalize_headers(record.iter()), vec!["a", "a.1", "Unnamed: 2", "b"]);
    }

    #[test]
    fn test_latin1_lines_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut body = b"cnae_principal;municipio-id;bairro\n4789004;3550308;Centro\n".to_vec();
        body.extend_from_slice(b"4789004;3550308;Jardim Am\xE9rica\n");
        fs::write(&path, body).unwrap();

        let table = parse_csv_file(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.skipped_lines, 0);
        assert_eq!(table.latin1_lines, 1);
        assert_eq!(table.rows[1][2].as_deref(), Some("Jardim América"));
        assert_eq!(table.rows[0][2].as_deref(), Some("Centro"));
    }

    #[test]
    fn test_empty_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "empty.csv", "");
        assert!(parse_csv_file(&path).is_err());
    }

    #[test]
    fn test_discover_ignores_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "x\n1\n");
        write(dir.path(), "a.csv", "x\n1\n");
        write(dir.path(), "notes.txt", "x\n1\n");
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = discover_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_load_directory_without_files_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_directory(dir.path()).unwrap_err();
        assert!(matches!(err, RadarError::NoInputFiles(_)));
    }
}
