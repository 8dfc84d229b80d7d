use crate::types::{PumpRecord, PumpTable, RawPumpRow, RECOGNIZED_COLUMNS};
use crate::util::{is_filled, parse_f64_safe};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("no header row in {0}")]
    MissingHeader(String),

    #[error("no CSV files found in {0}")]
    NoInput(String),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub label: String,
    pub total_rows: usize,
    pub blank_rows: usize,
    pub unparsed_values: usize,
}

/// Read one worksheet export. The file stem becomes the table label and the
/// first line is the header.
pub fn load_table(path: &Path) -> Result<(PumpTable, LoadReport), LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.display().to_string()));
    }
    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: StringRecord = rdr.headers()?.iter().map(str::trim).collect();
    if headers.iter().all(str::is_empty) {
        return Err(LoadError::MissingHeader(path.display().to_string()));
    }
    for col in headers.iter().filter(|c| !c.is_empty()) {
        if !RECOGNIZED_COLUMNS.contains(col) {
            debug!("{}: ignoring column '{}'", label, col);
        }
    }

    let mut total_rows = 0usize;
    let mut blank_rows = 0usize;
    let mut unparsed_values = 0usize;
    let mut records: Vec<PumpRecord> = Vec::new();

    for result in rdr.records() {
        let row = result?;
        total_rows += 1;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            blank_rows += 1;
            continue;
        }
        let raw: RawPumpRow = row.deserialize(Some(&headers))?;
        let mut reading = |cell: Option<String>| {
            let value = parse_f64_safe(cell.as_deref());
            if value.is_none() && is_filled(cell.as_deref()) {
                unparsed_values += 1;
            }
            value
        };
        records.push(PumpRecord {
            eff_p1: reading(raw.eff_p1),
            eff_p2: reading(raw.eff_p2),
            amp_0_bar_p1: reading(raw.amp_0_bar_p1),
            amp_0_bar_p2: reading(raw.amp_0_bar_p2),
            amp_200_bar_p1: reading(raw.amp_200_bar_p1),
            amp_200_bar_p2: reading(raw.amp_200_bar_p2),
            serial_no: raw
                .serial_no
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        });
    }

    let table = PumpTable::new(label.clone(), headers.iter(), records);
    info!(
        "{}: {} rows, {} blank, {} unparsed cells, classified {}",
        label,
        total_rows,
        blank_rows,
        unparsed_values,
        table.configuration()
    );
    let report = LoadReport {
        label,
        total_rows,
        blank_rows,
        unparsed_values,
    };
    Ok((table, report))
}

/// Expand directories into their `.csv` files, sorted by name, so table
/// order is stable from run to run.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .map(|e| e.eq_ignore_ascii_case("csv"))
                            .unwrap_or(false)
                })
                .collect();
            if found.is_empty() {
                return Err(LoadError::NoInput(path.display().to_string()));
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

pub fn load_inputs(paths: &[PathBuf]) -> Result<Vec<(PumpTable, LoadReport)>, LoadError> {
    collect_inputs(paths)?
        .iter()
        .map(|p| load_table(p))
        .collect()
}
