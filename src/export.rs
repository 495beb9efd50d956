//! Spreadsheet export of the enriched table.

use crate::enrichment::text_column;
use crate::error::{RadarError, Result};
use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Outcome of an export attempt. Failures are reported, not raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub saved: bool,
    pub file_name: String,
}

impl ExportOutcome {
    pub fn message(&self) -> String {
        if self.saved {
            format!("Nome: {}", self.file_name)
        } else {
            format!("Falha ao salvar: {}", self.file_name)
        }
    }
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> RadarError {
    RadarError::Export(e.to_string())
}

/// Write every column of `df` to a single worksheet, header row first.
/// Null cells are left empty. An existing file at `path` is replaced.
pub fn write_spreadsheet(df: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col_idx, name) in df.get_column_names().into_iter().enumerate() {
        let col_num = u16::try_from(col_idx)
            .map_err(|_| RadarError::Export(format!("too many columns ({})", col_idx)))?;
        worksheet
            .write_string_with_format(0, col_num, name, &header_format)
            .map_err(xlsx_err)?;

        for (row_idx, value) in text_column(df, name)?.into_iter().enumerate() {
            let Some(value) = value else { continue };
            let row_num = u32::try_from(row_idx + 1)
                .map_err(|_| RadarError::Export(format!("too many rows ({})", row_idx)))?;
            worksheet
                .write_string(row_num, col_num, value)
                .map_err(xlsx_err)?;
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}

/// Export `df` to `path`, logging instead of propagating failures.
pub fn export_dataset(df: &DataFrame, path: &Path) -> ExportOutcome {
    let file_name = display_name(path);
    match write_spreadsheet(df, path) {
        Ok(()) => {
            info!("Data successfully saved to {}", path.display());
            ExportOutcome {
                saved: true,
                file_name,
            }
        }
        Err(e) => {
            error!("Error saving to Excel: {}", e);
            ExportOutcome {
                saved: false,
                file_name,
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
