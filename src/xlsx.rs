use std::path::Path;
use std::time::Instant;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::table::{Cell, Sheet};

#[derive(Debug, Error)]
pub enum XlsxExportError {
    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("too many rows in sheet '{0}'")]
    TooManyRows(String),
}

/// Writes one worksheet per sheet, with a bold header row.
pub fn write_workbook(out_path: &Path, sheets: &[Sheet]) -> Result<(), XlsxExportError> {
    let start_time = Instant::now();
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, &header_format)?;
    }

    workbook.save(out_path)?;

    info!(
        action = "complete",
        component = "xlsx_export",
        path = ?out_path,
        sheet_count = sheets.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Workbook written"
    );
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &Sheet,
    header_format: &Format,
) -> Result<(), XlsxExportError> {
    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    for (index, cells) in sheet.rows.iter().enumerate() {
        let row = u32::try_from(index + 1)
            .map_err(|_| XlsxExportError::TooManyRows(sheet.name.clone()))?;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, *value)?;
                }
                Cell::Link(url) => {
                    worksheet.write_url(row, col, url.as_str())?;
                }
            }
        }
    }

    Ok(())
}
