use rust_xlsxwriter::{Format, Workbook, XlsxError};

use gcn_core::error::{GcnError, Result};
use gcn_core::record::LandTitleRecord;
use gcn_core::report::{Cell, ReportTable};

pub const EXPORT_FILE_NAME: &str = "Ket_qua_trich_xuat_GCN_dat_dai_Gemini.xlsx";
pub const EXPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "GCN";
const TEXT_COLUMN_WIDTH: f64 = 24.0;
const NUMBER_COLUMN_WIDTH: f64 = 14.0;

/// An encoded workbook ready to be offered as a download.
#[derive(Debug, Clone)]
pub struct SpreadsheetExport {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn export_report(records: &[LandTitleRecord]) -> Result<SpreadsheetExport> {
    let table = ReportTable::from_records(records);
    let bytes = write_xlsx(&table)?;

    tracing::info!(rows = table.rows.len(), bytes = bytes.len(), "Exported report workbook");

    Ok(SpreadsheetExport {
        file_name: EXPORT_FILE_NAME,
        mime_type: EXPORT_MIME_TYPE,
        bytes,
    })
}

/// Writes a header row and one row per record, in the table's column order.
pub fn write_xlsx(table: &ReportTable) -> Result<Vec<u8>> {
    build_workbook(table).map_err(|e| GcnError::Export(e.to_string()))
}

fn build_workbook(table: &ReportTable) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let area = Format::new().set_num_format("#,##0.0#");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in table.columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, name.as_str(), &header)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Number(n) => {
                    worksheet.write_number_with_format(r, col, *n, &area)?;
                }
                Cell::Text(s) => {
                    worksheet.write_string(r, col, s.as_str())?;
                }
            }
        }
    }

    let numeric_columns: Vec<bool> = match table.rows.first() {
        Some(row) => row.iter().map(|c| matches!(c, Cell::Number(_))).collect(),
        None => vec![false; table.columns.len()],
    };
    for (col, numeric) in numeric_columns.into_iter().enumerate() {
        let width = if numeric {
            NUMBER_COLUMN_WIDTH
        } else {
            TEXT_COLUMN_WIDTH
        };
        worksheet.set_column_width(col as u16, width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save_to_buffer()
}
