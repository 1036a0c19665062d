//! Spreadsheet export of a report.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::table::{Cell, ReportTable, WARNINGS_SHEET};
use crate::core::AuditError;

fn export_error(context: &str) -> impl FnOnce(XlsxError) -> AuditError + '_ {
    move |e| AuditError::Export(format!("{context}: {e}"))
}

fn row_index(i: usize) -> Result<u32, AuditError> {
    u32::try_from(i).map_err(|_| AuditError::Export(format!("row {i} out of range")))
}

fn col_index(i: usize) -> Result<u16, AuditError> {
    u16::try_from(i).map_err(|_| AuditError::Export(format!("column {i} out of range")))
}

fn write_header(sheet: &mut Worksheet, columns: &[&str], bold: &Format) -> Result<(), AuditError> {
    for (col, header) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col_index(col)?, *header, bold)
            .map_err(export_error("failed to write header"))?;
    }
    sheet
        .set_freeze_panes(1, 0)
        .map_err(export_error("failed to freeze header row"))?;
    Ok(())
}

impl ReportTable {
    /// Render the report as an XLSX workbook.
    ///
    /// The results sheet is named after the document kind; the `Avisos`
    /// sheet is only added when there are warnings.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, AuditError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        {
            let sheet = workbook
                .add_worksheet()
                .set_name(self.sheet_name())
                .map_err(export_error("failed to create results sheet"))?;
            write_header(sheet, self.columns, &bold)?;

            for (r, row) in self.rows.iter().enumerate() {
                let r = row_index(r + 1)?;
                for (c, cell) in row.iter().enumerate() {
                    let c = col_index(c)?;
                    match cell {
                        Cell::Text(s) => {
                            sheet
                                .write_string(r, c, s)
                                .map_err(export_error("failed to write cell"))?;
                        }
                        Cell::Number(d) => {
                            sheet
                                .write_number(r, c, d.to_f64().unwrap_or_default())
                                .map_err(export_error("failed to write cell"))?;
                        }
                        Cell::Empty => {}
                    }
                }
            }
        }

        if !self.warnings.is_empty() {
            let sheet = workbook
                .add_worksheet()
                .set_name(WARNINGS_SHEET)
                .map_err(export_error("failed to create warnings sheet"))?;
            write_header(sheet, &[WARNINGS_SHEET], &bold)?;
            for (r, warning) in self.warnings.iter().enumerate() {
                sheet
                    .write_string(row_index(r + 1)?, 0, warning)
                    .map_err(export_error("failed to write warning"))?;
            }
        }

        workbook
            .save_to_buffer()
            .map_err(export_error("failed to save workbook"))
    }
}
