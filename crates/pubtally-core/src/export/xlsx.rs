use rust_xlsxwriter::{Format, Workbook};

use crate::error::{PubtallyError, Result};
use crate::models::Table;

/// One worksheet: the column names in bold, then every row as text.
pub fn write_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(sheet_name)
        .map_err(|err| PubtallyError::Export(format!("unable to name worksheet: {err}")))?;

    let header_format = Format::new().set_bold();
    for (col, name) in table.columns().iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(|err| PubtallyError::Export(format!("unable to write header row: {err}")))?;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet
                .write_string(row_num, col as u16, value)
                .map_err(|err| PubtallyError::Export(format!("unable to write row {row_num}: {err}")))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|err| PubtallyError::Export(format!("unable to finalize workbook: {err}")))
}
