use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};

use crate::error::{PubtallyError, Result};
use crate::models::{Table, TableOrigin};

/// Read the first worksheet. The header row becomes the column list and every
/// later non-blank row becomes a record; no column is renamed or dropped.
pub fn read_spreadsheet(path: &Path, faculty_column: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| PubtallyError::Spreadsheet(format!("unable to open workbook: {err}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PubtallyError::Spreadsheet("workbook has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| PubtallyError::Spreadsheet(format!("unable to read worksheet '{sheet_name}'")))?
        .map_err(|err| PubtallyError::Spreadsheet(format!("unable to read worksheet data: {err}")))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok(Table::new(Vec::new(), Vec::new(), faculty_column, TableOrigin::Parsed));
    };

    let columns: Vec<String> = header_row.iter().map(cell_to_string).collect();
    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|values| values.iter().any(|v| !v.is_empty()))
        .collect();

    Ok(Table::new(columns, rows, faculty_column, TableOrigin::Parsed))
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::Empty => String::new(),
        _ => cell.to_string().trim().to_string(),
    }
}
