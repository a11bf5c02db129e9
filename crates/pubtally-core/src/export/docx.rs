use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Table as DocxTable, TableCell, TableRow};

use crate::error::{PubtallyError, Result};
use crate::models::Table;

/// A heading line, then a table whose first row holds the column names.
pub fn write_docx(table: &Table, heading: &str) -> Result<Vec<u8>> {
    let mut rows = Vec::with_capacity(table.len() + 1);
    rows.push(TableRow::new(table.columns().iter().map(|c| text_cell(c)).collect()));
    for row in table.rows() {
        rows.push(TableRow::new(row.iter().map(|v| text_cell(v)).collect()));
    }

    let doc = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(heading).bold().size(40)))
        .add_table(DocxTable::new(rows));

    let mut buffer = Cursor::new(Vec::new());
    doc.build()
        .pack(&mut buffer)
        .map_err(|err| PubtallyError::Export(format!("unable to pack document: {err}")))?;
    Ok(buffer.into_inner())
}

fn text_cell(text: &str) -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalRecord, TableOrigin};
    use docx_rs::{DocumentChild, read_docx};

    #[test]
    fn test_document_has_heading_and_table() {
        let records = vec![CanonicalRecord::default().with_faculty("Ada")];
        let table = Table::from_records(&records, "Faculty Name", TableOrigin::Remote);

        let bytes = write_docx(&table, "Publication Records for Ada").unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let doc = read_docx(&bytes).unwrap();
        let children = &doc.document.children;
        assert!(matches!(children.first(), Some(DocumentChild::Paragraph(_))));
        assert!(children.iter().any(|c| matches!(c, DocumentChild::Table(_))));
    }
}
