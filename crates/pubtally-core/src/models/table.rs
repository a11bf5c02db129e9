use serde::{Deserialize, Serialize};

use super::record::{CanonicalRecord, parse_year};

pub const TITLE_COLUMN: &str = "title";
pub const AUTHOR_COLUMN: &str = "author";
pub const YEAR_COLUMN: &str = "year";
pub const VENUE_COLUMN: &str = "venue";
pub const TYPE_COLUMN: &str = "type";

/// Where the rows of a [`Table`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableOrigin {
    /// Freshly parsed upload, not merged yet.
    Parsed,
    /// Canonical records fetched from the remote lookup, one group per faculty name.
    Remote,
    /// The parsed upload itself, kept because no faculty name resolved remotely.
    RawUpload { reason: String },
}

/// Rectangular string table. Cells are kept verbatim so non-ASCII text and odd
/// spreadsheet values pass through untouched; numeric meaning is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    faculty_column: String,
    origin: TableOrigin,
}

impl Table {
    /// Build a table, padding or truncating rows to the header width.
    pub fn new(
        columns: Vec<String>,
        mut rows: Vec<Vec<String>>,
        faculty_column: impl Into<String>,
        origin: TableOrigin,
    ) -> Self {
        let width = columns.len();
        for row in rows.iter_mut() {
            row.resize(width, String::new());
        }
        Self {
            columns,
            rows,
            faculty_column: faculty_column.into(),
            origin,
        }
    }

    /// Canonical column layout: title, author, year, venue, type, then the faculty column.
    pub fn canonical_columns(faculty_column: &str) -> Vec<String> {
        vec![
            TITLE_COLUMN.to_string(),
            AUTHOR_COLUMN.to_string(),
            YEAR_COLUMN.to_string(),
            VENUE_COLUMN.to_string(),
            TYPE_COLUMN.to_string(),
            faculty_column.to_string(),
        ]
    }

    pub fn from_records(
        records: &[CanonicalRecord],
        faculty_column: &str,
        origin: TableOrigin,
    ) -> Self {
        let rows = records
            .iter()
            .map(|r| {
                vec![
                    r.title.clone(),
                    r.author.clone(),
                    r.year.clone(),
                    r.venue.clone(),
                    r.pub_type.to_string(),
                    r.faculty_name.clone().unwrap_or_default(),
                ]
            })
            .collect();
        Self::new(
            Self::canonical_columns(faculty_column),
            rows,
            faculty_column,
            origin,
        )
    }

    pub fn with_origin(mut self, origin: TableOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn origin(&self) -> &TableOrigin {
        &self.origin
    }

    pub fn faculty_column(&self) -> &str {
        &self.faculty_column
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        let year = self.column_index(YEAR_COLUMN);
        let kind = self.column_index(TYPE_COLUMN);
        let faculty = self.column_index(&self.faculty_column);
        self.rows.iter().map(move |cells| RowView {
            cells,
            year,
            kind,
            faculty,
        })
    }

    /// Blank year cells become empty strings, i.e. missing.
    pub fn normalize_years(&mut self) {
        let Some(idx) = self.column_index(YEAR_COLUMN) else {
            return;
        };
        for row in self.rows.iter_mut() {
            if row[idx].trim().is_empty() {
                row[idx].clear();
            }
        }
    }

    /// Rows matching `keep`, same columns and origin, original order.
    pub fn select<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|row| keep(row))
            .map(|row| row.cells.to_vec())
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
            faculty_column: self.faculty_column.clone(),
            origin: self.origin.clone(),
        }
    }
}

/// Borrowed view of a single row with the well-known columns resolved.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    cells: &'a [String],
    year: Option<usize>,
    kind: Option<usize>,
    faculty: Option<usize>,
}

impl<'a> RowView<'a> {
    /// The row's year, if its cell holds a whole number. Histogram and range
    /// filter both read years through here, so `2019.5` is missing for each.
    pub fn year(&self) -> Option<i32> {
        self.year.and_then(|i| parse_year(&self.cells[i]))
    }

    pub fn pub_type(&self) -> Option<&'a str> {
        self.kind.map(|i| self.cells[i].as_str())
    }

    pub fn faculty(&self) -> Option<&'a str> {
        self.faculty.map(|i| self.cells[i].as_str())
    }
}

/// The session's table: nothing uploaded yet, or the most recent successful upload.
#[derive(Debug, Clone, Default)]
pub enum WorkingTable {
    #[default]
    NoData,
    Populated(Table),
}

impl WorkingTable {
    pub fn is_populated(&self) -> bool {
        matches!(self, WorkingTable::Populated(_))
    }
}
