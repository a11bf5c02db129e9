//! Upload parsers: spreadsheets and BibTeX files into a parsed [`Table`].

pub mod bibtex;
pub mod spreadsheet;

use std::path::Path;

use tracing::debug;

use crate::config::DEFAULT_FACULTY_COLUMN;
use crate::error::{PubtallyError, Result};
use crate::models::{Table, TableOrigin};

pub use bibtex::{parse_bibtex, parse_bibtex_file};
pub use spreadsheet::read_spreadsheet;

/// Upload kinds recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Spreadsheet,
    Bibtex,
}

impl UploadFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            "bib" => Some(Self::Bibtex),
            _ => None,
        }
    }

    /// Detect from a file name, rejecting anything unsupported before it is opened.
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_extension(&ext).ok_or_else(|| {
            PubtallyError::UnsupportedFormat(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Name of the column holding faculty names.
    pub faculty_column: String,
    /// Faculty name for BibTeX entries that carry no `faculty` field.
    pub default_faculty: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            faculty_column: DEFAULT_FACULTY_COLUMN.to_string(),
            default_faculty: None,
        }
    }
}

/// A parsed upload, before any remote lookup.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub format: UploadFormat,
    pub table: Table,
}

impl ParsedUpload {
    /// Distinct non-blank faculty names, in order of first appearance.
    pub fn faculty_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in self.table.iter() {
            let Some(name) = row.faculty() else {
                continue;
            };
            if name.trim().is_empty() || names.iter().any(|n| n == name) {
                continue;
            }
            names.push(name.to_string());
        }
        names
    }
}

/// Parse an uploaded file into a table carrying a faculty column.
pub fn parse_upload(path: &Path, options: &UploadOptions) -> Result<ParsedUpload> {
    let format = UploadFormat::detect(path)?;
    debug!(path = %path.display(), ?format, "parsing upload");

    let table = match format {
        UploadFormat::Spreadsheet => {
            let table = read_spreadsheet(path, &options.faculty_column)?;
            if table.column_index(&options.faculty_column).is_none() {
                return Err(PubtallyError::MissingColumn(options.faculty_column.clone()));
            }
            table
        }
        UploadFormat::Bibtex => {
            let records = parse_bibtex_file(path)?;
            let mut tagged = Vec::with_capacity(records.len());
            for entry in records {
                let faculty = entry
                    .faculty
                    .or_else(|| options.default_faculty.clone())
                    .ok_or_else(|| PubtallyError::MissingColumn(options.faculty_column.clone()))?;
                tagged.push(entry.record.with_faculty(faculty));
            }
            Table::from_records(&tagged, &options.faculty_column, TableOrigin::Parsed)
        }
    };

    Ok(ParsedUpload { format, table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const BIB: &str = r#"
@article{a1,
  title = {Deep Things},
  author = {Lovelace, Ada and Hopper, Grace},
  year = {2019},
  journal = {Journal of Things}
}
@inproceedings{c1,
  title = {Shallow Things},
  author = {Hopper, Grace},
  year = {2020},
  booktitle = {Proc. of Things},
  faculty = {Grace Hopper}
}
"#;

    #[test]
    fn test_detect_formats() {
        assert_eq!(UploadFormat::detect(Path::new("x.xlsx")).unwrap(), UploadFormat::Spreadsheet);
        assert_eq!(UploadFormat::detect(Path::new("x.XLS")).unwrap(), UploadFormat::Spreadsheet);
        assert_eq!(UploadFormat::detect(Path::new("refs.bib")).unwrap(), UploadFormat::Bibtex);
        assert!(matches!(
            UploadFormat::detect(Path::new("notes.csv")),
            Err(PubtallyError::UnsupportedFormat(_))
        ));
        assert!(UploadFormat::detect(Path::new("noext")).is_err());
    }

    #[test]
    fn test_unsupported_file_is_not_opened() {
        // The file does not exist; rejection must happen on the extension alone.
        let err = parse_upload(Path::new("/nonexistent/upload.docx"), &UploadOptions::default())
            .unwrap_err();
        assert!(matches!(err, PubtallyError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_bibtex_upload_uses_entry_faculty_then_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, BIB).unwrap();

        let options = UploadOptions {
            default_faculty: Some("Ada Lovelace".into()),
            ..Default::default()
        };
        let parsed = parse_upload(&path, &options).unwrap();
        assert_eq!(parsed.format, UploadFormat::Bibtex);
        assert_eq!(parsed.table.len(), 2);
        assert_eq!(parsed.faculty_names(), vec!["Ada Lovelace", "Grace Hopper"]);
    }

    #[test]
    fn test_bibtex_upload_without_faculty_fails_fast() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("refs.bib");
        fs::write(&path, BIB).unwrap();

        let err = parse_upload(&path, &UploadOptions::default()).unwrap_err();
        assert!(matches!(err, PubtallyError::MissingColumn(ref c) if c == "Faculty Name"));
    }
}
