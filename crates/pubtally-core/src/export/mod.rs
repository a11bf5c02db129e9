//! Spreadsheet and word-processor exports of the working table.

pub mod docx;
pub mod xlsx;

use std::str::FromStr;

use crate::config::ExportConfig;
use crate::error::{PubtallyError, Result};
use crate::models::Table;
use crate::queries::YearRange;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Excel,
    Word,
}

impl ExportFormat {
    /// Absent means Excel; anything unrecognized is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(Self::default()),
            Some(s) => s.parse(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Word => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PubtallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "excel" => Ok(Self::Excel),
            "word" => Ok(Self::Word),
            _ => Err(PubtallyError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

/// Which rows an export covers.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    Faculty(String),
    Years(YearRange),
}

impl Selection {
    pub fn heading(&self, base: &str) -> String {
        match self {
            Selection::All => base.to_string(),
            Selection::Faculty(name) => format!("{base} for {name}"),
            Selection::Years(r) => format!("{base} from {} to {}", r.start, r.end),
        }
    }

    /// Always a single path component; the faculty name is made file-safe.
    pub fn file_stem(&self) -> String {
        match self {
            Selection::All => "publication_records".to_string(),
            Selection::Faculty(name) => format!("publication_records_{}", file_safe(name)),
            Selection::Years(r) => format!("publication_records_{}_{}", r.start, r.end),
        }
    }
}

/// Replace path separators, control characters and the characters Windows
/// forbids in file names with `_`. Non-ASCII letters are kept.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// An encoded export ready to be written or sent.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode `table` (already filtered for `selection`) in `format`.
pub fn export_table(
    table: &Table,
    selection: &Selection,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<ExportFile> {
    let bytes = match format {
        ExportFormat::Excel => xlsx::write_xlsx(table, &config.sheet_name)?,
        ExportFormat::Word => docx::write_docx(table, &selection.heading(&config.heading))?,
    };
    Ok(ExportFile {
        file_name: format!("{}.{}", selection.file_stem(), format.extension()),
        mime_type: format.mime_type(),
        bytes,
    })
}
