//! pubtally core: canonical publication records, upload parsers, the working
//! table and the queries, reports and exports built on it.

pub mod config;
pub mod error;
pub mod export;
pub mod formats;
pub mod models;
pub mod queries;
pub mod report;
pub mod session;

pub use config::{AppConfig, DEFAULT_FACULTY_COLUMN, ExportConfig, RemoteConfig, UploadConfig};
pub use error::{ErrorKind, ExitCode, PubtallyError, Result};
pub use export::{ExportFile, ExportFormat, Selection};
pub use formats::{
    ParsedUpload, UploadFormat, UploadOptions, parse_bibtex, parse_upload, read_spreadsheet,
};
pub use models::*;
pub use queries::{
    CountEntry, YearRange, count_by_faculty, count_by_type, filter_by_faculty,
    filter_by_year_range, year_histogram,
};
pub use report::Report;
pub use session::Session;
