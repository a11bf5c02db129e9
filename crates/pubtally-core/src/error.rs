use thiserror::Error;

/// All errors that can occur in pubtally-core.
#[derive(Debug, Error)]
pub enum PubtallyError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid year format: {0}")]
    InvalidYear(String),

    #[error("Missing filter parameter: {0}")]
    MissingParameter(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    #[error("No data available. Please upload a file first.")]
    NoData,

    #[error("No data found for the specified faculty: {0}")]
    NoDataForFaculty(String),

    #[error("No data found for the specified duration: {start} to {end}")]
    NoDataInRange { start: f64, end: f64 },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("BibTeX parse error: {0}")]
    Bibtex(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// How an error should be surfaced to whoever called the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad upload or bad parameters. Shown to the user, never retried.
    InputRejection,
    /// Nothing matched. A "no data" notice rather than a failure.
    EmptyResult,
    Io,
    Config,
    Internal,
}

impl PubtallyError {
    pub fn kind(&self) -> ErrorKind {
        use PubtallyError::*;
        match self {
            UnsupportedFormat(_)
            | MissingColumn(_)
            | InvalidYear(_)
            | MissingParameter(_)
            | UnsupportedExportFormat(_)
            | Spreadsheet(_)
            | Bibtex(_) => ErrorKind::InputRejection,
            NoData | NoDataForFaculty(_) | NoDataInRange { .. } => ErrorKind::EmptyResult,
            Io(_) => ErrorKind::Io,
            ConfigError(_) | TomlParse(_) | TomlSerialize(_) => ErrorKind::Config,
            Export(_) => ErrorKind::Internal,
        }
    }

    /// True for the "nothing to show" family of outcomes.
    pub fn is_no_data(&self) -> bool {
        self.kind() == ErrorKind::EmptyResult
    }
}

/// Exit codes used by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    GeneralError = 1,
    NoData = 2,
    InvalidInput = 3,
    FileSystemError = 4,
    NetworkError = 6,
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InputRejection => ExitCode::InvalidInput,
            ErrorKind::EmptyResult => ExitCode::NoData,
            ErrorKind::Io => ExitCode::FileSystemError,
            ErrorKind::Config | ErrorKind::Internal => ExitCode::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, PubtallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_family() {
        assert!(PubtallyError::NoData.is_no_data());
        assert!(PubtallyError::NoDataForFaculty("Ada".into()).is_no_data());
        assert!(PubtallyError::NoDataInRange { start: 2018.0, end: 2020.0 }.is_no_data());
        assert!(!PubtallyError::UnsupportedFormat("txt".into()).is_no_data());
    }

    #[test]
    fn test_every_error_kind_exits_nonzero() {
        for kind in [
            ErrorKind::InputRejection,
            ErrorKind::EmptyResult,
            ErrorKind::Io,
            ErrorKind::Config,
            ErrorKind::Internal,
        ] {
            assert_ne!(ExitCode::from(kind) as i32, 0, "{kind:?}");
        }
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            ExitCode::from(PubtallyError::MissingColumn("Faculty Name".into()).kind()),
            ExitCode::InvalidInput
        );
        assert_eq!(ExitCode::from(PubtallyError::NoData.kind()), ExitCode::NoData);
    }

    #[test]
    fn test_no_data_message_asks_for_upload() {
        assert!(PubtallyError::NoData.to_string().contains("upload a file first"));
    }
}
