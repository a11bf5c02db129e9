//! The working table and every read operation over it.

use tracing::info;

use crate::config::ExportConfig;
use crate::error::{PubtallyError, Result};
use crate::export::{ExportFile, ExportFormat, Selection, export_table};
use crate::models::{Table, WorkingTable};
use crate::queries::{YearRange, filter_by_faculty, filter_by_year_range};
use crate::report::Report;

/// Owns the working table. Reports and exports short-circuit with
/// [`PubtallyError::NoData`] until an upload has populated it.
#[derive(Debug, Default)]
pub struct Session {
    state: WorkingTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_populated(&self) -> bool {
        self.state.is_populated()
    }

    /// Swap in a new table wholesale, returning the previous one.
    pub fn replace(&mut self, table: Table) -> Option<Table> {
        info!(rows = table.len(), origin = ?table.origin(), "working table replaced");
        match std::mem::replace(&mut self.state, WorkingTable::Populated(table)) {
            WorkingTable::Populated(old) => Some(old),
            WorkingTable::NoData => None,
        }
    }

    /// The current table; a populated-but-empty table counts as no data.
    pub fn table(&self) -> Result<&Table> {
        match &self.state {
            WorkingTable::Populated(table) if !table.is_empty() => Ok(table),
            _ => Err(PubtallyError::NoData),
        }
    }

    pub fn report(&self) -> Result<Report> {
        Ok(Report::build(self.table()?))
    }

    /// Rows covered by `selection`. An empty match is a no-data outcome.
    pub fn select(&self, selection: &Selection) -> Result<Table> {
        let table = self.table()?;
        match selection {
            Selection::All => Ok(table.clone()),
            Selection::Faculty(name) => {
                let picked = filter_by_faculty(table, name);
                if picked.is_empty() {
                    return Err(PubtallyError::NoDataForFaculty(name.clone()));
                }
                Ok(picked)
            }
            Selection::Years(range) => {
                let picked = filter_by_year_range(table, range);
                if picked.is_empty() {
                    return Err(PubtallyError::NoDataInRange {
                        start: range.start,
                        end: range.end,
                    });
                }
                Ok(picked)
            }
        }
    }

    pub fn export(
        &self,
        selection: &Selection,
        format: ExportFormat,
        config: &ExportConfig,
    ) -> Result<ExportFile> {
        let table = self.select(selection)?;
        export_table(&table, selection, format, config)
    }

    /// Export everything. `format` is the raw request value.
    pub fn export_all(&self, format: Option<&str>, config: &ExportConfig) -> Result<ExportFile> {
        let table = self.select(&Selection::All)?;
        let format = ExportFormat::parse(format)?;
        export_table(&table, &Selection::All, format, config)
    }

    /// Export one faculty member's rows.
    pub fn export_faculty(
        &self,
        faculty: Option<&str>,
        format: Option<&str>,
        config: &ExportConfig,
    ) -> Result<ExportFile> {
        self.table()?;
        let name = faculty
            .filter(|f| !f.is_empty())
            .ok_or_else(|| PubtallyError::MissingParameter("faculty name".to_string()))?;
        let selection = Selection::Faculty(name.to_string());
        let table = self.select(&selection)?;
        let format = ExportFormat::parse(format)?;
        export_table(&table, &selection, format, config)
    }

    /// Export rows in an inclusive year range.
    pub fn export_years(
        &self,
        start_year: Option<&str>,
        end_year: Option<&str>,
        format: Option<&str>,
        config: &ExportConfig,
    ) -> Result<ExportFile> {
        self.table()?;
        let selection = Selection::Years(YearRange::parse(start_year, end_year)?);
        let table = self.select(&selection)?;
        let format = ExportFormat::parse(format)?;
        export_table(&table, &selection, format, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalRecord, PublicationType, TableOrigin};

    fn populated() -> Session {
        let years = ["2017", "2018", "2019", "2021", ""];
        let records: Vec<_> = years
            .iter()
            .map(|y| {
                CanonicalRecord {
                    title: format!("t{y}"),
                    year: y.to_string(),
                    pub_type: PublicationType::Journal,
                    ..Default::default()
                }
                .with_faculty("Ada")
            })
            .collect();
        let mut session = Session::new();
        session.replace(Table::from_records(&records, "Faculty Name", TableOrigin::Remote));
        session
    }

    #[test]
    fn test_empty_session_rejects_every_entry_point() {
        let session = Session::new();
        let cfg = ExportConfig::default();

        assert!(matches!(session.report(), Err(PubtallyError::NoData)));
        assert!(matches!(session.export_all(None, &cfg), Err(PubtallyError::NoData)));
        assert!(matches!(
            session.export_faculty(Some("Ada"), None, &cfg),
            Err(PubtallyError::NoData)
        ));
        assert!(matches!(
            session.export_years(Some("2018"), Some("2020"), None, &cfg),
            Err(PubtallyError::NoData)
        ));
        // Bad parameters do not mask the empty state.
        assert!(matches!(
            session.export_years(None, None, Some("pdf"), &cfg),
            Err(PubtallyError::NoData)
        ));
        assert!(matches!(
            session.export(&Selection::All, ExportFormat::Word, &cfg),
            Err(PubtallyError::NoData)
        ));
    }

    #[test]
    fn test_replace_swaps_wholesale() {
        let mut session = populated();
        let one = vec![CanonicalRecord::default().with_faculty("Grace")];
        let previous = session.replace(Table::from_records(&one, "Faculty Name", TableOrigin::Remote));

        assert_eq!(previous.map(|t| t.len()), Some(5));
        assert_eq!(session.table().unwrap().len(), 1);
    }

    #[test]
    fn test_populated_but_empty_table_is_no_data() {
        let mut session = Session::new();
        session.replace(Table::from_records(&[], "Faculty Name", TableOrigin::Remote));
        assert!(session.is_populated());
        assert!(matches!(session.table(), Err(PubtallyError::NoData)));
    }

    #[test]
    fn test_unknown_faculty_is_no_data_outcome() {
        let session = populated();
        let err = session
            .select(&Selection::Faculty("Nobody".into()))
            .unwrap_err();
        assert!(err.is_no_data());
        assert!(matches!(err, PubtallyError::NoDataForFaculty(ref n) if n == "Nobody"));
    }

    #[test]
    fn test_year_selection() {
        let session = populated();
        let picked = session
            .select(&Selection::Years(YearRange::new(2018.0, 2020.0)))
            .unwrap();
        let years: Vec<_> = picked.iter().filter_map(|r| r.year()).collect();
        assert_eq!(years, vec![2018, 2019]);

        let err = session
            .select(&Selection::Years(YearRange::new(1990.0, 1991.0)))
            .unwrap_err();
        assert!(matches!(err, PubtallyError::NoDataInRange { .. }));
    }

    #[test]
    fn test_export_parameter_checks() {
        let session = populated();
        let cfg = ExportConfig::default();

        assert!(matches!(
            session.export_faculty(None, None, &cfg),
            Err(PubtallyError::MissingParameter(_))
        ));
        assert!(matches!(
            session.export_years(Some("2018"), None, None, &cfg),
            Err(PubtallyError::MissingParameter(_))
        ));
        assert!(matches!(
            session.export_years(Some("x"), Some("2020"), None, &cfg),
            Err(PubtallyError::InvalidYear(_))
        ));
        assert!(matches!(
            session.export_all(Some("pdf"), &cfg),
            Err(PubtallyError::UnsupportedExportFormat(_))
        ));
    }

    #[test]
    fn test_export_names_files_by_selection() {
        let session = populated();
        let cfg = ExportConfig::default();

        let all = session.export_all(None, &cfg).unwrap();
        assert_eq!(all.file_name, "publication_records.xlsx");
        assert!(!all.bytes.is_empty());

        let word = session
            .export_years(Some("2018"), Some("2020"), Some("word"), &cfg)
            .unwrap();
        assert_eq!(word.file_name, "publication_records_2018_2020.docx");

        let ada = session.export_faculty(Some("Ada"), Some("excel"), &cfg).unwrap();
        assert_eq!(ada.file_name, "publication_records_Ada.xlsx");
    }

    #[test]
    fn test_report_requires_data() {
        let session = populated();
        let report = session.report().unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.by_year.values().sum::<usize>(), 4);
    }
}
