use crate::error::{PubtallyError, Result};
use crate::models::Table;

/// Inclusive year bounds, compared as real numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearRange {
    pub start: f64,
    pub end: f64,
}

impl YearRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Both bounds are required together; each must parse as a number.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let (Some(start), Some(end)) = (non_blank(start), non_blank(end)) else {
            return Err(PubtallyError::MissingParameter(
                "start year and end year must be provided".to_string(),
            ));
        };
        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }

    pub fn contains(&self, year: f64) -> bool {
        year >= self.start && year <= self.end
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| PubtallyError::InvalidYear(raw.to_string()))
}

/// Rows whose faculty cell equals `name` exactly. May be empty.
pub fn filter_by_faculty(table: &Table, name: &str) -> Table {
    table.select(|row| row.faculty() == Some(name))
}

/// Rows with a present year inside `range`. Missing or fractional years never match.
pub fn filter_by_year_range(table: &Table, range: &YearRange) -> Table {
    table.select(|row| row.year().is_some_and(|y| range.contains(f64::from(y))))
}
