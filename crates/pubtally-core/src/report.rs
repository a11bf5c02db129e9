use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Table, TableOrigin};
use crate::queries::{CountEntry, count_by_faculty, count_by_type, faculty_names, year_histogram};

/// The three chart payloads plus what a faculty picker needs.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub total: usize,
    pub origin: TableOrigin,
    pub by_year: BTreeMap<i32, usize>,
    pub by_type: Vec<CountEntry>,
    pub by_faculty: Vec<CountEntry>,
    pub faculties: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn build(table: &Table) -> Self {
        Self {
            total: table.len(),
            origin: table.origin().clone(),
            by_year: year_histogram(table),
            by_type: count_by_type(table),
            by_faculty: count_by_faculty(table),
            faculties: faculty_names(table),
            generated_at: Utc::now(),
        }
    }
}
