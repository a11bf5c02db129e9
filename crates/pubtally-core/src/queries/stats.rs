use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Table;

/// A value and how many rows carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    pub key: String,
    pub count: usize,
}

/// Rows per integer year. Rows without a usable year are left out, not counted as 0.
pub fn year_histogram(table: &Table) -> BTreeMap<i32, usize> {
    let mut buckets = BTreeMap::new();
    for year in table.iter().filter_map(|row| row.year()) {
        *buckets.entry(year).or_insert(0) += 1;
    }
    buckets
}

/// Tally of the `type` column over every row, year validity notwithstanding.
pub fn count_by_type(table: &Table) -> Vec<CountEntry> {
    value_counts(table.iter().filter_map(|row| row.pub_type()))
}

/// Tally of the faculty column over every row.
pub fn count_by_faculty(table: &Table) -> Vec<CountEntry> {
    value_counts(table.iter().filter_map(|row| row.faculty()))
}

/// Distinct faculty names in first-appearance order.
pub fn faculty_names(table: &Table) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in table.iter().filter_map(|row| row.faculty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Counts sorted by descending count; ties keep first-appearance order.
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CountEntry> {
    let mut out: Vec<CountEntry> = Vec::new();
    for value in values {
        match out.iter_mut().find(|e| e.key == value) {
            Some(entry) => entry.count += 1,
            None => out.push(CountEntry {
                key: value.to_string(),
                count: 1,
            }),
        }
    }
    // sort_by is stable, so equal counts stay in insertion order
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
