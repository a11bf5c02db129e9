//! Merge/normalize stage: turns a parsed upload into the next working table.

use pubtally_core::{CanonicalRecord, ParsedUpload, Table, TableOrigin};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{LookupCache, LookupStatus};
use crate::sources::PublicationSource;

/// Per-name outcome of one ingest run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NameOutcome {
    pub faculty_name: String,
    pub records: usize,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub names: Vec<NameOutcome>,
    pub rows: usize,
    pub origin: TableOrigin,
}

impl IngestSummary {
    pub fn used_fallback(&self) -> bool {
        matches!(self.origin, TableOrigin::RawUpload { .. })
    }

    pub fn failed_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .filter(|n| n.error.is_some())
            .map(|n| n.faculty_name.as_str())
    }
}

pub struct IngestPipeline<S> {
    cache: LookupCache<S>,
}

impl<S: PublicationSource> IngestPipeline<S> {
    pub fn new(source: S) -> Self {
        Self {
            cache: LookupCache::new(source),
        }
    }

    pub fn cache(&self) -> &LookupCache<S> {
        &self.cache
    }

    /// Fetch every distinct faculty name, tag the records with it and concatenate.
    /// When no name yields anything the raw upload rows become the table instead.
    pub async fn run(&self, upload: &ParsedUpload) -> (Table, IngestSummary) {
        let names = upload.faculty_names();
        let faculty_column = upload.table.faculty_column().to_string();
        info!(names = names.len(), rows = upload.table.len(), "ingest started");

        let mut merged: Vec<CanonicalRecord> = Vec::new();
        let mut outcomes = Vec::with_capacity(names.len());

        for name in &names {
            let lookup = self.cache.fetch(name).await;
            let error = match &lookup.status {
                LookupStatus::Failed(msg) => Some(msg.clone()),
                _ => None,
            };
            debug!(faculty = %name, records = lookup.records.len(), status = ?lookup.status, "name resolved");

            merged.extend(
                lookup
                    .records
                    .iter()
                    .cloned()
                    .map(|r| r.with_faculty(name.as_str())),
            );
            outcomes.push(NameOutcome {
                faculty_name: name.clone(),
                records: lookup.records.len(),
                cached: lookup.status == LookupStatus::Cached,
                error,
            });
        }

        let mut table = if merged.is_empty() {
            let reason = if names.is_empty() {
                "upload lists no faculty names".to_string()
            } else {
                format!("no remote records for {} faculty name(s)", names.len())
            };
            warn!(%reason, rows = upload.table.len(), "falling back to raw upload");
            upload
                .table
                .clone()
                .with_origin(TableOrigin::RawUpload { reason })
        } else {
            Table::from_records(&merged, &faculty_column, TableOrigin::Remote)
        };
        table.normalize_years();

        let summary = IngestSummary {
            names: outcomes,
            rows: table.len(),
            origin: table.origin().clone(),
        };
        info!(rows = summary.rows, fallback = summary.used_fallback(), "ingest finished");
        (table, summary)
    }
}
