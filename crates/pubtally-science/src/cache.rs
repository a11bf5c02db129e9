use std::collections::HashMap;
use std::sync::Arc;

use pubtally_core::CanonicalRecord;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::sources::PublicationSource;

// ─── LookupCache ──────────────────────────────────────────────────────────────

/// How a [`Lookup`] was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    Cached,
    Fetched,
    /// The source answered but had nothing for this name. Memoized.
    NotFound,
    /// The source failed. Not memoized, so the next lookup retries.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub records: Arc<Vec<CanonicalRecord>>,
    pub status: LookupStatus,
}

impl Lookup {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-process memo of remote lookups keyed by normalized faculty name.
///
/// The map lock is held across the fetch so a name is never requested twice,
/// even when uploads race.
pub struct LookupCache<S> {
    source: S,
    entries: Mutex<HashMap<String, Arc<Vec<CanonicalRecord>>>>,
}

impl<S: PublicationSource> LookupCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn fetch(&self, faculty_name: &str) -> Lookup {
        let key = cache_key(faculty_name);
        let mut entries = self.entries.lock().await;

        if let Some(records) = entries.get(&key) {
            debug!(faculty = faculty_name, hits = records.len(), "lookup cache hit");
            return Lookup {
                records: Arc::clone(records),
                status: LookupStatus::Cached,
            };
        }

        match self.source.publications_for(faculty_name).await {
            Ok(records) => {
                let status = if records.is_empty() {
                    LookupStatus::NotFound
                } else {
                    LookupStatus::Fetched
                };
                let records = Arc::new(records);
                entries.insert(key, Arc::clone(&records));
                debug!(
                    faculty = faculty_name,
                    source = self.source.name(),
                    count = records.len(),
                    "lookup stored"
                );
                Lookup { records, status }
            }
            Err(err) => {
                warn!(faculty = faculty_name, source = self.source.name(), error = %err, "lookup failed");
                Lookup {
                    records: Arc::new(Vec::new()),
                    status: LookupStatus::Failed(err.to_string()),
                }
            }
        }
    }

    /// Drop one memoized name. Returns whether it was present.
    pub async fn invalidate(&self, faculty_name: &str) -> bool {
        self.entries
            .lock()
            .await
            .remove(&cache_key(faculty_name))
            .is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Case-folded, whitespace-collapsed form of a faculty name.
pub fn cache_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
