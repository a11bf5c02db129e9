use async_trait::async_trait;
use pubtally_core::CanonicalRecord;

use crate::error::Result;

/// A remote service that resolves a person's name to their publications.
#[async_trait]
pub trait PublicationSource: Send + Sync {
    fn name(&self) -> &str;

    /// Publications of the first author profile matching `faculty_name`.
    /// `Ok` with an empty list means no author matched.
    async fn publications_for(&self, faculty_name: &str) -> Result<Vec<CanonicalRecord>>;
}

pub mod semantic_scholar;

pub use semantic_scholar::SemanticScholarSource;
