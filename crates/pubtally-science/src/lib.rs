//! pubtally science: remote author lookup, the lookup cache and the ingest
//! pipeline that turns an upload into the working table.

pub mod cache;
pub mod error;
pub mod http;
pub mod ingest;
pub mod sources;
pub mod workspace;

pub use cache::{Lookup, LookupCache, LookupStatus};
pub use error::{Result, ScienceError};
pub use http::RateLimitedClient;
pub use ingest::{IngestPipeline, IngestSummary, NameOutcome};
pub use sources::{PublicationSource, SemanticScholarSource};
pub use workspace::Workspace;
