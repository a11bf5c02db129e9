use std::time::Duration;

use async_trait::async_trait;
use pubtally_core::{CanonicalRecord, RemoteConfig, classify};
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, ScienceError};
use crate::http::RateLimitedClient;
use crate::sources::PublicationSource;

const AUTHOR_FIELDS: &str = "authorId,name";
const PAPER_FIELDS: &str = "title,authors,year,venue,journal";
const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct S2AuthorHit {
    pub author_id: String,
    pub name: String,
}

impl S2AuthorHit {
    pub fn from_json(v: &Value) -> Option<Self> {
        let author_id = v
            .get("authorId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_string();
        let name = v
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self { author_id, name })
    }
}

/// One entry of an author's paper list with the bibliographic fields we keep.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct S2Publication {
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    /// Journal name; `Some` only when the paper carries a named journal.
    pub journal: Option<String>,
}

impl S2Publication {
    pub fn from_json(v: &Value) -> Self {
        let title = v
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        let authors = v
            .get("authors")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|a| a.get("name").and_then(Value::as_str))
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let year = v
            .get("year")
            .and_then(Value::as_i64)
            .and_then(|n| i32::try_from(n).ok());

        let venue = non_empty_str(v.get("venue"));
        let journal = v
            .get("journal")
            .filter(|j| j.is_object())
            .and_then(|j| non_empty_str(j.get("name")));

        Self {
            title,
            authors,
            year,
            venue,
            journal,
        }
    }

    /// Same presence rule as BibTeX: a journal makes it Journal, else Conference.
    pub fn into_record(self) -> CanonicalRecord {
        let pub_type = classify(self.journal.is_some());
        CanonicalRecord {
            title: self.title,
            author: self.authors.join(", "),
            year: self.year.map(|y| y.to_string()).unwrap_or_default(),
            venue: self.journal.or(self.venue).unwrap_or_default(),
            pub_type,
            faculty_name: None,
        }
    }
}

pub struct SemanticScholarSource {
    client: RateLimitedClient,
    api_key: Option<String>,
    base_url: String,
    page_size: u32,
    max_publications: usize,
}

impl SemanticScholarSource {
    pub fn new(config: &RemoteConfig, api_key: Option<String>) -> Result<Self> {
        let min_interval = if api_key.is_some() {
            Duration::from_millis(100)
        } else {
            Duration::from_secs(1)
        };
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        let client = RateLimitedClient::new(min_interval, &config.user_agent, timeout)?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            page_size: config.page_size.max(1),
            max_publications: config.max_publications,
        })
    }

    /// First author profile matching `name`, if any.
    pub async fn search_author(&self, name: &str) -> Result<Option<S2AuthorHit>> {
        let mut url = self.endpoint(&["author", "search"])?;
        url.query_pairs_mut()
            .append_pair("query", name)
            .append_pair("fields", AUTHOR_FIELDS)
            .append_pair("limit", "1");

        let json: Value = self.client.get_json(url.as_str(), self.auth_headers()?).await?;
        Ok(json
            .get("data")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(S2AuthorHit::from_json))
    }

    /// The author's publication list, paged until exhausted or the cap is hit.
    pub async fn author_publications(&self, author_id: &str) -> Result<Vec<S2Publication>> {
        let mut out = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let mut url = self.endpoint(&["author", author_id, "papers"])?;
            url.query_pairs_mut()
                .append_pair("fields", PAPER_FIELDS)
                .append_pair("limit", &self.page_size.to_string())
                .append_pair("offset", &offset.to_string());

            let json: Value = self.client.get_json(url.as_str(), self.auth_headers()?).await?;
            let page = json
                .get("data")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    ScienceError::Parse("unexpected Semantic Scholar papers response".to_string())
                })?;
            out.extend(page.iter().map(S2Publication::from_json));

            if out.len() >= self.max_publications {
                out.truncate(self.max_publications);
                break;
            }
            match json.get("next").and_then(Value::as_u64) {
                Some(next) if next > offset && !page.is_empty() => offset = next,
                _ => break,
            }
        }

        Ok(out)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ScienceError::Parse(format!("invalid URL {}: {e}", self.base_url)))?;
        {
            let mut segs = url.path_segments_mut().map_err(|_| {
                ScienceError::Parse("invalid Semantic Scholar base URL".to_string())
            })?;
            segs.pop_if_empty();
            for seg in segments {
                segs.push(seg);
            }
        }
        Ok(url)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(key) = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let value =
                HeaderValue::from_str(key).map_err(|e| ScienceError::Parse(e.to_string()))?;
            headers.insert(API_KEY_HEADER, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl PublicationSource for SemanticScholarSource {
    fn name(&self) -> &str {
        "semantic_scholar"
    }

    async fn publications_for(&self, faculty_name: &str) -> Result<Vec<CanonicalRecord>> {
        let Some(author) = self.search_author(faculty_name).await? else {
            debug!(faculty = faculty_name, "no matching author profile");
            return Ok(Vec::new());
        };
        debug!(faculty = faculty_name, author_id = %author.author_id, "resolved author profile");

        let publications = self.author_publications(&author.author_id).await?;
        Ok(publications.into_iter().map(S2Publication::into_record).collect())
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}
