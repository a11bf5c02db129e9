use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{Result, ScienceError};

// ─── RateLimitedClient ────────────────────────────────────────────────────────

/// GET-only JSON client that spaces requests by `min_interval`.
/// A failed request is returned as-is; nothing is retried.
pub struct RateLimitedClient {
    client: reqwest::Client,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimitedClient {
    pub fn new(min_interval: Duration, user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent).gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    async fn wait_for_rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub async fn get_with_headers(&self, url: &str, headers: HeaderMap) -> Result<String> {
        self.wait_for_rate_limit().await;
        let resp = self.client.get(url).headers(headers).send().await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScienceError::RateLimit(url.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScienceError::ApiError(
                url.to_string(),
                format!("HTTP {}: {body}", status.as_u16()),
            ));
        }
        Ok(resp.text().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, headers: HeaderMap) -> Result<T> {
        let text = self.get_with_headers(url, headers).await?;
        serde_json::from_str(&text).map_err(|e| ScienceError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/flaky")
            .with_status(503)
            .with_body("down")
            .expect(1)
            .create_async()
            .await;

        let client = RateLimitedClient::new(Duration::ZERO, "pubtally-test", None).unwrap();
        let err = client
            .get_with_headers(&format!("{}/flaky", server.url()), HeaderMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ScienceError::ApiError(_, ref msg) if msg.contains("503")));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_too_many_requests_maps_to_rate_limit() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/busy")
            .with_status(429)
            .create_async()
            .await;

        let client = RateLimitedClient::new(Duration::ZERO, "pubtally-test", None).unwrap();
        let err = client
            .get_with_headers(&format!("{}/busy", server.url()), HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScienceError::RateLimit(_)));
    }

    #[tokio::test]
    async fn test_get_json_parses_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value": 7}"#)
            .create_async()
            .await;

        let client = RateLimitedClient::new(Duration::ZERO, "pubtally-test", None).unwrap();
        let v: serde_json::Value = client
            .get_json(&format!("{}/ok", server.url()), HeaderMap::new())
            .await
            .unwrap();
        assert_eq!(v["value"], 7);
    }
}
