//! # HTTP Retrieval Utilities
//!
//! This module provides a robust, asynchronous API client wrapper around `reqwest`.
//! It includes middleware support for exponential backoff retries, cache-bypassing
//! request headers, and a typed error taxonomy for the three ways a remote read
//! can fail.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout. The upstream does not document one, so a
/// conservative value is used; expiry surfaces as [`FetchError::Unreachable`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How a remote read failed.
///
/// Every failure is reported to the caller; nothing is swallowed. The
/// `Display` strings double as the short human-readable messages shown next
/// to the retry affordance.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: connect error, timeout, or interrupted body.
    #[error("upstream endpoint unreachable: {0}")]
    Unreachable(String),

    /// The upstream answered with a non-success HTTP status.
    #[error("upstream rejected the request (HTTP {status})")]
    UpstreamRejected {
        /// The numeric HTTP status code returned by the server.
        status: u16,
    },

    /// The body arrived but was not the expected JSON shape.
    #[error("upstream payload could not be parsed: {0}")]
    ParseFailed(String),
}

/// A flexible asynchronous HTTP client.
///
/// Built on top of `reqwest_middleware`, it handles base URLs, cache-bypass
/// headers, bounded timeouts, and automatic retries for transient failures.
/// Retries happen inside a single logical fetch; a settled failure is always
/// reported to the caller.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new `ApiClient` with the default timeout and retry policy.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "http://127.0.0.1:3000/").
    ///
    /// # Panics
    /// Panics if the `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str) -> Self {
        Self::with_policy(base_url, DEFAULT_TIMEOUT, 3)
    }

    /// Creates a new `ApiClient` with an explicit timeout and retry budget.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API.
    /// * `timeout` - Per-request deadline; expiry maps to `FetchError::Unreachable`.
    /// * `max_retries` - Transient-retry budget for the backoff middleware.
    ///
    /// # Panics
    /// Panics if the `base_url` is not a valid absolute URL.
    pub fn with_policy(base_url: &str, timeout: Duration, max_retries: u32) -> Self {
        // Parse the base URL to ensure it is valid and absolute
        let url = Url::parse(base_url).expect("Invalid Base URL (must be absolute)");

        // Configure an exponential backoff policy for transient failures
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        // Construct the client with a bounded timeout and the retry middleware
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .timeout(timeout)
                .user_agent("RosterWatch/1.0")
                .build()
                .unwrap_or_default(), // Fallback to a default client if builder fails.
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Self {
            inner: client,
            base_url: url,
        }
    }

    /// Performs a cache-bypassing GET request and deserializes the JSON body.
    ///
    /// The upstream store is edited out-of-band (a spreadsheet maintained by
    /// the event organizers), so every request demands fresh data via
    /// `cache-control: no-cache` / `pragma: no-cache`.
    ///
    /// # Arguments
    /// * `path` - The relative path to append to the base URL.
    ///
    /// # Errors
    /// * `FetchError::Unreachable` - connect failure, timeout, or body read failure.
    /// * `FetchError::UpstreamRejected` - non-2xx HTTP status.
    /// * `FetchError::ParseFailed` - body was not valid JSON of the target type.
    pub async fn get_json<T>(&self, path: &str) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        // 1. Construct the full absolute URL
        let full_url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::Unreachable(format!("invalid path '{}': {}", path, e)))?;

        // 2. Execute the request with cache-bypass headers
        let response = self
            .inner
            .get(full_url)
            .headers(Self::no_cache_headers())
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        // 3. Reject non-success statuses outright
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamRejected {
                status: status.as_u16(),
            });
        }

        // 4. Read the body, then parse separately so a malformed payload is
        //    distinguishable from a broken connection
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        serde_json::from_str::<T>(&body).map_err(|e| FetchError::ParseFailed(e.to_string()))
    }

    /// Internal helper to construct the cache-bypass headers.
    fn no_cache_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();

        let header_list = [
            ("accept", "application/json, text/plain, */*"),
            ("cache-control", "no-cache"),
            ("pragma", "no-cache"),
        ];

        for (name, value) in header_list {
            if let (Ok(h_name), Ok(h_value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(h_name, h_value);
            }
        }

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Spawns a single-shot HTTP server on a random local port and returns
    /// its base URL. The server answers every connection with `response`.
    fn mock_server(response: &'static str, hits: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for _ in 0..hits {
                if let Ok((mut stream, _)) = listener.accept() {
                    let mut buf = [0u8; 2048];
                    let _ = stream.read(&mut buf);
                    let _ = stream.write_all(response.as_bytes());
                }
            }
        });

        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn parses_a_json_record_array() {
        let base = mock_server(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 35\r\nconnection: close\r\n\r\n[{\"Name\":\"A\"},{\"Name\":\"B\",\"X\":1}]  ",
            1,
        );

        let client = ApiClient::with_policy(&base, Duration::from_secs(2), 0);
        let rows: Vec<serde_json::Value> = client.get_json("api/guests").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Name"], "A");
    }

    #[tokio::test]
    async fn non_success_status_is_upstream_rejected() {
        let base = mock_server(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            1,
        );

        let client = ApiClient::with_policy(&base, Duration::from_secs(2), 0);
        let err = client
            .get_json::<Vec<serde_json::Value>>("api/guests")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::UpstreamRejected { status: 500 }
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_failed() {
        let base = mock_server(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 15\r\nconnection: close\r\n\r\n<html>no</html>",
            1,
        );

        let client = ApiClient::with_policy(&base, Duration::from_secs(2), 0);
        let err = client
            .get_json::<Vec<serde_json::Value>>("api/guests")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ParseFailed(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        // Bind then immediately drop to obtain a port nothing listens on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = ApiClient::with_policy(
            &format!("http://127.0.0.1:{}/", port),
            Duration::from_secs(2),
            0,
        );
        let err = client
            .get_json::<Vec<serde_json::Value>>("api/guests")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)));
    }
}
