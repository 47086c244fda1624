//! # Roster Fetch Service
//!
//! Couples the generic [`ApiClient`] with the local logger for the roster
//! endpoints. One instance serves every roster path on the same upstream;
//! the caller picks the path per fetch, so the guest book and the sponsors
//! list share connection pooling and retry policy.

use crate::loggers::loggerlocal::LoggerLocal;
use crate::retrieve::api_client::{ApiClient, FetchError};
use crate::roster::records::ListRecord;
use std::sync::Arc;

/// Fetches roster rows and reports the failure taxonomy through the logger.
pub struct RosterService {
    /// Shared HTTP client with cache bypass and transient retries.
    client: ApiClient,
    /// Standardized local logger.
    logger: Arc<LoggerLocal>,
}

impl RosterService {
    /// Creates a new service around an already-configured client.
    pub fn new(client: ApiClient, logger: Arc<LoggerLocal>) -> Self {
        Self { client, logger }
    }

    /// Performs one cache-bypassing read of a roster endpoint.
    ///
    /// Rows come back in upstream order. Every failure kind is logged with
    /// its path before being handed back to the caller; nothing is
    /// swallowed.
    pub async fn fetch_roster(&self, path: &str) -> Result<Vec<ListRecord>, FetchError> {
        match self.client.get_json::<Vec<ListRecord>>(path).await {
            Ok(rows) => {
                self.logger
                    .debug(
                        &format!("Fetched {} roster rows from {}", rows.len(), path),
                        None,
                    )
                    .await;
                Ok(rows)
            }
            Err(err) => {
                let extras = serde_json::json!({ "path": path, "detail": err.to_string() });
                match &err {
                    FetchError::Unreachable(_) => {
                        self.logger
                            .warn(&format!("Roster endpoint {} unreachable", path), Some(extras))
                            .await;
                    }
                    FetchError::UpstreamRejected { status } => {
                        self.logger
                            .warn(
                                &format!("Roster endpoint {} rejected (HTTP {})", path, status),
                                Some(extras),
                            )
                            .await;
                    }
                    FetchError::ParseFailed(_) => {
                        // A malformed payload means the upstream contract broke,
                        // not a transient hiccup.
                        self.logger
                            .error(
                                &format!("Roster endpoint {} returned an unparseable payload", path),
                                Some(extras),
                            )
                            .await;
                    }
                }
                Err(err)
            }
        }
    }
}
