//! BetterAirport API client
//!
//! Implements both source capabilities against the hosted API:
//! `GET /token` with `x-api-user`/`x-api-key` headers, then
//! `GET /forecast/scheduleFlights/{yyyy-MM-dd}` with the bearer token.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::traits::{Authenticator, ScheduleFetcher, ScheduleRequest};
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::models::{Credential, Flight, Token};

const API_USER_HEADER: &str = "x-api-user";
const API_KEY_HEADER: &str = "x-api-key";
const ERROR_BODY_PREVIEW: usize = 200;

/// HTTP client for the BetterAirport forecast API
pub struct BetterAirportClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl BetterAirportClient {
    /// Create a client rooted at `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::configuration(format!("api.base_url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "api.base_url '{base_url}' cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Spot-Saver/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn describe_transport_error(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("request timed out after {}s", self.timeout.as_secs())
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        }
    }

    /// Status plus the start of the body, for non-success responses
    async fn describe_failure(response: Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body = body.trim();
        if body.is_empty() {
            format!("server returned {status}")
        } else {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW).collect();
            format!("server returned {status}: {preview}")
        }
    }
}

#[async_trait]
impl Authenticator for BetterAirportClient {
    async fn authenticate(&self, credential: &Credential) -> SourceResult<Token> {
        let url = self.endpoint(&["token"]);
        debug!("Requesting API token from {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(API_USER_HEADER, &credential.user)
            .header(API_KEY_HEADER, &credential.key)
            .send()
            .await
            .map_err(|e| SourceError::authentication(None, self.describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::describe_failure(response).await;
            warn!("Token request to {} failed: {}", url, message);
            return Err(SourceError::authentication(Some(status.as_u16()), message));
        }

        let body = response.bytes().await.map_err(|e| {
            SourceError::authentication(None, format!("failed to read token response: {e}"))
        })?;
        let token: Token = serde_json::from_slice(&body)
            .map_err(|e| SourceError::response_parse(url.as_str(), e.to_string()))?;

        if token.access_token.is_empty() {
            warn!("Token endpoint returned an empty access token");
        }
        info!(
            "Authenticated as '{}' (token expires in {}s)",
            credential.user, token.expires_in_seconds
        );
        Ok(token)
    }
}

#[async_trait]
impl ScheduleFetcher for BetterAirportClient {
    async fn fetch_schedule(
        &self,
        token: &Token,
        request: &ScheduleRequest,
    ) -> SourceResult<Vec<Flight>> {
        let mut url = self.endpoint(&["forecast", "scheduleFlights", &request.iso_date()]);
        if let Some(code) = &request.airport {
            url.query_pairs_mut().append_pair("airport", code);
        }
        debug!("Fetching flight schedule from {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| {
                SourceError::schedule_fetch(
                    None,
                    url.as_str(),
                    request.scope(),
                    self.describe_transport_error(&e),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::describe_failure(response).await;
            return Err(SourceError::schedule_fetch(
                Some(status.as_u16()),
                url.as_str(),
                request.scope(),
                message,
            ));
        }

        let body = response.bytes().await.map_err(|e| {
            SourceError::schedule_fetch(
                None,
                url.as_str(),
                request.scope(),
                format!("failed to read response body: {e}"),
            )
        })?;

        // The API answers `null` rather than `[]` on quiet days
        let flights: Option<Vec<Flight>> = serde_json::from_slice(&body)
            .map_err(|e| SourceError::response_parse(url.as_str(), e.to_string()))?;
        let flights = flights.unwrap_or_default();

        debug!(
            "Schedule endpoint returned {} flights ({} bytes)",
            flights.len(),
            body.len()
        );
        Ok(flights)
    }
}
