//! Reqwest-based ticket issuer adapter.
//!
//! Requests a ticket as JSON from a configured endpoint. Accepts both the
//! compact field names (`id`, `issuedForSeconds`) and the issuer's legacy
//! names (`ticketId`, `validSeconds`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::ControllerConfig;
use crate::error::FetchError;
use crate::models::{deserialize_id, Ticket};
use crate::traits::CredentialFetcher;

/// Wire shape of the issuer response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketResponse {
    #[serde(alias = "ticketId", deserialize_with = "deserialize_id")]
    id: String,
    signature: String,
    #[serde(alias = "validSeconds")]
    issued_for_seconds: u32,
    expires_at: i64,
}

impl From<TicketResponse> for Ticket {
    fn from(response: TicketResponse) -> Self {
        Ticket::new(
            response.id,
            response.signature,
            response.issued_for_seconds,
            response.expires_at,
        )
    }
}

/// Parse an issuer response body into a ticket.
pub fn parse_ticket_response(body: &str) -> Result<Ticket, FetchError> {
    let response: TicketResponse =
        serde_json::from_str(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    if response.id.trim().is_empty() {
        return Err(FetchError::InvalidResponse("empty ticket id".to_string()));
    }
    if response.signature.trim().is_empty() {
        return Err(FetchError::InvalidResponse("empty signature".to_string()));
    }

    Ok(response.into())
}

/// Ticket issuer reached over HTTP.
///
/// # Example
///
/// ```ignore
/// use ticketpass::adapters::HttpTicketFetcher;
///
/// let fetcher = HttpTicketFetcher::new("https://tickets.example.com/v1/ticket")?
///     .with_auth_token("token");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTicketFetcher {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpTicketFetcher {
    /// Create a fetcher with the default 10 second timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, Duration::from_secs(10))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            auth_token: None,
        })
    }

    /// Build from config; `None` when no endpoint is configured.
    pub fn from_config(config: &ControllerConfig) -> Option<Result<Self, FetchError>> {
        let endpoint = config.endpoint.clone()?;
        let fetcher = Self::with_timeout(endpoint, config.request_timeout).map(|fetcher| {
            match config.auth_token {
                Some(ref token) => fetcher.with_auth_token(token.clone()),
                None => fetcher,
            }
        });
        Some(fetcher)
    }

    /// Send a bearer token with every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Convert reqwest error to FetchError.
    fn convert_error(err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_decode() {
            FetchError::InvalidResponse(err.to_string())
        } else {
            FetchError::Connection(err.to_string())
        }
    }

    async fn request(&self) -> Result<Ticket, FetchError> {
        let mut builder = self.client.get(&self.endpoint);
        if let Some(ref token) = self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(Self::convert_error)?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(Self::convert_error)?;
        parse_ticket_response(&body)
    }
}

#[async_trait]
impl CredentialFetcher for HttpTicketFetcher {
    async fn fetch(&self, cancel: CancellationToken) -> Result<Ticket, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Ticket request to {} cancelled", self.endpoint);
                Err(FetchError::Cancelled)
            }
            result = self.request() => result,
        }
    }
}
