//! Ticket issuance abstraction.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::models::Ticket;

/// Issues one ticket per call.
///
/// Implementations must observe `cancel` and return promptly with
/// [`FetchError::Cancelled`] once it fires. A result that arrives after
/// cancellation anyway is discarded by the controller.
///
/// # Example
///
/// ```ignore
/// use ticketpass::traits::CredentialFetcher;
///
/// async fn once<F: CredentialFetcher>(fetcher: &F) {
///     let token = CancellationToken::new();
///     match fetcher.fetch(token.clone()).await {
///         Ok(ticket) => println!("expires at {}", ticket.expires_at),
///         Err(e) => eprintln!("fetch failed: {}", e),
///     }
/// }
/// ```
#[async_trait]
pub trait CredentialFetcher: Send + Sync {
    /// Fetch a fresh ticket.
    async fn fetch(&self, cancel: CancellationToken) -> Result<Ticket, FetchError>;
}
