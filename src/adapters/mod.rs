//! Concrete implementations of the capability traits.
//!
//! # Adapters
//!
//! - [`SystemClock`] - Device wall clock via chrono
//! - [`HttpTicketFetcher`] - Ticket issuer over HTTP using reqwest
//! - [`SimulatedTicketFetcher`] - In-process issuer for demos
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles and in-memory devices.

pub mod http_fetcher;
pub mod mock;
pub mod simulated_fetcher;
pub mod system_clock;

pub use http_fetcher::{parse_ticket_response, HttpTicketFetcher};
pub use mock::{InMemoryBrightness, InMemoryCaptureGuard, ManualLifecycle, MockClock, MockFetcher};
pub use simulated_fetcher::SimulatedTicketFetcher;
pub use system_clock::SystemClock;
