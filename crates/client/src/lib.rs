//! Dashboard Client Crate
//!
//! The refresh lifecycle behind the market dashboard, and the session gate
//! that switches it on and off.
//!
//! - [`MarketDataClient`] - timeout, retry, merge by symbol, interval timer
//! - [`ClientState`] - snapshot published to the presentation layer
//! - [`Session`] / [`bind_session`] - identity, and the client bound to it
//! - [`HttpQuoteSource`] / [`FirebaseIdentityProvider`] - production adapters

pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod firebase;
pub mod session;
pub mod source;
pub mod state;

pub use client::{MarketDataClient, RefreshOutcome};
pub use config::RefreshConfig;
pub use errors::FetchError;
pub use firebase::FirebaseIdentityProvider;
pub use session::{bind_session, AuthError, IdentityProvider, Session, User};
pub use source::{HttpQuoteSource, QuoteSource};
pub use state::{ClientState, TrackedInstrument};
