//! Provider orchestration.
//!
//! - [`ProviderChain`]: ordered fallback across quote providers

mod provider_chain;

pub use provider_chain::{ChainQuotes, ProviderChain};
