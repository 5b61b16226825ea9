//! OpenAI provider integration.
//!
//! Vendor-specific configuration lives here so the root client API can remain
//! provider-agnostic.
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::OpenAiProvider;
pub use config::{API_KEY_ENV_VARS, OpenAiClientConfig};
