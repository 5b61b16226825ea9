//! Incremental completion client with a builder-first async API.
//!
//! A [`CompletionClient`] wraps one provider. Each request streams text
//! increments in the order the provider produced them; the caller owns the
//! accumulated text. Vendor-specific APIs are namespaced under `vendors::*`.
//!
//! # Streaming usage (OpenAI)
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dossier_completion::prelude::*;
//! use dossier_completion::vendors::openai::{OpenAiClientConfig, OpenAiProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), CompletionError> {
//! let provider = OpenAiProvider::new(OpenAiClientConfig::from_env())?;
//! let client = CompletionClient::new(Arc::new(provider));
//!
//! let mut stream = client
//!     .request(ModelRef::new("openai", "gpt-4o"))
//!     .system_instruction("Answer briefly.")
//!     .user_prompt("Describe Acme in one sentence.")
//!     .temperature(0.4)
//!     .max_tokens(200)
//!     .start_stream()?;
//!
//! let mut text = String::new();
//! while let Some(event) = stream.next_event().await {
//!     if let StreamEvent::Increment { text: delta, .. } = event {
//!         text.push_str(&delta);
//!     }
//! }
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

/// Client entry point.
pub mod client;
/// Public error types.
pub mod errors;
/// Model identifiers and per-request generation options.
pub mod model;
/// Common imports for typical usage.
pub mod prelude;
/// Provider contracts used by vendor integrations.
pub mod provider;
/// Request builder, streaming handle, and cancellation handle.
pub mod run;
/// Normalized public stream events.
pub mod stream;
/// Vendor-specific integrations.
pub mod vendors;

pub use client::CompletionClient;
pub use errors::{CompletionError, ProviderError, StreamFailure};
pub use model::{CompletionOptions, ModelRef, ProviderId};
pub use provider::{
    CompletionProvider, ProviderEvent, ProviderRequest, ProviderStreamHandle, ProviderStream,
};
pub use run::{AbortHandle, CompletionStream, RequestBuilder};
pub use stream::StreamEvent;
