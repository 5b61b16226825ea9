use std::sync::Arc;

use crate::errors::CompletionError;
use crate::model::{ModelRef, ProviderId};
use crate::provider::CompletionProvider;
use crate::run::RequestBuilder;

/// Entry point for starting completion streams against one provider.
///
/// Cheap to clone; clones share the provider (and its HTTP connection pool).
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn CompletionProvider>,
}

impl CompletionClient {
    /// Wraps a provider.
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Id of the wrapped provider.
    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    /// Runs the provider's synchronous readiness check (credential presence).
    pub fn ensure_ready(&self) -> Result<(), CompletionError> {
        self.provider.ensure_ready()
    }

    /// Starts building a request for the given model.
    pub fn request(&self, model: ModelRef) -> RequestBuilder {
        RequestBuilder::new(self.provider.clone(), model)
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("provider", &self.provider.id())
            .finish()
    }
}
