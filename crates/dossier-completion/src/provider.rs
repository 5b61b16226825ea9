use std::pin::Pin;

use crate::errors::{CompletionError, ProviderError};
use crate::model::{CompletionOptions, ModelRef, ProviderId};

/// Boxed stream of provider events.
pub type ProviderStream =
    Pin<Box<dyn futures::Stream<Item = Result<ProviderEvent, ProviderError>> + Send + 'static>>;

/// Raw events produced by a provider before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderEvent {
    /// One chunk of generated text.
    TextDelta { text: String },
    /// The provider signalled the end of generation.
    Completed { finish_reason: Option<String> },
}

/// Fully validated request handed to a provider.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
    pub run_id: uuid::Uuid,
    pub model: ModelRef,
    pub system_instruction: Option<String>,
    pub user_prompt: String,
    pub options: CompletionOptions,
}

/// Live provider stream returned by [`CompletionProvider::start_stream`].
pub struct ProviderStreamHandle {
    pub stream: ProviderStream,
}

/// Contract implemented by vendor integrations.
///
/// Dropping the returned stream must release the underlying connection; the
/// client relies on that for cancellation.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider id this implementation answers to.
    fn id(&self) -> ProviderId;

    /// Synchronous readiness check run before any task is spawned.
    ///
    /// Providers that need a credential return
    /// [`CompletionError::MissingCredential`] here.
    fn ensure_ready(&self) -> Result<(), CompletionError> {
        Ok(())
    }

    /// Opens the upstream stream for a request.
    async fn start_stream(&self, req: ProviderRequest)
    -> Result<ProviderStreamHandle, ProviderError>;
}
