//! Common imports for typical completion usage.
pub use crate::{
    AbortHandle, CompletionClient, CompletionError, CompletionOptions, CompletionStream, ModelRef,
    ProviderId, RequestBuilder, StreamEvent, StreamFailure,
};
