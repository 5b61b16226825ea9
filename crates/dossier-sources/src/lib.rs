//! Source adapters: each one turns an external data source into an ordered
//! list of typed [`SourceItem`] records.
//!
//! Adapters never stream. [`fetch_or_degrade`] applies the outage policy:
//! a failed source yields an empty list plus a warning instead of an error.

mod adapter;
pub mod adapters;
mod error;
pub mod http;
mod item;

pub use adapter::{
    SourceAdapter, SourceOutcome, fetch_or_degrade, fetch_with_timeout, normalize_query,
};
pub use error::FetchError;
pub use item::{
    Article, CompanyRecord, Post, SourceItem, SourceKind, Technology, render_context,
};
