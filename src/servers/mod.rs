//! Concrete server variants
//!
//! Each variant owns a frozen [`crate::registry::Registry`] and a
//! [`crate::router::ToolRouter`] over a shared [`ServerContext`].

pub mod listings;
pub mod payloads;
pub mod portfolio;

pub use {listings::ListingsServer, portfolio::PortfolioServer};

use {
    crate::{
        store::{InMemoryPropertyStore, PropertyStore},
        textgen::{CannedTextGenerator, TextGenerator},
    },
    std::sync::Arc,
};

/// Collaborators reachable from tool handlers and resource reads
#[derive(Clone)]
pub struct ServerContext {
    pub store: Arc<dyn PropertyStore>,
    pub text: Arc<dyn TextGenerator>,
}

impl ServerContext {
    pub fn new(store: Arc<dyn PropertyStore>, text: Arc<dyn TextGenerator>) -> Self {
        Self { store, text }
    }

    /// In-memory sample portfolio with canned text generation.
    pub fn sample() -> Self {
        Self::new(
            Arc::new(InMemoryPropertyStore::with_sample_data()),
            Arc::new(CannedTextGenerator),
        )
    }
}
