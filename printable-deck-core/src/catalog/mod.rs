pub mod client;
pub mod models;
pub mod page;
pub mod resolver;

pub use client::{ApiCall, CatalogClient, CatalogConfig};
pub use models::{CardFaces, ImageRef, Side};
pub use page::{CardPage, parse_card_page};
pub use resolver::{LookupResolver, LookupState, MissReason};

use crate::error::DeckError;
use std::future::Future;

/// The remote card catalog, reduced to what the pipeline needs from it.
pub trait Catalog: Send + Sync {
    /// Exact-phrase search URL for an item name.
    fn search_url(&self, name: &str) -> String;

    fn get_text(&self, url: &str) -> impl Future<Output = Result<String, DeckError>> + Send;

    fn get_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, DeckError>> + Send;
}
