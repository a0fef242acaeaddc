pub mod catalog;
pub mod coordinator;
pub mod deck;
pub mod decklist;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod pdf;
pub mod progress;
pub mod results;

#[cfg(test)]
mod test_support;

pub use catalog::{
    Catalog, CatalogClient, CatalogConfig, CardFaces, ImageRef, LookupResolver, LookupState,
    MissReason, Side,
};
pub use coordinator::{FetchCoordinator, FetchOptions, FetchSummary};
pub use deck::{DeckOptions, DeckReport, build_deck, build_deck_with};
pub use decklist::{ItemName, parse_item_names};
pub use error::DeckError;
pub use fetch::{FetchedImage, ImageFetcher};
pub use layout::{PagePlan, Placement, plan_pages};
pub use pdf::{DrawingSurface, PdfSurface, SheetSummary, render_sheet};
pub use progress::{NoopProgress, Phase, ProgressSink, ProgressState};
pub use results::{NameCollision, ResultSet};
