//! Building a whole deck: read the item list, download every image into the
//! deck directory, then lay the images out into `<deck>/<deck>.pdf`.

use crate::catalog::{Catalog, CatalogClient, CatalogConfig};
use crate::coordinator::{FetchCoordinator, FetchOptions, FetchSummary};
use crate::decklist::{ItemName, parse_item_names};
use crate::error::DeckError;
use crate::pdf::{PdfSurface, SheetSummary, render_sheet};
use crate::progress::{ProgressSink, ProgressState};
use crate::results::{NameCollision, ResultSet};
use log::info;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DeckOptions {
    /// Plain-text item list, one name per line.
    pub input: PathBuf,
    /// Names both the deck directory and the document inside it.
    pub deck_name: String,
    /// Directory the deck directory is created in.
    pub output_parent: PathBuf,
    pub fetch: FetchOptions,
    pub catalog: CatalogConfig,
}

impl DeckOptions {
    pub fn new(input: impl Into<PathBuf>, deck_name: impl Into<String>) -> Self {
        DeckOptions {
            input: input.into(),
            deck_name: deck_name.into(),
            output_parent: PathBuf::from("."),
            fetch: FetchOptions::default(),
            catalog: CatalogConfig::default(),
        }
    }

    pub fn deck_dir(&self) -> PathBuf {
        self.output_parent.join(&self.deck_name)
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.deck_dir().join(format!("{}.pdf", self.deck_name))
    }

    fn validate(&self) -> Result<(), DeckError> {
        let name = self.deck_name.trim();
        if name.is_empty() {
            return Err(DeckError::Input("deck name is empty".to_string()));
        }
        if name != self.deck_name || Path::new(name).components().count() != 1 || name == ".." {
            return Err(DeckError::Input(format!(
                "deck name '{}' is not a plain directory name",
                self.deck_name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DeckReport {
    pub deck_dir: PathBuf,
    pub fetch: FetchSummary,
    pub sheet: SheetSummary,
    /// Distinct item names that were saved under the same file name.
    pub collisions: Vec<NameCollision>,
}

pub async fn read_item_names(path: &Path) -> Result<Vec<ItemName>, DeckError> {
    let list = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DeckError::Input(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(parse_item_names(&list))
}

/// Create the deck directory. It must not exist yet.
pub async fn create_deck_dir(dir: &Path) -> Result<(), DeckError> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(DeckError::OutputExists(dir.to_path_buf()))
        }
        Err(e) => Err(DeckError::Io(e)),
    }
}

/// Build a deck against the live catalog.
pub async fn build_deck(
    options: &DeckOptions,
    sink: Arc<dyn ProgressSink>,
) -> Result<DeckReport, DeckError> {
    let catalog = CatalogClient::new(options.catalog.clone())?;
    build_deck_with(Arc::new(catalog), options, sink).await
}

/// Build a deck against any catalog. Setup problems (unreadable input, an
/// existing deck directory) fail before anything is downloaded; per-item
/// failures only leave their cards out of the document.
pub async fn build_deck_with<C: Catalog + 'static>(
    catalog: Arc<C>,
    options: &DeckOptions,
    sink: Arc<dyn ProgressSink>,
) -> Result<DeckReport, DeckError> {
    options.validate()?;
    let names = read_item_names(&options.input).await?;
    let deck_dir = options.deck_dir();
    create_deck_dir(&deck_dir).await?;
    info!(
        "Building deck '{}' from {} item names into {}",
        options.deck_name,
        names.len(),
        deck_dir.display()
    );

    let results = Arc::new(ResultSet::new());
    let progress = Arc::new(ProgressState::for_names(names.len(), sink));
    let coordinator = FetchCoordinator::new(catalog, &deck_dir, options.fetch.clone());
    let fetch = coordinator
        .run(names, Arc::clone(&results), Arc::clone(&progress))
        .await;

    let collisions = results.collisions();
    let images = results.snapshot();
    let pdf_path = options.pdf_path();
    let title = options.deck_name.clone();
    let layout_progress = Arc::clone(&progress);
    let sheet = tokio::task::spawn_blocking(move || {
        let mut surface = PdfSurface::new(&title);
        render_sheet(&mut surface, &images, &pdf_path, &layout_progress)
    })
    .await
    .map_err(|e| DeckError::Pdf(format!("layout task failed: {}", e)))??;
    progress.finish();

    Ok(DeckReport {
        deck_dir,
        fetch,
        sheet,
        collisions,
    })
}
