use crate::catalog::{Catalog, ImageRef, Side};
use crate::error::DeckError;
use log::{debug, warn};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

const IMAGE_EXTENSION: &str = "jpg";

/// An image downloaded to the deck directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Item name the file was derived from, including the side marker.
    pub name: String,
    pub side: Side,
    pub file_name: String,
    pub path: PathBuf,
}

impl FetchedImage {
    /// Sanitized identifier, i.e. the file name without extension.
    pub fn identifier(&self) -> &str {
        self.file_name
            .strip_suffix(IMAGE_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
            .unwrap_or(&self.file_name)
    }
}

/// File-name-safe identifier for an item name: all whitespace dropped, as
/// well as `.`, `,` and path separators (`Fire // Ice` becomes `FireIce`).
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '.' | ',' | '/' | '\\'))
        .collect()
}

/// The file an item name is stored under, or `None` when the sanitized name
/// would not be a single plain file inside the output directory.
pub fn image_file_name(name: &str) -> Option<String> {
    let identifier = sanitize_identifier(name);
    if identifier.is_empty() {
        return None;
    }
    let file_name = format!("{}.{}", identifier, IMAGE_EXTENSION);
    let mut components = Path::new(&file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(file_name),
        _ => None,
    }
}

#[derive(Debug)]
pub struct ImageFetcher<C> {
    catalog: Arc<C>,
    output_dir: PathBuf,
}

impl<C> Clone for ImageFetcher<C> {
    fn clone(&self) -> Self {
        ImageFetcher {
            catalog: Arc::clone(&self.catalog),
            output_dir: self.output_dir.clone(),
        }
    }
}

impl<C: Catalog> ImageFetcher<C> {
    pub fn new(catalog: Arc<C>, output_dir: impl Into<PathBuf>) -> Self {
        ImageFetcher {
            catalog,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download one face and store it as `<identifier>.jpg`. Nothing is
    /// written when the download fails.
    pub async fn fetch(&self, image: &ImageRef) -> Result<FetchedImage, DeckError> {
        let name = format!("{}{}", image.name, image.side.name_suffix());
        let Some(file_name) = image_file_name(&name) else {
            warn!(
                "'{}' does not give a usable file name, skipping its {} image",
                image.name, image.side
            );
            return Err(DeckError::Input(format!("no usable file name for '{}'", name)));
        };

        let bytes = match self.catalog.get_bytes(&image.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("could not download {} image for '{}': {}", image.side, image.name, e);
                return Err(e);
            }
        };

        let path = self.output_dir.join(&file_name);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            warn!("could not write {}: {}", path.display(), e);
            return Err(DeckError::Io(e));
        }
        debug!("saved {} ({} bytes)", path.display(), bytes.len());

        Ok(FetchedImage {
            name,
            side: image.side,
            file_name,
            path,
        })
    }
}
