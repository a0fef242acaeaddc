use crate::error::DeckError;
use crate::fetch::FetchedImage;
use crate::layout::{MM_PER_INCH, PAGE_HEIGHT_IN, PAGE_WIDTH_IN, Placement, plan_pages};
use crate::progress::{Phase, ProgressState};
use log::{debug, info, warn};
use printpdf::image_crate::io::Reader as ImageReader;
use printpdf::image_crate::{DynamicImage, GenericImageView};
use printpdf::{Image, ImageTransform, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfPageIndex};
use std::path::{Path, PathBuf};

const DPI: f64 = 300.0;
const LAYER_NAME: &str = "Layer 1";

/// Something card images can be drawn on, page by page.
pub trait DrawingSurface {
    /// Draw `image` scaled to the placement's size on the current page.
    fn draw_image(&mut self, image: &FetchedImage, placement: Placement) -> Result<(), DeckError>;

    /// Close the current page; later draws go to a new one.
    fn finish_page(&mut self) -> Result<(), DeckError>;

    fn save(&mut self, path: &Path) -> Result<(), DeckError>;
}

fn inches(value: f64) -> Mm {
    Mm(value * MM_PER_INCH)
}

/// A legal-size PDF document.
pub struct PdfSurface {
    doc: Option<PdfDocumentReference>,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    page_open: bool,
    page_count: usize,
}

impl PdfSurface {
    pub fn new(title: &str) -> Self {
        let (doc, page, layer) = PdfDocument::new(
            title,
            inches(PAGE_WIDTH_IN),
            inches(PAGE_HEIGHT_IN),
            LAYER_NAME,
        );
        PdfSurface {
            doc: Some(doc),
            page,
            layer,
            page_open: true,
            page_count: 1,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    fn document(&self) -> Result<&PdfDocumentReference, DeckError> {
        self.doc
            .as_ref()
            .ok_or_else(|| DeckError::Pdf("document was already saved".to_string()))
    }

    /// Start a new page if the previous one was finished.
    fn open_page(&mut self) -> Result<(), DeckError> {
        if !self.page_open {
            let (page, layer) =
                self.document()?
                    .add_page(inches(PAGE_WIDTH_IN), inches(PAGE_HEIGHT_IN), LAYER_NAME);
            self.page = page;
            self.layer = layer;
            self.page_open = true;
            self.page_count += 1;
        }
        Ok(())
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, DeckError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| DeckError::Image(format!("Failed to load {}: {}", path.display(), e)))
}

/// Scale factors that stretch a `width_px` x `height_px` image, rendered at
/// `DPI`, to the placement's physical size.
fn image_transform(placement: Placement, width_px: u32, height_px: u32) -> ImageTransform {
    ImageTransform {
        translate_x: Some(inches(placement.x_in)),
        translate_y: Some(inches(placement.y_in)),
        rotate: None,
        scale_x: Some(placement.width_in * DPI / width_px.max(1) as f64),
        scale_y: Some(placement.height_in * DPI / height_px.max(1) as f64),
        dpi: Some(DPI),
    }
}

impl DrawingSurface for PdfSurface {
    fn draw_image(&mut self, image: &FetchedImage, placement: Placement) -> Result<(), DeckError> {
        let decoded = load_image(&image.path)?;
        self.open_page()?;

        let (width_px, height_px) = decoded.dimensions();
        let layer = self.document()?.get_page(self.page).get_layer(self.layer);
        Image::from_dynamic_image(&decoded)
            .add_to_layer(layer, image_transform(placement, width_px, height_px));
        Ok(())
    }

    fn finish_page(&mut self) -> Result<(), DeckError> {
        self.open_page()?;
        self.page_open = false;
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), DeckError> {
        let doc = self
            .doc
            .take()
            .ok_or_else(|| DeckError::Pdf("document was already saved".to_string()))?;
        let bytes = doc
            .save_to_bytes()
            .map_err(|e| DeckError::Pdf(format!("Failed to save PDF: {}", e)))?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub drawn: usize,
    /// Images the surface could not draw; their slots stay empty.
    pub skipped: Vec<String>,
}

/// Lay `images` out nine to a page, in order, and save the document to
/// `output`. Moves `progress` through the layout half of its range.
pub fn render_sheet<S: DrawingSurface>(
    surface: &mut S,
    images: &[FetchedImage],
    output: &Path,
    progress: &ProgressState,
) -> Result<SheetSummary, DeckError> {
    let plan = plan_pages(images.len());
    let total_pages = plan.len();
    progress.enter_phase(Phase::Layout);

    let mut drawn = 0;
    let mut skipped = Vec::new();
    for page in &plan {
        for position in &page.positions {
            let Some(image) = images.get(position.image_index) else {
                continue;
            };
            match surface.draw_image(image, position.placement) {
                Ok(()) => drawn += 1,
                Err(e) => {
                    warn!("could not draw {}: {}", image.file_name, e);
                    skipped.push(image.file_name.clone());
                }
            }
        }
        surface.finish_page()?;
        debug!("finished page {}/{}", page.index + 1, total_pages);
        progress.page_finished(page.index, total_pages);
    }

    surface.save(output)?;
    info!(
        "saved {} ({} pages, {} images)",
        output.display(),
        total_pages,
        drawn
    );

    Ok(SheetSummary {
        path: output.to_path_buf(),
        pages: total_pages,
        drawn,
        skipped,
    })
}
