//! Test doubles shared by the unit tests: an in-memory catalog and a drawing
//! surface that records calls instead of rendering.

use crate::catalog::Catalog;
use crate::error::DeckError;
use crate::fetch::FetchedImage;
use crate::layout::Placement;
use crate::pdf::DrawingSurface;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct FakeCatalog {
    pages: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_url_for(name: &str) -> String {
        format!("https://catalog.test/search?q=\"{}\"", name)
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_image(mut self, url: &str, bytes: &[u8]) -> Self {
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    /// A card whose search page shows its images directly, with image bytes
    /// served for every face given.
    pub fn with_card(self, name: &str, front: Option<&str>, back: Option<&str>) -> Self {
        let mut catalog = self.with_page(&Self::search_url_for(name), &card_page_html(front, back));
        for url in [front, back].into_iter().flatten() {
            catalog = catalog.with_image(url, format!("bytes of {}", url).as_bytes());
        }
        catalog
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    async fn lookup<T: Clone>(&self, url: &str, table: &HashMap<String, T>) -> Result<T, DeckError> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(url) {
            return Err(DeckError::Http { url: url.to_string(), status: 500 });
        }
        table
            .get(url)
            .cloned()
            .ok_or_else(|| DeckError::Http { url: url.to_string(), status: 404 })
    }
}

impl Catalog for FakeCatalog {
    fn search_url(&self, name: &str) -> String {
        Self::search_url_for(name)
    }

    async fn get_text(&self, url: &str) -> Result<String, DeckError> {
        self.lookup(url, &self.pages).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, DeckError> {
        self.lookup(url, &self.images).await
    }
}

pub fn card_page_html(front: Option<&str>, back: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    if let Some(front) = front {
        html.push_str(&format!(r#"<div class="card-image-front"><img src="{}"></div>"#, front));
    }
    if let Some(back) = back {
        html.push_str(&format!(r#"<div class="card-image-back"><img src="{}"></div>"#, back));
    }
    html.push_str("</body></html>");
    html
}

pub fn results_grid_html(results: &[(&str, &str)]) -> String {
    let mut html = String::from(r#"<html><body><div class="card-grid">"#);
    for (label, href) in results {
        html.push_str(&format!(
            r#"<a class="card-grid-item-card" href="{}"><span class="card-grid-item-invisible-label">{}</span></a>"#,
            href, label
        ));
    }
    html.push_str("</div></body></html>");
    html
}

pub fn fetched(file_stem: &str) -> FetchedImage {
    FetchedImage {
        name: file_stem.to_string(),
        side: crate::catalog::Side::Front,
        file_name: format!("{}.jpg", file_stem),
        path: PathBuf::from(format!("{}.jpg", file_stem)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Draw { file_name: String, placement: Placement },
    FinishPage,
    Save(PathBuf),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    /// Images whose draw call fails.
    pub undrawable: HashSet<String>,
}

impl RecordingSurface {
    /// Draw calls grouped by page.
    pub fn pages(&self) -> Vec<Vec<(String, Placement)>> {
        let mut pages = Vec::new();
        let mut current = Vec::new();
        for call in &self.calls {
            match call {
                SurfaceCall::Draw { file_name, placement } => {
                    current.push((file_name.clone(), *placement))
                }
                SurfaceCall::FinishPage => pages.push(std::mem::take(&mut current)),
                SurfaceCall::Save(_) => {}
            }
        }
        pages
    }
}

impl DrawingSurface for RecordingSurface {
    fn draw_image(&mut self, image: &FetchedImage, placement: Placement) -> Result<(), DeckError> {
        if self.undrawable.contains(&image.file_name) {
            return Err(DeckError::Image(format!("cannot decode {}", image.file_name)));
        }
        self.calls.push(SurfaceCall::Draw {
            file_name: image.file_name.clone(),
            placement,
        });
        Ok(())
    }

    fn finish_page(&mut self) -> Result<(), DeckError> {
        self.calls.push(SurfaceCall::FinishPage);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), DeckError> {
        self.calls.push(SurfaceCall::Save(path.to_path_buf()));
        Ok(())
    }
}
