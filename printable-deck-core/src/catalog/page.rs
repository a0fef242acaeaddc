//! Extraction of card images and result links from catalog HTML.
//!
//! A catalog page is parsed once into a [`CardPage`], a plain owned summary,
//! so nothing from the DOM outlives the parse.

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use reqwest::Url;

const FRONT_IMAGE_CONTAINER: &str = "div.card-image-front";
const BACK_IMAGE_CONTAINER: &str = "div.card-image-back";
const RESULT_ITEM: &str = "a.card-grid-item-card";
const RESULT_LABEL: &str = "span.card-grid-item-invisible-label";

/// A search result on a results grid: its visible label and detail link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub label: String,
    pub href: String,
}

impl Candidate {
    pub fn matches(&self, name: &str) -> bool {
        self.label.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPage {
    pub front: Option<String>,
    pub back: Option<String>,
    pub candidates: Vec<Candidate>,
}

impl CardPage {
    /// Detail link of the first result whose label equals `name`, ignoring case.
    pub fn matching_candidate(&self, name: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| candidate.matches(name))
    }
}

/// Parse a search or detail page fetched from `page_url`. Relative links are
/// resolved against `page_url`.
pub fn parse_card_page(html: &str, page_url: &str) -> CardPage {
    let document = kuchiki::parse_html().one(html);

    CardPage {
        front: image_source(&document, FRONT_IMAGE_CONTAINER, page_url),
        back: image_source(&document, BACK_IMAGE_CONTAINER, page_url),
        candidates: result_candidates(&document, page_url),
    }
}

fn image_source(document: &NodeRef, container: &str, page_url: &str) -> Option<String> {
    let container = document.select_first(container).ok()?;
    let img = container.as_node().select_first("img").ok()?;
    let attributes = img.attributes.borrow();
    let src = attributes.get("src")?.trim();
    if src.is_empty() {
        return None;
    }
    resolve_link(page_url, src)
}

fn result_candidates(document: &NodeRef, page_url: &str) -> Vec<Candidate> {
    let Ok(items) = document.select(RESULT_ITEM) else {
        return Vec::new();
    };

    items
        .filter_map(|item| {
            let href = resolve_link(page_url, item.attributes.borrow().get("href")?.trim())?;
            let label = item
                .as_node()
                .select_first(RESULT_LABEL)
                .ok()?
                .as_node()
                .text_contents();
            Some(Candidate {
                label: label.trim().to_string(),
                href,
            })
        })
        .collect()
}

/// Absolute links are kept as they are; anything else is joined onto `base`.
pub fn resolve_link(base: &str, link: &str) -> Option<String> {
    if link.is_empty() {
        return None;
    }
    if let Ok(absolute) = Url::parse(link) {
        return Some(absolute.to_string());
    }
    Url::parse(base)
        .and_then(|base| base.join(link))
        .map(|joined| joined.to_string())
        .ok()
}
