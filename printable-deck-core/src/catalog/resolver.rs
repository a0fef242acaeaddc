//! Two-phase lookup of an item's card images.
//!
//! The search page is tried first. When it does not show a front image
//! directly (the search matched several cards), the results grid is scanned
//! for an entry labelled exactly like the item and its detail page is tried
//! instead.

use super::models::CardFaces;
use super::page::{CardPage, parse_card_page};
use super::Catalog;
use crate::decklist::ItemName;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// Search or detail page could not be fetched.
    Transport { stage: &'static str, error: String },
    /// Results grid had no entry labelled with the item name.
    NoMatchingResult,
    /// The matching detail page showed no front image either.
    NoFrontImage,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::Transport { stage, error } => write!(f, "{} failed: {}", stage, error),
            MissReason::NoMatchingResult => write!(f, "no search result with a matching name"),
            MissReason::NoFrontImage => write!(f, "no front image on the detail page"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupState {
    /// The page in hand shows a front image.
    DirectHit(CardPage),
    /// The search page shows a results grid instead of a card.
    SearchFallback(CardPage),
    Resolved(CardFaces),
    Miss { reason: MissReason, back: Option<String> },
}

impl LookupState {
    /// Entry state for a freshly fetched search page.
    pub fn classify(page: CardPage) -> LookupState {
        if page.front.is_some() {
            LookupState::DirectHit(page)
        } else {
            LookupState::SearchFallback(page)
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LookupState::Resolved(_) | LookupState::Miss { .. })
    }

    /// Perform one transition. Terminal states are returned unchanged.
    pub async fn step<C: Catalog>(self, catalog: &C, name: &ItemName) -> LookupState {
        match self {
            LookupState::DirectHit(page) => LookupState::Resolved(CardFaces {
                front: page.front,
                back: page.back,
            }),
            LookupState::SearchFallback(page) => {
                let Some(href) = page
                    .matching_candidate(name.as_str())
                    .map(|candidate| candidate.href.clone())
                else {
                    return LookupState::Miss {
                        reason: MissReason::NoMatchingResult,
                        back: page.back,
                    };
                };

                debug!("'{}' found on results grid, following {}", name, href);
                match catalog.get_text(&href).await {
                    Ok(html) => {
                        let detail = parse_card_page(&html, &href);
                        if detail.front.is_some() {
                            LookupState::DirectHit(detail)
                        } else {
                            LookupState::Miss {
                                reason: MissReason::NoFrontImage,
                                back: detail.back,
                            }
                        }
                    }
                    Err(e) => LookupState::Miss {
                        reason: MissReason::Transport {
                            stage: "detail page",
                            error: e.to_string(),
                        },
                        back: page.back,
                    },
                }
            }
            terminal => terminal,
        }
    }

    fn into_faces(self) -> CardFaces {
        match self {
            LookupState::Resolved(faces) => faces,
            LookupState::Miss { back, .. } => CardFaces { front: None, back },
            LookupState::DirectHit(page) | LookupState::SearchFallback(page) => CardFaces {
                front: page.front,
                back: page.back,
            },
        }
    }
}

#[derive(Debug)]
pub struct LookupResolver<C> {
    catalog: Arc<C>,
}

impl<C> Clone for LookupResolver<C> {
    fn clone(&self) -> Self {
        LookupResolver {
            catalog: Arc::clone(&self.catalog),
        }
    }
}

impl<C: Catalog> LookupResolver<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        LookupResolver { catalog }
    }

    /// Find the front and back image URLs for `name`. Never fails: transport
    /// and parse problems surface as a missing front image.
    pub async fn resolve(&self, name: &ItemName) -> CardFaces {
        let url = self.catalog.search_url(name.as_str());
        let mut state = match self.catalog.get_text(&url).await {
            Ok(html) => LookupState::classify(parse_card_page(&html, &url)),
            Err(e) => LookupState::Miss {
                reason: MissReason::Transport {
                    stage: "search page",
                    error: e.to_string(),
                },
                back: None,
            },
        };

        while !state.is_terminal() {
            state = state.step(self.catalog.as_ref(), name).await;
        }

        if let LookupState::Miss { reason, .. } = &state {
            warn!("could not find a front image for '{}': {}", name, reason);
        }

        let faces = state.into_faces();
        if faces.front.is_some() && faces.back.is_none() {
            debug!("'{}' has no back image", name);
        }
        faces
    }
}
