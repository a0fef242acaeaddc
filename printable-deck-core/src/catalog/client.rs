use super::Catalog;
use crate::error::DeckError;
use log::debug;
use reqwest::Url;
use std::sync::{Mutex, PoisonError};
use time::OffsetDateTime;
use tokio::time::{Duration, Instant};

// Scryfall asks clients to identify themselves and to space out requests
const USER_AGENT: &str = concat!("printable-deck/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "*/*";
pub const DEFAULT_SEARCH_URL: &str = "https://scryfall.com/search";
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(100);
const MAX_API_HISTORY: usize = 100;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Search endpoint; the quoted item name is sent as its `q` parameter.
    pub search_url: String,
    pub user_agent: String,
    /// Minimum spacing between the starts of two requests.
    pub cooldown: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiCall {
    pub url: String,
    pub timestamp: OffsetDateTime,
    pub status_code: u16,
    pub success: bool,
}

#[derive(Debug)]
pub struct CatalogClient {
    client: reqwest::Client,
    search_url: Url,
    cooldown: Duration,
    next_call: Mutex<Instant>,
    history: Mutex<Vec<ApiCall>>,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, DeckError> {
        let search_url = Url::parse(&config.search_url).map_err(|e| {
            DeckError::Input(format!("invalid search url '{}': {}", config.search_url, e))
        })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(&config.user_agent)
                .map_err(|e| DeckError::Input(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(CatalogClient {
            client,
            search_url,
            cooldown: config.cooldown,
            next_call: Mutex::new(Instant::now()),
            history: Mutex::new(Vec::new()),
        })
    }

    /// Claim the next free request slot and return when it starts.
    fn reserve_slot(&self) -> Instant {
        let mut next = self.next_call.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = (*next).max(Instant::now());
        *next = slot + self.cooldown;
        slot
    }

    async fn call(&self, url: &str) -> Result<reqwest::Response, DeckError> {
        tokio::time::sleep_until(self.reserve_slot()).await;
        debug!("calling catalog: {}", url);

        let timestamp = OffsetDateTime::now_utc();
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                self.record(url, timestamp, status.as_u16(), status.is_success());
                if status.is_success() {
                    Ok(response)
                } else {
                    Err(DeckError::Http {
                        url: url.to_string(),
                        status: status.as_u16(),
                    })
                }
            }
            Err(e) => {
                // No status for transport errors
                self.record(url, timestamp, 0, false);
                Err(DeckError::Network(e))
            }
        }
    }

    fn record(&self, url: &str, timestamp: OffsetDateTime, status_code: u16, success: bool) {
        if let Ok(mut history) = self.history.lock() {
            history.push(ApiCall {
                url: url.to_string(),
                timestamp,
                status_code,
                success,
            });
            if history.len() > MAX_API_HISTORY {
                let excess = history.len() - MAX_API_HISTORY;
                history.drain(0..excess);
            }
        }
    }

    /// The most recent requests, oldest first.
    pub fn api_call_history(&self) -> Vec<ApiCall> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Requests that did not come back with a success status.
    pub fn failed_calls(&self) -> Vec<ApiCall> {
        self.api_call_history()
            .into_iter()
            .filter(|call| !call.success)
            .collect()
    }
}

impl Catalog for CatalogClient {
    fn search_url(&self, name: &str) -> String {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("\"{}\"", name));
        url.to_string()
    }

    async fn get_text(&self, url: &str) -> Result<String, DeckError> {
        let response = self.call(url).await?;
        Ok(response.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, DeckError> {
        let response = self.call(url).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
