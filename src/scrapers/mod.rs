//! Scrape-cache-serve pipeline for daily content.
//!
//! One parameterized pipeline covers every content type: a [`ScrapeTarget`]
//! names the source URL, the selector that marks the page as rendered, the
//! extraction script, and the cache key. The pipeline checks the cache
//! first, scrapes on a miss with a bounded retry loop, and stores validated
//! records with a 24-hour expiry.

pub mod browser;
pub mod quotes;
pub mod verse;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, KeyValueCache};
use crate::models::{Language, QuoteRecord, VerseRecord};

/// Scrape attempts per invocation before giving up.
pub const SCRAPE_ATTEMPTS: u32 = 3;
/// Fixed delay between attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
/// Cached records expire after one day, measured from write time.
pub const DAILY_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser automation failed: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("browser setup failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out waiting for selector {selector:?}")]
    SelectorTimeout { selector: &'static str },

    #[error("extracted field {field:?} was missing or empty")]
    Incomplete { field: &'static str },

    #[error("cache operation failed: {0}")]
    Cache(#[from] CacheError),

    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scrape failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },
}

/// Everything needed to turn one page into one cached record.
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
    pub cache_key: String,
    pub url: String,
    pub wait_selector: &'static str,
    pub extractor_js: &'static str,
}

/// Drives one isolated browser session per call: launch, navigate, wait for
/// the target's selector, run its extraction script, and tear the session
/// down before returning. Implementations must never share a session across
/// calls; one `harvest` equals one session open/close pair.
#[async_trait]
pub trait PageHarvester: Send + Sync {
    async fn harvest(&self, target: &ScrapeTarget) -> Result<Value, ScrapeError>;
}

/// Cache-first scrape orchestrator. Clients and the harvester are injected
/// at construction; the pipeline owns no global state.
pub struct ScrapePipeline {
    cache: Arc<dyn KeyValueCache>,
    harvester: Arc<dyn PageHarvester>,
}

impl ScrapePipeline {
    pub fn new(cache: Arc<dyn KeyValueCache>, harvester: Arc<dyn PageHarvester>) -> Self {
        Self { cache, harvester }
    }

    /// Verse of the day, cache-first.
    pub async fn fetch_verse(&self) -> Result<VerseRecord, ScrapeError> {
        self.fetch(&verse::target(), verse::parse).await
    }

    /// Quote of the day in `language`, cache-first.
    pub async fn fetch_quote(&self, language: Language) -> Result<QuoteRecord, ScrapeError> {
        self.fetch(&quotes::target(language), move |raw| {
            quotes::parse(language, raw)
        })
        .await
    }

    /// Scrape the verse unconditionally, overwriting any cached value.
    pub async fn refresh_verse(&self) -> Result<VerseRecord, ScrapeError> {
        self.scrape_fresh(&verse::target(), verse::parse).await
    }

    /// Scrape the quote unconditionally, overwriting any cached value.
    pub async fn refresh_quote(&self, language: Language) -> Result<QuoteRecord, ScrapeError> {
        self.scrape_fresh(&quotes::target(language), move |raw| {
            quotes::parse(language, raw)
        })
        .await
    }

    async fn fetch<R, F>(&self, target: &ScrapeTarget, parse: F) -> Result<R, ScrapeError>
    where
        R: Serialize + DeserializeOwned,
        F: Fn(Value) -> Result<R, ScrapeError> + Send + Sync,
    {
        if let Some(cached) = self.cache.get(&target.cache_key).await? {
            match serde_json::from_str::<R>(&cached) {
                Ok(record) => {
                    debug!("Cache hit for {}", target.cache_key);
                    return Ok(record);
                }
                // A record that no longer parses is treated as a miss
                Err(err) => warn!(
                    "Discarding unparseable cache entry {}: {}",
                    target.cache_key, err
                ),
            }
        }

        self.scrape_fresh(target, parse).await
    }

    async fn scrape_fresh<R, F>(&self, target: &ScrapeTarget, parse: F) -> Result<R, ScrapeError>
    where
        R: Serialize + DeserializeOwned,
        F: Fn(Value) -> Result<R, ScrapeError> + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(
                "Attempt {}/{}: scraping {}",
                attempt, SCRAPE_ATTEMPTS, target.url
            );

            match self.attempt(target, &parse).await {
                Ok(record) => {
                    let json = serde_json::to_string(&record)?;
                    self.cache
                        .set_ex(&target.cache_key, &json, DAILY_TTL_SECS)
                        .await?;
                    info!("Stored {} (ttl {}s)", target.cache_key, DAILY_TTL_SECS);
                    return Ok(record);
                }
                Err(err) => {
                    warn!("Attempt {} for {} failed: {}", attempt, target.url, err);
                    if attempt >= SCRAPE_ATTEMPTS {
                        return Err(ScrapeError::Exhausted {
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    async fn attempt<R, F>(&self, target: &ScrapeTarget, parse: &F) -> Result<R, ScrapeError>
    where
        F: Fn(Value) -> Result<R, ScrapeError> + Send + Sync,
    {
        let raw = self.harvester.harvest(target).await?;
        parse(raw)
    }
}

/// Read a string field from extracted page data. Whitespace-only and empty
/// strings count as absent so a selector that resolves to nothing is never
/// served as an empty record field.
pub(crate) fn text_field(raw: &Value, name: &str) -> Option<String> {
    raw.get(name)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
