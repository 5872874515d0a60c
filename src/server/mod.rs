//! HTTP surface for daily content and music listings.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cache::RedisCache;
use crate::config::Settings;
use crate::music::{MusicService, S3ObjectStore};
use crate::refresh;
use crate::scrapers::browser::BrowserHarvester;
use crate::scrapers::ScrapePipeline;

/// Shared state for the web server. Clients are constructed once at
/// bootstrap and injected; handlers hold no global state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ScrapePipeline>,
    pub music: Arc<MusicService>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let cache = RedisCache::connect(&settings.cache).await?;
        let harvester = BrowserHarvester::new(Default::default());
        let pipeline = ScrapePipeline::new(Arc::new(cache), Arc::new(harvester));
        let music = MusicService::new(Arc::new(S3ObjectStore::new(&settings.storage)));

        Ok(Self {
            pipeline: Arc::new(pipeline),
            music: Arc::new(music),
        })
    }
}

/// Start the web server and the daily refresh task.
pub async fn serve(settings: &Settings, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;

    refresh::spawn_daily_refresh(state.pipeline.clone());

    let app = create_router(state);
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::cache::{CacheError, KeyValueCache};
    use crate::models::Language;
    use crate::music::{ObjectListing, ObjectStore, StorageError, StoredObject};
    use crate::scrapers::{quotes, verse, PageHarvester, ScrapeError, ScrapeTarget};

    struct MapCache(Mutex<HashMap<String, String>>);

    impl MapCache {
        fn new(entries: &[(&str, String)]) -> Self {
            Self(Mutex::new(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ))
        }
    }

    #[async_trait]
    impl KeyValueCache for MapCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set_ex(&self, key: &str, value: &str, _ttl: u64) -> Result<(), CacheError> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    /// Harvester that always returns an unextractable page.
    struct FailingHarvester;

    #[async_trait]
    impl PageHarvester for FailingHarvester {
        async fn harvest(&self, target: &ScrapeTarget) -> Result<Value, ScrapeError> {
            Err(ScrapeError::SelectorTimeout {
                selector: target.wait_selector,
            })
        }
    }

    struct StaticStore(ObjectListing);

    #[async_trait]
    impl ObjectStore for StaticStore {
        async fn list(&self, _prefix: &str) -> Result<ObjectListing, StorageError> {
            Ok(self.0.clone())
        }

        async fn presign_get(
            &self,
            key: &str,
            _expires_in: Duration,
        ) -> Result<String, StorageError> {
            Ok(format!("https://signed.example/{key}"))
        }
    }

    fn test_state(cache: MapCache) -> AppState {
        let pipeline = ScrapePipeline::new(Arc::new(cache), Arc::new(FailingHarvester));
        let listing = ObjectListing {
            common_prefixes: vec!["album/Jazz/".to_string()],
            objects: vec![StoredObject {
                key: "album/Jazz/track1.mp3".to_string(),
                size: 1024,
                last_modified: None,
            }],
        };
        AppState {
            pipeline: Arc::new(pipeline),
            music: Arc::new(MusicService::new(Arc::new(StaticStore(listing)))),
        }
    }

    fn warm_state() -> AppState {
        let verse_record = verse::parse(json!({
            "verseDate": "August 26, 2026",
            "verseText": "Be still, and know that I am God",
            "referenceText": "Psalm 46:10",
        }))
        .unwrap();
        let fr_quote = quotes::parse(
            Language::Fr,
            json!({
                "sermonDate": "63-0317E",
                "sermonTitle": "La Breche",
                "quoteText": "La foi vient de ce qu'on entend.",
            }),
        )
        .unwrap();

        test_state(MapCache::new(&[
            (
                verse::CACHE_KEY,
                serde_json::to_string(&verse_record).unwrap(),
            ),
            (
                "frDailyQuote",
                serde_json::to_string(&fr_quote).unwrap(),
            ),
        ]))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn welcome_uses_the_success_envelope() {
        let app = create_router(warm_state());
        let (status, body) = get_json(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["data"]["message"].as_str().unwrap().contains("SaintsHub"));
    }

    #[tokio::test]
    async fn verse_route_serves_the_cached_record() {
        let app = create_router(warm_state());
        let (status, body) = get_json(app, "/verse-of-day").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["referenceText"], "Psalm 46:10");
    }

    #[tokio::test]
    async fn quote_path_and_query_resolve_identically() {
        let state = warm_state();
        let (path_status, path_body) =
            get_json(create_router(state.clone()), "/quotes/fr").await;
        let (query_status, query_body) =
            get_json(create_router(state), "/quotes?lang=fr").await;

        assert_eq!(path_status, StatusCode::OK);
        assert_eq!(path_status, query_status);
        assert_eq!(path_body, query_body);
        assert_eq!(path_body["data"]["language"], "fr");
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_scrape_maps_to_500_with_code() {
        // Empty cache, harvester always fails
        let app = create_router(test_state(MapCache::new(&[])));
        let (status, body) = get_json(app, "/verse-of-day").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "SCRAPE_EXHAUSTED");
        assert!(body["error"].as_str().unwrap().contains("3 attempts"));
    }

    #[tokio::test]
    async fn music_albums_lists_the_group() {
        let app = create_router(warm_state());
        let (status, body) = get_json(app, "/music/albums").await;

        assert_eq!(status, StatusCode::OK);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["key"], "album/Jazz/");
        assert_eq!(data[0]["type"], "album");
    }

    #[tokio::test]
    async fn file_route_accepts_keys_with_separators() {
        let app = create_router(warm_state());
        let (status, body) = get_json(app, "/music/file/album/Jazz/track1.mp3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["url"],
            "https://signed.example/album/Jazz/track1.mp3"
        );
    }
}
