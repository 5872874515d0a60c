//! Music library listings over S3-compatible object storage.
//!
//! Pure data shaping: one `ListObjectsV2` call per request, common prefixes
//! folded in as directory-like entries, keys classified by their leading
//! path segment. No caching, no retries; provider failures surface with
//! their own status and short code.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::StorageSettings;
use crate::models::{MusicEntry, MusicKind};

/// Presigned access URLs stay valid for one hour.
pub const ACCESS_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
#[error("{message}")]
pub struct StorageError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl StorageError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            code: None,
            message: message.into(),
        }
    }

    fn from_sdk<E>(err: SdkError<E>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let status = err
            .raw_response()
            .map(|response| response.status().as_u16())
            .unwrap_or(500);
        let code = err.code().map(str::to_string);
        let message = match err.as_service_error() {
            Some(service_err) => service_err.to_string(),
            None => err.to_string(),
        };
        Self {
            status,
            code,
            message,
        }
    }
}

/// A concrete object returned from a listing.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of listing results: directory-like groups plus objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectListing {
    pub common_prefixes: Vec<String>,
    pub objects: Vec<StoredObject>,
}

/// Narrow seam over the storage SDK.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List keys under `prefix`, grouped at `/`.
    async fn list(&self, prefix: &str) -> Result<ObjectListing, StorageError>;

    /// Produce a time-limited access URL for a single key.
    async fn presign_get(&self, key: &str, expires_in: Duration)
        -> Result<String, StorageError>;
}

/// [`ObjectStore`] backed by the AWS S3 SDK against an R2 endpoint.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            None,
            None,
            "saintshub",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(settings.endpoint())
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(config),
            bucket: settings.bucket_name.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list(&self, prefix: &str) -> Result<ObjectListing, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter("/")
            .send()
            .await
            .map_err(StorageError::from_sdk)?;

        let common_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        let objects = output
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?.to_string();
                Some(StoredObject {
                    key,
                    size: obj.size().unwrap_or(0),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                })
            })
            .collect();

        Ok(ObjectListing {
            common_prefixes,
            objects,
        })
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StorageError::internal(format!("invalid presign expiry: {err}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(StorageError::from_sdk)?;

        Ok(presigned.uri().to_string())
    }
}

/// Listing and classification over an injected [`ObjectStore`].
pub struct MusicService {
    store: Arc<dyn ObjectStore>,
}

impl MusicService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<MusicEntry>, StorageError> {
        self.list_by_prefix("").await
    }

    /// Directory-like album groups only; a track inside an album also
    /// classifies as `album` by key prefix, so the filter keeps group keys.
    pub async fn list_albums(&self) -> Result<Vec<MusicEntry>, StorageError> {
        Ok(self
            .list_by_prefix("album/")
            .await?
            .into_iter()
            .filter(|entry| entry.kind == MusicKind::Album && entry.key.ends_with('/'))
            .collect())
    }

    pub async fn list_artists(&self) -> Result<Vec<MusicEntry>, StorageError> {
        Ok(self
            .list_by_prefix("artist/")
            .await?
            .into_iter()
            .filter(|entry| entry.kind == MusicKind::Artist && entry.key.ends_with('/'))
            .collect())
    }

    pub async fn album_contents(&self, name: &str) -> Result<Vec<MusicEntry>, StorageError> {
        self.list_by_prefix(&format!("album/{name}/")).await
    }

    pub async fn artist_contents(&self, name: &str) -> Result<Vec<MusicEntry>, StorageError> {
        self.list_by_prefix(&format!("artist/{name}/")).await
    }

    pub async fn file_url(&self, key: &str) -> Result<String, StorageError> {
        self.store.presign_get(key, ACCESS_URL_TTL).await
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<MusicEntry>, StorageError> {
        let listing = self.store.list(prefix).await?;
        let mut entries = Vec::new();

        // Directory-like groups: zero size, listed-at timestamp
        for group in &listing.common_prefixes {
            let Some(name) = last_segment(group) else {
                continue;
            };
            entries.push(MusicEntry {
                key: group.clone(),
                name,
                size: 0,
                last_modified: Utc::now(),
                kind: MusicKind::classify(group),
            });
        }

        for object in &listing.objects {
            // Zero-byte directory markers are not entries
            if object.key.ends_with('/') {
                continue;
            }
            let Some(name) = last_segment(&object.key) else {
                continue;
            };
            entries.push(MusicEntry {
                key: object.key.clone(),
                name,
                size: object.size,
                last_modified: object.last_modified.unwrap_or_else(Utc::now),
                kind: MusicKind::classify(&object.key),
            });
        }

        Ok(entries)
    }
}

fn last_segment(key: &str) -> Option<String> {
    key.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_string)
}
