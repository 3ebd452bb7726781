use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::config::{Credentials, Region};
use futures::future::try_join_all;
use uuid::Uuid;

use crate::{error::ApiError, multipart::UploadFile};

/// StorageService Trait
///
/// Abstracts the media store behind the two verbs the handlers need: put
/// bytes in, take objects out. `upload_many` is all-or-nothing; `delete_many`
/// is best-effort cleanup that only ever logs.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists (idempotent, local convenience).
    async fn ensure_bucket_exists(&self);

    /// Stores one file under the given folder and returns its public URL.
    async fn upload_one(&self, file: &UploadFile, folder: &str) -> Result<String, ApiError>;

    /// Removes one object by key.
    async fn delete_one(&self, key: &str) -> Result<(), ApiError>;

    /// Stores a batch concurrently. Any single failure fails the whole batch,
    /// so a record is never persisted pointing at half its images.
    async fn upload_many(
        &self,
        files: &[UploadFile],
        folder: &str,
    ) -> Result<Vec<String>, ApiError> {
        try_join_all(files.iter().map(|file| self.upload_one(file, folder))).await
    }

    /// Removes a batch, key by key. Failures are logged and skipped; the
    /// calling record mutation has already been committed and must not be
    /// rolled back over orphaned bytes. Returns the keys actually removed.
    async fn delete_many(&self, keys: &[String]) -> Vec<String> {
        let mut deleted = Vec::with_capacity(keys.len());
        for key in keys {
            match self.delete_one(key).await {
                Ok(()) => deleted.push(key.clone()),
                Err(e) => tracing::warn!("failed to delete storage object '{}': {}", key, e),
            }
        }
        deleted
    }
}

/// Shared, thread-safe handle to the storage layer used across the app state.
pub type StorageState = Arc<dyn StorageService>;

// --- Key Derivation ---

/// storage_key_from_url
///
/// Recovers the object key from a stored public URL: the last two path
/// segments ("folder/name"), with a trailing file extension stripped. Pure
/// string transform, no validation. Must stay in lockstep with the key layout
/// in `upload_one`, or deletions silently miss their objects.
pub fn storage_key_from_url(url: &str) -> String {
    let segments: Vec<&str> = url.split('/').collect();
    let start = segments.len().saturating_sub(2);
    let key = segments[start..].join("/");

    match key.rfind('.') {
        Some(dot) if dot + 1 < key.len() && !key[dot + 1..].contains('/') => key[..dot].to_string(),
        _ => key,
    }
}

/// Maps a record's stored image URLs back to deletable keys.
pub fn storage_keys_from_urls(urls: &[String]) -> Vec<String> {
    urls.iter().map(|url| storage_key_from_url(url)).collect()
}

/// Reduces a filename stem to `[A-Za-z0-9_-]`. Dots must not survive into the
/// key, or `storage_key_from_url` would later mistake the tail for an
/// extension and derive the wrong key.
fn sanitize_file_stem(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("file");

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

// --- Live S3 Implementation ---

/// S3StorageClient
///
/// The production implementation backed by any S3-compatible store (MinIO
/// locally). Objects are written under extension-free keys
/// `folder/<stem>-<uuid>`; the public URL is the path-style
/// `endpoint/bucket/key`.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Builds the SDK client with static credentials and path-style
    /// addressing, which MinIO requires.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket_name: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .behavior_version_latest()
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket_name.to_string(),
            public_base_url: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket_name, key)
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // Ignore the result: the bucket existing already is the common case.
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn upload_one(&self, file: &UploadFile, folder: &str) -> Result<String, ApiError> {
        if file.data.is_empty() {
            return Err(ApiError::UploadFailed(format!(
                "file '{}' is empty",
                file.filename
            )));
        }

        // Extension-free key; the content type lives in object metadata. This
        // keeps storage_key_from_url(object_url(key)) == key.
        let key = format!(
            "{}/{}-{}",
            folder,
            sanitize_file_stem(&file.filename),
            Uuid::new_v4().simple()
        );

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(&file.content_type)
            .body(s3::primitives::ByteStream::from(file.data.clone()))
            .send()
            .await
            .map_err(|e| ApiError::UploadFailed(e.to_string()))?;

        Ok(self.object_url(&key))
    }

    async fn delete_one(&self, key: &str) -> Result<(), ApiError> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| ApiError::UploadFailed(e.to_string()))?;
        Ok(())
    }
}

// --- Mock Implementation for Testing ---

/// MockStorageService
///
/// Recording twin of the live client. Keys are deterministic (a counter in
/// place of the UUID) and every upload/delete is captured for assertions.
/// URLs round-trip through `storage_key_from_url` exactly like real ones.
pub struct MockStorageService {
    pub should_fail: bool,
    uploads: Mutex<Vec<String>>,
    deletions: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            uploads: Mutex::new(Vec::new()),
            deletions: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    /// A mock whose every operation fails, for error-path tests.
    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload_one(&self, file: &UploadFile, folder: &str) -> Result<String, ApiError> {
        if self.should_fail {
            return Err(ApiError::UploadFailed("mock storage failure".to_string()));
        }

        let serial = self.counter.fetch_add(1, Ordering::SeqCst);
        let key = format!("{}/{}-{}", folder, sanitize_file_stem(&file.filename), serial);

        self.uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());

        Ok(format!("http://localhost:9000/mock-bucket/{key}"))
    }

    async fn delete_one(&self, key: &str) -> Result<(), ApiError> {
        if self.should_fail {
            return Err(ApiError::UploadFailed("mock storage failure".to_string()));
        }

        self.deletions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.to_string());

        Ok(())
    }
}
