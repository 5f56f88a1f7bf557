//! Media store implementation using Apache OpenDAL.

use std::time::Duration;

use bytes::Bytes;
use opendal::{Operator, services};
use tracing::{info, warn};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use crate::media::{FileKind, classify, extension, sanitize_filename};

/// Result of persisting an upload.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    /// Caller-resolvable reference (public URL or path).
    pub url: String,
    /// Object key inside the backend.
    pub key: String,
    /// Detected file kind.
    pub kind: FileKind,
}

/// Blob store for uploaded media.
///
/// Fronts one of two backend variants behind a single OpenDAL operator:
/// local filesystem or an S3-compatible object store.
pub struct MediaStore {
    operator: Operator,
    config: StorageConfig,
    http: reqwest::Client,
}

impl MediaStore {
    /// Create a new media store from configuration.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unconfigured` if the provider cannot be
    /// initialized from the given settings.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::Unconfigured(format!("http client: {e}")))?;
        Ok(Self {
            operator,
            config,
            http,
        })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::LocalFs { root, .. } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::Unconfigured("invalid root path".into()))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::Unconfigured(e.to_string()))?
                    .finish())
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
                ..
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::Unconfigured(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the maximum accepted upload size in bytes.
    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }

    /// Derive the object key and file kind for an upload.
    ///
    /// The local variant keeps the sanitized original name under a per-kind
    /// subdirectory; the remote variant uses the caller-supplied unique id
    /// as an opaque key so original names cannot collide.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DisallowedType` if the filename does not map
    /// to a known file kind.
    pub fn object_key(
        &self,
        filename: &str,
        unique_id: Uuid,
    ) -> Result<(String, FileKind), StorageError> {
        let kind = classify(filename).ok_or_else(|| StorageError::DisallowedType {
            filename: filename.to_string(),
        })?;
        let subdir = kind_subdir(kind);

        let key = match &self.config.provider {
            StorageProvider::LocalFs { .. } => {
                format!("{subdir}/{}", sanitize_filename(filename))
            }
            StorageProvider::S3 { .. } => {
                // classify() succeeded, so an extension is present
                let ext = extension(filename).unwrap_or_default();
                format!("{subdir}/{unique_id}.{ext}")
            }
        };

        Ok((key, kind))
    }

    /// Derive the public reference for an object key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        match &self.config.provider {
            StorageProvider::LocalFs { public_prefix, .. } => {
                format!("{}/{key}", public_prefix.trim_end_matches('/'))
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                public_url_base,
                ..
            } => {
                let base = public_url_base
                    .clone()
                    .unwrap_or_else(|| format!("{}/{bucket}", endpoint.trim_end_matches('/')));
                format!("{}/{key}", base.trim_end_matches('/'))
            }
        }
    }

    /// Map a stored reference back to its object key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidReference` if the reference does not
    /// belong to this backend.
    pub fn key_from_reference(&self, reference: &str) -> Result<String, StorageError> {
        let base = match &self.config.provider {
            StorageProvider::LocalFs { public_prefix, .. } => {
                public_prefix.trim_end_matches('/').to_string()
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                public_url_base,
                ..
            } => public_url_base
                .clone()
                .unwrap_or_else(|| format!("{}/{bucket}", endpoint.trim_end_matches('/')))
                .trim_end_matches('/')
                .to_string(),
        };

        if let Some(key) = reference
            .strip_prefix(&base)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return Ok(key.to_string());
        }

        // Bare object keys are accepted as-is.
        if !reference.contains("://") && !reference.starts_with('/') {
            return Ok(reference.to_string());
        }

        Err(StorageError::InvalidReference(reference.to_string()))
    }

    /// Persist upload bytes and return the durable reference.
    ///
    /// On a retryable failure the remote variant makes one more attempt over
    /// raw HTTP (a presigned PUT carrying the same credentials), then gives
    /// up. The local variant fails immediately.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` describing the rejection or transport
    /// failure; callers surface it as a degraded response, never a crash.
    pub async fn store(
        &self,
        data: Bytes,
        filename: &str,
        unique_id: Uuid,
    ) -> Result<StoredMedia, StorageError> {
        let size = data.len() as u64;
        if size > self.config.max_file_size {
            return Err(StorageError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }

        let (key, kind) = self.object_key(filename, unique_id)?;

        match self.timed(self.operator.write(&key, data.clone())).await {
            Ok(_) => {}
            Err(err) if self.config.provider.is_remote() && err.is_retryable() => {
                warn!(key = %key, error = %err, "upload failed, falling back to raw HTTP transport");
                self.upload_via_http(&key, data).await?;
            }
            Err(err) => return Err(err),
        }

        let url = self.public_url(&key);
        info!(key = %key, kind = %kind, provider = self.provider_name(), "stored upload");

        Ok(StoredMedia { url, key, kind })
    }

    /// Remove a stored object by its reference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` when the object is already gone;
    /// callers log removal failures and do not retry.
    pub async fn remove(&self, reference: &str) -> Result<(), StorageError> {
        let key = self.key_from_reference(reference)?;

        // Stat first so a missing object surfaces as NotFound instead of a
        // silently successful delete.
        if let Err(err) = self.timed(self.operator.stat(&key)).await {
            if matches!(err, StorageError::NotFound { .. }) {
                warn!(key = %key, "object missing from storage, nothing to remove");
                return Err(StorageError::NotFound { key });
            }
            return Err(err);
        }

        self.timed(self.operator.delete(&key)).await?;
        info!(key = %key, "removed stored object");
        Ok(())
    }

    /// One raw HTTP PUT against a presigned URL, same credentials as the
    /// primary transport.
    async fn upload_via_http(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let timeout = Duration::from_secs(self.config.op_timeout_secs);

        let presigned = self
            .timed(self.operator.presign_write(key, timeout))
            .await?;

        let response = self
            .http
            .request(presigned.method().clone(), presigned.uri().to_string())
            .headers(presigned.header().clone())
            .body(data)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StorageError::Timeout {
                        secs: self.config.op_timeout_secs,
                    }
                } else {
                    StorageError::TransportFailure(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(StorageError::ProviderRejected(format!(
                "fallback upload returned {}",
                response.status()
            )));
        }

        info!(key = %key, "fallback upload succeeded");
        Ok(())
    }

    /// Run a storage future under the configured timeout.
    async fn timed<T>(
        &self,
        fut: impl Future<Output = Result<T, opendal::Error>>,
    ) -> Result<T, StorageError> {
        let secs = self.config.op_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(secs), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(StorageError::Timeout { secs }),
        }
    }
}

const fn kind_subdir(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Image => "images",
        FileKind::Video => "videos",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_store(root: &std::path::Path) -> MediaStore {
        let config = StorageConfig::new(StorageProvider::local_fs(root, "/static/uploads"));
        MediaStore::from_config(config).expect("local store should build")
    }

    fn s3_store(public_url_base: Option<&str>) -> MediaStore {
        let mut config = StorageConfig::new(StorageProvider::s3(
            "https://account.r2.cloudflarestorage.com",
            "media",
            "key",
            "secret",
            "auto",
        ));
        if let Some(base) = public_url_base {
            config = config.with_public_url_base(base);
        }
        MediaStore::from_config(config).expect("s3 store should build")
    }

    #[test]
    fn test_local_object_key_uses_sanitized_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = local_store(dir.path());
        let id = Uuid::new_v4();

        let (key, kind) = store.object_key("my cat pic.jpg", id).expect("allowed");
        assert_eq!(key, "images/my_cat_pic.jpg");
        assert_eq!(kind, FileKind::Image);

        let (key, kind) = store.object_key("clip.mov", id).expect("allowed");
        assert_eq!(key, "videos/clip.mov");
        assert_eq!(kind, FileKind::Video);
    }

    #[test]
    fn test_remote_object_key_is_opaque() {
        let store = s3_store(None);
        let id = Uuid::new_v4();

        let (key, kind) = store.object_key("holiday.PNG", id).expect("allowed");
        assert_eq!(key, format!("images/{id}.png"));
        assert_eq!(kind, FileKind::Image);
    }

    #[test]
    fn test_object_key_rejects_disallowed() {
        let store = s3_store(None);
        let err = store.object_key("setup.exe", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::DisallowedType { .. }));
    }

    #[test]
    fn test_public_url_derivation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let local = local_store(dir.path());
        assert_eq!(
            local.public_url("images/cat.jpg"),
            "/static/uploads/images/cat.jpg"
        );

        let s3 = s3_store(None);
        assert_eq!(
            s3.public_url("images/cat.jpg"),
            "https://account.r2.cloudflarestorage.com/media/images/cat.jpg"
        );

        let cdn = s3_store(Some("https://cdn.example.com/"));
        assert_eq!(
            cdn.public_url("images/cat.jpg"),
            "https://cdn.example.com/images/cat.jpg"
        );
    }

    #[test]
    fn test_key_from_reference_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = local_store(dir.path());

        let key = "videos/clip.mp4";
        let url = store.public_url(key);
        assert_eq!(store.key_from_reference(&url).expect("resolves"), key);

        // bare keys pass through
        assert_eq!(store.key_from_reference(key).expect("resolves"), key);

        let err = store
            .key_from_reference("https://elsewhere.example.com/clip.mp4")
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_local_store_and_remove_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = local_store(dir.path());

        let stored = store
            .store(Bytes::from_static(b"not really a jpeg"), "cat.jpg", Uuid::new_v4())
            .await
            .expect("store should succeed");

        assert_eq!(stored.url, "/static/uploads/images/cat.jpg");
        assert_eq!(stored.kind, FileKind::Image);
        assert!(dir.path().join("images/cat.jpg").exists());

        store.remove(&stored.url).await.expect("remove should succeed");
        assert!(!dir.path().join("images/cat.jpg").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_object_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = local_store(dir.path());

        let err = store
            .remove("/static/uploads/images/never-stored.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_store_rejects_disallowed_and_oversize() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = local_store(dir.path());

        let err = store
            .store(Bytes::from_static(b"MZ"), "setup.exe", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DisallowedType { .. }));

        let config = StorageConfig::new(StorageProvider::local_fs(dir.path(), "/static/uploads"))
            .with_max_file_size(4);
        let tiny = MediaStore::from_config(config).expect("store should build");
        let err = tiny
            .store(Bytes::from_static(b"way too big"), "cat.jpg", Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }
}
