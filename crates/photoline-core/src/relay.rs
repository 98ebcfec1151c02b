//! Blob relay: accept raw bytes, store them under a collision-resistant
//! name, hand back the permanent CDN URL.

use std::sync::Arc;

use async_trait::async_trait;
use rand::RngCore;
use tracing::{debug, info};

use crate::error::RelayError;

/// Opaque "put blob" service. S3 in production, recorded puts in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), RelayError>;
}

/// S3-backed object store.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    /// Build the client from the standard AWS environment/profile chain.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), RelayError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type("image/png")
            .send()
            .await
            .map_err(|e| RelayError::Upload(e.to_string()))?;
        Ok(())
    }
}

/// Uploads received binaries and derives their public URL from the
/// configured CDN domain.
pub struct BlobRelay {
    store: Arc<dyn ObjectStore>,
    cdn_domain: String,
}

impl BlobRelay {
    pub fn new(store: Arc<dyn ObjectStore>, cdn_domain: impl Into<String>) -> Self {
        Self {
            store,
            cdn_domain: cdn_domain.into(),
        }
    }

    /// Store `bytes` and return the permanent public URL.
    ///
    /// The object name is always freshly generated; `suggested_name` is
    /// never used for naming, so senders cannot influence the key space.
    /// Upload failure is a hard error and no URL is produced.
    pub async fn store(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<String, RelayError> {
        let name = random_object_name();
        debug!(
            "Relaying {} bytes (suggested '{}') as {}",
            bytes.len(),
            suggested_name,
            name
        );
        self.store.put(&name, bytes).await?;
        let url = format!("https://{}/{}", self.cdn_domain, name);
        info!("Blob stored at {}", url);
        Ok(url)
    }
}

/// 16 hex chars from the thread-local CSPRNG, plus the fixed extension.
fn random_object_name() -> String {
    let mut buf = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut buf);
    format!("{}.png", hex::encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingStore {
        puts: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), RelayError> {
            self.puts.lock().unwrap().push((key.to_string(), bytes));
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ObjectStore for FailingStore {
        async fn put(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), RelayError> {
            Err(RelayError::Upload("boom".to_string()))
        }
    }

    #[test]
    fn test_object_name_shape() {
        let name = random_object_name();
        assert!(name.ends_with(".png"));
        let stem = name.trim_end_matches(".png");
        assert_eq!(stem.len(), 16);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_object_names_differ() {
        assert_ne!(random_object_name(), random_object_name());
    }

    #[tokio::test]
    async fn test_store_ignores_suggested_name() {
        let recording = Arc::new(RecordingStore {
            puts: Mutex::new(Vec::new()),
        });
        let relay = BlobRelay::new(recording.clone(), "cdn.example.com");

        let url = relay
            .store(vec![1, 2, 3], "../../etc/passwd")
            .await
            .unwrap();

        let puts = recording.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        let (key, bytes) = &puts[0];
        assert!(!key.contains("passwd"));
        assert_eq!(*bytes, vec![1, 2, 3]);
        assert_eq!(url, format!("https://cdn.example.com/{}", key));
    }

    #[tokio::test]
    async fn test_upload_failure_returns_no_url() {
        let relay = BlobRelay::new(Arc::new(FailingStore), "cdn.example.com");
        assert!(matches!(
            relay.store(vec![0], "x").await,
            Err(RelayError::Upload(_))
        ));
    }
}
