//! Blob store adapter. Images live in a private S3 bucket; the database only
//! ever holds opaque object keys, and every key surfaced to a client is first
//! exchanged for a short-lived presigned URL.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;

use crate::errors::ApiError;

const SIGNED_URL_TTL: Duration = Duration::from_secs(60);
// A slow signer must not hang the whole response.
const SIGN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct BlobStore {
    client: Client,
    bucket: String,
}

impl BlobStore {
    pub async fn new(bucket: String) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        BlobStore {
            client: Client::new(&config),
            bucket,
        }
    }

    // Uploads the file and returns the object key to store, never a URL.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        let key = object_key(filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|err| {
                log::error!("Image upload failed: {}", err);
                ApiError::Internal("Image upload failed".to_string())
            })?;

        Ok(key)
    }

    // Exchanges an object key for a presigned GET URL. Legacy records that
    // already store an absolute URL pass through unchanged. Any failure is
    // logged and yields None; the stored key is never handed out.
    pub async fn signed_url(&self, value: &str) -> Option<String> {
        if is_absolute_url(value) {
            return Some(value.to_string());
        }

        let presigning = match PresigningConfig::expires_in(SIGNED_URL_TTL) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to sign {}: {}", value, err);
                return None;
            }
        };

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(value)
            .presigned(presigning);

        match tokio::time::timeout(SIGN_TIMEOUT, request).await {
            Ok(Ok(presigned)) => Some(presigned.uri().to_string()),
            Ok(Err(err)) => {
                log::warn!("Failed to sign {}: {}", value, err);
                None
            }
            Err(_) => {
                log::warn!("Signing {} timed out", value);
                None
            }
        }
    }
}

pub fn is_absolute_url(value: &str) -> bool {
    value.starts_with("http")
}

// products/<millis>-<name>, with whitespace runs collapsed to underscores.
pub fn object_key(filename: &str) -> String {
    let safe_name = if filename.trim().is_empty() {
        "image".to_string()
    } else {
        filename.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!("products/{}-{}", Utc::now().timestamp_millis(), safe_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_are_recognized() {
        assert!(is_absolute_url("http://example.com/a.png"));
        assert!(is_absolute_url("https://example.com/a.png"));
        assert!(!is_absolute_url("products/123-a.png"));
    }

    #[test]
    fn object_keys_live_under_products_and_keep_the_name() {
        let key = object_key("photo.png");
        assert!(key.starts_with("products/"));
        assert!(key.ends_with("-photo.png"));
    }

    #[test]
    fn whitespace_in_filenames_collapses_to_underscores() {
        let key = object_key("my  product   shot.png");
        assert!(key.ends_with("-my_product_shot.png"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn empty_filenames_get_a_placeholder() {
        let key = object_key("   ");
        assert!(key.ends_with("-image"));
    }
}
