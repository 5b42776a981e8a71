//! S3-compatible storage backend (AWS S3, Cloudflare R2, MinIO) using the AWS SDK.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::instrument;

use super::validate_key;
use crate::domain::StorageError;
use crate::domain::repositories::ObjectStore;

/// Region name R2 expects; it ignores the value but the signer needs one.
pub const R2_REGION: &str = "auto";

/// Connection settings for an S3-compatible bucket.
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Use `endpoint/bucket/key` URLs instead of `bucket.endpoint/key`.
    /// Required for MinIO; R2 and AWS accept virtual-hosted style.
    pub force_path_style: bool,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("force_path_style", &self.force_path_style)
            .finish_non_exhaustive()
    }
}

impl S3Config {
    /// Account-scoped Cloudflare R2 API endpoint.
    pub fn r2_endpoint(account_id: &str) -> String {
        format!("https://{account_id}.r2.cloudflarestorage.com")
    }
}

/// S3-compatible object store using AWS SDK.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl S3ObjectStore {
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Config("s3 bucket name is empty".to_string()));
        }
        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(StorageError::Config(
                "s3 config requires both access_key_id and secret_access_key".to_string(),
            ));
        }

        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None, // session token
            None, // expiration
            "pngcatalog-config",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style)
            // Uploader owns the retry policy
            .retry_config(RetryConfig::disabled());

        if let Some(endpoint) = config.endpoint {
            // Bare host:port endpoints (e.g. "minio:9000") default to plain HTTP
            let lower = endpoint.to_ascii_lowercase();
            let endpoint = if lower.starts_with("http://") || lower.starts_with("https://") {
                endpoint
            } else {
                format!("http://{endpoint}")
            };
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        })
    }

    fn map_sdk_error<E>(err: SdkError<E>, key: &str) -> StorageError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        if let SdkError::ServiceError(service_err) = &err {
            match service_err.raw().status().as_u16() {
                status @ (401 | 403) => {
                    return StorageError::Unauthorized(format!(
                        "request for {key} rejected with status {status}"
                    ));
                }
                404 => return StorageError::NotFound(key.to_string()),
                _ => {}
            }
        }
        StorageError::Backend(Box::new(err))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, data), fields(backend = "s3", bucket = %self.bucket, size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| Self::map_sdk_error(err, key))?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "s3", bucket = %self.bucket))]
    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Self::map_sdk_error(err, key))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| StorageError::Backend(Box::new(err)))?
            .into_bytes();

        Ok(bytes)
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
