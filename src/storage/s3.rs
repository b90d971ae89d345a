// file: src/storage/s3.rs
// description: S3-backed object store used for requests and uploads
// reference: https://docs.rs/aws-sdk-s3

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::storage::object_store::{ObjectStore, StoredObject};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::{debug, info};

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
}

impl S3ObjectStore {
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = crate::aws::sdk_config(&config.aws).await;
        Self::with_client(
            Client::new(&sdk_config),
            config.storage.bucket.clone(),
            config.aws.region.clone(),
        )
    }

    pub fn with_client(client: Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| PipelineError::Storage(format!("put '{key}': {e}")))?;

        debug!("Stored s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let body = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| PipelineError::Storage(format!("read '{key}': {e}")))?;
                Ok(Some(body.into_bytes().to_vec()))
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(PipelineError::Storage(format!("get '{key}': {service}")))
                }
            }
        }
    }

    async fn ensure_ready(&self) -> Result<()> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            debug!("Bucket {} already exists", self.bucket);
            return Ok(());
        }

        let mut create = self.client.create_bucket().bucket(&self.bucket);
        // us-east-1 rejects an explicit location constraint
        if self.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            create = create.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        match create.send().await {
            Ok(_) => {
                info!("Created bucket {} in {}", self.bucket, self.region);
                Ok(())
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_bucket_already_owned_by_you() || service.is_bucket_already_exists() {
                    Ok(())
                } else {
                    Err(PipelineError::Storage(format!(
                        "create bucket '{}': {service}",
                        self.bucket
                    )))
                }
            }
        }
    }

    async fn probe(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| PipelineError::Storage(format!("bucket '{}': {e}", self.bucket)))?;
        Ok(())
    }

    fn stored_object(&self, key: &str) -> Option<StoredObject> {
        Some(StoredObject {
            bucket: self.bucket.clone(),
            key: key.to_string(),
        })
    }

    fn location(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}
