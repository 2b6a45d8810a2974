use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use eyre::{Result, WrapErr};
use log::{debug, info};

use crate::config::StorageConfig;
use crate::providers::ArtifactStore;
use crate::whisper::mime_for;

/// Audio artifacts copied to an S3-compatible bucket
pub struct S3Store {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Store {
    /// Build a client from the usual AWS credential chain plus `config`
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            // MinIO and similar servers don't do virtual-hosted buckets
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        debug!("Object storage: bucket {} prefix {:?}", config.bucket, config.prefix);

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            prefix: config.prefix.clone(),
        }
    }
}

fn object_key(prefix: &str, file_name: &str) -> String {
    format!("{prefix}{file_name}")
}

#[async_trait]
impl ArtifactStore for S3Store {
    async fn store(&self, file_name: &str, audio: &[u8]) -> Result<String> {
        let key = object_key(&self.prefix, file_name);
        let location = format!("s3://{}/{key}", self.bucket);
        info!("Uploading audio to {location}");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(audio.to_vec()))
            .content_type(mime_for(file_name))
            .send()
            .await
            .wrap_err_with(|| format!("failed to upload {location}"))?;

        Ok(location)
    }
}
