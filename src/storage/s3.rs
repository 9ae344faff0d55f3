/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::storage::ObjectStore;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use log::debug;
use std::io::Error;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Blocking facade over the async S3 client.
pub struct S3Store {
    runtime: Runtime,
    client: aws_sdk_s3::Client,
}

fn new_runtime() -> Result<Runtime, Error> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

impl S3Store {
    /// Credentials come from the default provider chain; `region` overrides it when set.
    pub fn new(region: Option<&str>, endpoint: Option<&str>) -> Result<Self, Error> {
        let runtime = new_runtime()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let shared_config = runtime.block_on(loader.load());
        if shared_config.region().is_none() {
            return Err(Error::other("no AWS region configured, use --region"));
        }

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = endpoint {
            debug!("s3 endpoint override {}", endpoint);
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            runtime,
            client: aws_sdk_s3::Client::from_conf(builder.build()),
        })
    }

    pub fn from_conf(config: aws_sdk_s3::Config) -> Result<Self, Error> {
        Ok(Self {
            runtime: new_runtime()?,
            client: aws_sdk_s3::Client::from_conf(config),
        })
    }
}

impl ObjectStore for S3Store {
    fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<(), Error> {
        self.runtime.block_on(async {
            let body = ByteStream::from_path(path)
                .await
                .map_err(|e| Error::other(format!("unable to read {}: {}", path.display(), e)))?;

            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type("text/csv")
                .body(body)
                .send()
                .await
                .map_err(|e| {
                    Error::other(format!(
                        "s3://{}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&e)
                    ))
                })?;

            debug!("put s3://{}/{}", bucket, key);
            Ok(())
        })
    }

    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, Error> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| Error::other(format!("invalid presign expiry: {}", e)))?;

        let request = self
            .runtime
            .block_on(
                self.client
                    .get_object()
                    .bucket(bucket)
                    .key(key)
                    .presigned(presigning),
            )
            .map_err(|e| {
                Error::other(format!(
                    "s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(request.uri().to_string())
    }
}
