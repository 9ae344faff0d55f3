/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::pipeline::export::ExportedFile;
use crate::storage::ObjectStore;
use crate::storage::PRESIGN_EXPIRY;
use crate::utils::filename::{dated_object_key, latest_object_key, sanitize_name};
use chrono::{DateTime, Local};
use log::debug;
use std::io::Error;

const S3_SCHEME: &str = "s3://";

#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub bucket: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub bucket: String,
    pub dated_key: String,
    pub latest_key: String,
    pub presigned_url: String,
}

/// Splits `s3://bucket/prefix/` into bucket and prefix (trailing `/` dropped).
pub fn parse_destination(uri: &str) -> Result<Destination, Error> {
    let invalid = |reason: &str| Error::other(format!("Invalid S3 URL {}: {}", uri, reason));

    let path = uri
        .strip_prefix(S3_SCHEME)
        .ok_or_else(|| invalid("expected s3://bucket/prefix"))?;
    let (bucket, prefix) = path
        .split_once('/')
        .ok_or_else(|| invalid("missing key prefix"))?;
    let prefix = prefix.trim_end_matches('/');

    if bucket.is_empty() {
        return Err(invalid("missing bucket"));
    }
    if prefix.is_empty() {
        return Err(invalid("missing key prefix"));
    }

    Ok(Destination {
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
    })
}

/// Uploads the dated copy, overwrites the latest copy, then presigns the latest copy.
pub fn upload_file(
    store: &dyn ObjectStore,
    destination: &Destination,
    file: &ExportedFile,
    now: &DateTime<Local>,
) -> Result<UploadRecord, Error> {
    let name = sanitize_name(&file.query);

    let dated_key = dated_object_key(&destination.prefix, now, &name);
    println!("Upload to {}", dated_key);
    store
        .put_object(&destination.bucket, &dated_key, &file.path)
        .map_err(|e| Error::other(format!("Error uploading file to S3: {}", e)))?;

    let latest_key = latest_object_key(&destination.prefix, &name);
    println!("Upload to {}", latest_key);
    store
        .put_object(&destination.bucket, &latest_key, &file.path)
        .map_err(|e| Error::other(format!("Error uploading 'latest' file to S3: {}", e)))?;

    let presigned_url = store
        .presign_get(&destination.bucket, &latest_key, PRESIGN_EXPIRY)
        .map_err(|e| Error::other(format!("Error generating pre-signed URL: {}", e)))?;
    debug!("presigned s3://{}/{}", destination.bucket, latest_key);

    Ok(UploadRecord {
        bucket: destination.bucket.clone(),
        dated_key,
        latest_key,
        presigned_url,
    })
}

#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;
