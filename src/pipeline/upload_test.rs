//! Tests for the storage upload sequence in pipeline::upload

use super::*;
use chrono::TimeZone;
use regex::Regex;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Default)]
struct MemoryStore {
    puts: RefCell<Vec<(String, String)>>,
    presigned: RefCell<Vec<(String, String, Duration)>>,
    fail_put: Option<usize>,
    fail_presign: bool,
}

impl ObjectStore for MemoryStore {
    fn put_object(&self, bucket: &str, key: &str, _path: &Path) -> Result<(), Error> {
        if self.fail_put == Some(self.puts.borrow().len()) {
            return Err(Error::other("access denied"));
        }
        self.puts
            .borrow_mut()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, Error> {
        if self.fail_presign {
            return Err(Error::other("no credentials"));
        }
        self.presigned
            .borrow_mut()
            .push((bucket.to_string(), key.to_string(), expires_in));
        Ok(format!("https://{}.s3.amazonaws.com/{}?X-Amz-Signature=abc", bucket, key))
    }
}

fn exported(query: &str) -> ExportedFile {
    ExportedFile {
        index: 1,
        query: query.to_string(),
        path: PathBuf::from("out_1.csv"),
        rows: 2,
    }
}

fn destination(uri: &str) -> Destination {
    parse_destination(uri).unwrap()
}

#[test]
fn test_parse_destination() {
    let destination = parse_destination("s3://bucket/folder/").unwrap();
    assert_eq!(destination.bucket, "bucket");
    assert_eq!(destination.prefix, "folder");

    let destination = parse_destination("s3://bucket/a/b").unwrap();
    assert_eq!(destination.prefix, "a/b");
}

#[test]
fn test_parse_destination_keeps_scheme_characters_in_names() {
    // names made of the scheme's characters survive the single prefix strip
    let destination = parse_destination("s3://s3bucket/s3/").unwrap();
    assert_eq!(destination.bucket, "s3bucket");
    assert_eq!(destination.prefix, "s3");
}

#[test]
fn test_parse_destination_malformed() {
    for uri in ["s3://onlybucket", "s3://bucket/", "s3:///folder", "bucket/folder", "", "s3://"] {
        assert!(parse_destination(uri).is_err(), "expected error for {:?}", uri);
    }
}

#[test]
fn test_upload_file_keys_and_presign() {
    let store = MemoryStore::default();
    let now = Local.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();

    let folder = destination("s3://bucket/folder/");
    let record = upload_file(&store, &folder, &exported("node_up"), &now).unwrap();

    assert_eq!(record.bucket, "bucket");
    assert_eq!(record.dated_key, "folder/01-06-2024-09-30-node_up.csv");
    assert_eq!(record.latest_key, "folder/latest-node_up.csv");
    assert!(record.presigned_url.contains("bucket"));
    assert!(record.presigned_url.contains("folder/latest-node_up.csv"));

    let pattern = Regex::new(r"^folder/\d{2}-\d{2}-\d{4}-\d{2}-\d{2}-node_up\.csv$").unwrap();
    assert!(pattern.is_match(&record.dated_key));

    let puts = store.puts.borrow();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].1, record.dated_key);
    assert_eq!(puts[1].1, record.latest_key);

    let presigned = store.presigned.borrow();
    assert_eq!(presigned.len(), 1);
    assert_eq!(presigned[0].1, "folder/latest-node_up.csv");
    assert_eq!(presigned[0].2, Duration::from_secs(604_800));
}

#[test]
fn test_upload_file_sanitizes_query() {
    let store = MemoryStore::default();
    let record = upload_file(
        &store,
        &destination("s3://bucket/reports"),
        &exported(r#"sum(rate(x{job="a b"}[5m]))"#),
        &Local::now(),
    )
    .unwrap();
    assert_eq!(record.latest_key, "reports/latest-sum_rate_x_job_a_b_5m_.csv");
}

#[test]
fn test_parse_destination_error_names_uri() {
    let error = parse_destination("s3://onlybucket").unwrap_err();
    assert!(error.to_string().starts_with("Invalid S3 URL s3://onlybucket"));
}

#[test]
fn test_upload_file_stops_after_failed_put() {
    let folder = destination("s3://bucket/folder");
    let store = MemoryStore {
        fail_put: Some(0),
        ..MemoryStore::default()
    };
    let error = upload_file(&store, &folder, &exported("up"), &Local::now()).unwrap_err();
    assert!(error.to_string().starts_with("Error uploading file to S3"));
    assert!(store.puts.borrow().is_empty());
    assert!(store.presigned.borrow().is_empty());

    let store = MemoryStore {
        fail_put: Some(1),
        ..MemoryStore::default()
    };
    let error = upload_file(&store, &folder, &exported("up"), &Local::now()).unwrap_err();
    assert!(error.to_string().starts_with("Error uploading 'latest' file"));
    assert_eq!(store.puts.borrow().len(), 1);
    assert!(store.presigned.borrow().is_empty());
}

#[test]
fn test_upload_file_presign_failure() {
    let folder = destination("s3://bucket/folder");
    let store = MemoryStore {
        fail_presign: true,
        ..MemoryStore::default()
    };
    let error = upload_file(&store, &folder, &exported("up"), &Local::now()).unwrap_err();
    assert!(error.to_string().starts_with("Error generating pre-signed URL"));
    assert_eq!(store.puts.borrow().len(), 2);
}
