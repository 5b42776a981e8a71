use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use pngcatalog::application::services::{FileError, IngestOptions, RetryPolicy};
use pngcatalog::domain::StorageError;
use pngcatalog::domain::repositories::ObjectStore;
use pngcatalog::infrastructure::storage::{FilesystemObjectStore, S3Config, S3ObjectStore};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{PUBLIC_URL, TestContext, is_asset_url};

const BUCKET: &str = "pngs";

fn s3_store(server: &MockServer) -> Arc<S3ObjectStore> {
    Arc::new(
        S3ObjectStore::new(S3Config {
            bucket: BUCKET.to_string(),
            endpoint: Some(server.uri()),
            region: "us-east-1".to_string(),
            access_key_id: "test-key".to_string(),
            secret_access_key: "test-secret".to_string(),
            force_path_style: true,
        })
        .expect("valid s3 config"),
    )
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn filesystem_store_writes_blobs_below_its_root() {
    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 20, 20);
    let root = tempfile::tempdir().unwrap();
    let store = Arc::new(FilesystemObjectStore::new(root.path()));

    let report = ctx
        .service_with_store(store.clone(), RetryPolicy::none(), IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    let png = report.ingested().next().unwrap();
    let key = png.original_url.strip_prefix(&format!("{PUBLIC_URL}/")).unwrap();
    let on_disk = std::fs::read(root.path().join(key)).unwrap();
    assert_eq!(on_disk, std::fs::read(ctx.path().join("red-apple.png")).unwrap());

    for folder in ["originals", "previews", "thumbs"] {
        assert_eq!(std::fs::read_dir(root.path().join(folder)).unwrap().count(), 1);
    }
}

#[tokio::test]
async fn filesystem_store_overwrites_and_reports_missing_keys() {
    let root = tempfile::tempdir().unwrap();
    let store = FilesystemObjectStore::new(root.path());

    store
        .put("thumbs/a.webp", Bytes::from_static(b"first"), "image/webp")
        .await
        .unwrap();
    store
        .put("thumbs/a.webp", Bytes::from_static(b"second"), "image/webp")
        .await
        .unwrap();

    assert_eq!(store.get("thumbs/a.webp").await.unwrap(), "second");
    assert!(matches!(
        store.get("thumbs/missing.webp").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        store.put("../escape.png", Bytes::new(), "image/png").await,
        Err(StorageError::InvalidKey(_))
    ));
}

#[tokio::test]
async fn s3_store_puts_every_blob_with_its_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/pngs/originals/\d+-red-apple\.png$"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/pngs/(previews|thumbs)/\d+-red-apple\.webp$"))
        .and(header("content-type", "image/webp"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 20, 20);

    let report = ctx
        .service_with_store(s3_store(&server), RetryPolicy::none(), IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    assert!(report.is_success());
    let png = report.ingested().next().unwrap();
    assert!(is_asset_url(&png.thumb_url, PUBLIC_URL, "thumbs", "red-apple", "webp"));
}

#[tokio::test]
async fn s3_store_reads_objects_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pngs/thumbs/1-a.webp"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"webp-bytes".to_vec()))
        .mount(&server)
        .await;

    let store = s3_store(&server);

    assert_eq!(store.get("thumbs/1-a.webp").await.unwrap(), "webp-bytes");
}

#[tokio::test]
async fn s3_access_denied_fails_the_file_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("content-type", "application/xml")
                .set_body_string(
                    "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 20, 20);

    let report = ctx
        .service_with_store(s3_store(&server), fast_retry(3), IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    let (_, error) = report.failures().next().unwrap();
    match error {
        FileError::Upload { key, source } => {
            assert!(key.starts_with("originals/"));
            assert!(matches!(source, StorageError::Unauthorized(_)));
        }
        other => panic!("expected upload failure, got {other:?}"),
    }
    assert!(ctx.repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn s3_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 20, 20);

    let report = ctx
        .service_with_store(s3_store(&server), fast_retry(2), IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    let (_, error) = report.failures().next().unwrap();
    assert!(matches!(
        error,
        FileError::Upload {
            source: StorageError::Backend(_),
            ..
        }
    ));
}
