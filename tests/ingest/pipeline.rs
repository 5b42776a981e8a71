use image::{GenericImageView, ImageFormat};
use pngcatalog::application::services::{FileError, FileOutcome, IngestError, IngestOptions};
use pngcatalog::domain::RepositoryError;
use pngcatalog::domain::repositories::ObjectStore;
use pngcatalog::infrastructure::image_processing::ImageProcessingError;

use crate::helpers::{PUBLIC_URL, TestContext, is_asset_url};

const FAIL_FAST: IngestOptions = IngestOptions { fail_fast: true };

#[tokio::test]
async fn ingesting_a_png_uploads_three_blobs_and_saves_a_record() {
    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 1600, 800);

    let report = ctx
        .service(IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .expect("ingestion should run");

    assert_eq!(report.succeeded(), 1);
    assert!(report.is_success());

    let png = report.ingested().next().expect("one png ingested").clone();
    assert_eq!(png.slug, "red-apple");
    assert_eq!(png.title, "red apple");
    assert_eq!(png.alt, "red apple png");
    assert_eq!(png.tags[0], "red apple png");
    assert_eq!((png.width, png.height), (1600, 800));
    assert_eq!(png.downloads, 0);
    assert!(is_asset_url(&png.original_url, PUBLIC_URL, "originals", "red-apple", "png"));
    assert!(is_asset_url(&png.preview_url, PUBLIC_URL, "previews", "red-apple", "webp"));
    assert!(is_asset_url(&png.thumb_url, PUBLIC_URL, "thumbs", "red-apple", "webp"));

    let keys = ctx.store.keys().await;
    assert_eq!(keys.len(), 3);
    let key_for = |folder: &str| {
        keys.iter()
            .find(|key| key.starts_with(folder))
            .expect("key for folder")
            .clone()
    };

    let original_key = key_for("originals/");
    assert_eq!(ctx.store.content_type(&original_key).await.as_deref(), Some("image/png"));
    let original = ctx.store.get(&original_key).await.unwrap();
    assert_eq!(original.as_ref(), std::fs::read(ctx.path().join("red-apple.png")).unwrap());

    let preview_key = key_for("previews/");
    assert_eq!(ctx.store.content_type(&preview_key).await.as_deref(), Some("image/webp"));
    let preview = image::load_from_memory_with_format(
        &ctx.store.get(&preview_key).await.unwrap(),
        ImageFormat::WebP,
    )
    .unwrap();
    assert_eq!(preview.dimensions(), (1200, 600));

    let thumb = image::load_from_memory(&ctx.store.get(&key_for("thumbs/")).await.unwrap()).unwrap();
    assert_eq!(thumb.dimensions(), (400, 200));

    // All three keys share one prefix.
    let prefix = original_key
        .strip_prefix("originals/")
        .and_then(|key| key.strip_suffix(".png"))
        .unwrap();
    assert_eq!(preview_key, format!("previews/{prefix}.webp"));

    let stored = ctx.repo.get_by_slug("red-apple").await.unwrap();
    assert_eq!(stored, png);
}

#[tokio::test]
async fn only_png_files_are_processed_in_name_order() {
    let ctx = TestContext::new().await;
    ctx.write_png("b-second.png", 10, 10);
    ctx.write_png("A-First.PNG", 10, 10);
    ctx.write_file("notes.txt", b"not an image");
    ctx.write_file("photo.jpg", b"not a png either");
    std::fs::create_dir(ctx.path().join("nested.png")).unwrap();

    let report = ctx
        .service(IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    let files: Vec<&str> = report.outcomes.iter().map(FileOutcome::file).collect();
    assert_eq!(files, vec!["A-First.PNG", "b-second.png"]);
    let slugs: Vec<&str> = report.ingested().map(|png| png.slug.as_str()).collect();
    assert_eq!(slugs, vec!["a-first", "b-second"]);
    assert!(report.is_success());
}

#[tokio::test]
async fn files_with_the_same_normalized_name_conflict() {
    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 10, 10);
    ctx.write_png("red_apple.png", 10, 10);

    let report = ctx
        .service(IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "red_apple.png");
    assert!(matches!(
        failures[0].1,
        FileError::Persist(RepositoryError::Conflict(_))
    ));

    // Blobs of the rejected file stay behind under their own prefix.
    assert_eq!(ctx.store.keys().await.len(), 6);
    assert_eq!(ctx.repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn a_corrupt_file_does_not_stop_the_batch() {
    let ctx = TestContext::new().await;
    ctx.write_file("a-broken.png", b"definitely not a png");
    ctx.write_png("b-good.png", 10, 10);

    let report = ctx
        .service(IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.succeeded(), 1);
    assert!(!report.is_success());
    let (file, error) = report.failures().next().unwrap();
    assert_eq!(file, "a-broken.png");
    assert!(matches!(error, FileError::Decode(ImageProcessingError::Decode(_))));

    // Decoding happens before any upload.
    let keys = ctx.store.keys().await;
    assert_eq!(keys.len(), 3);
    assert!(keys.iter().all(|key| key.contains("-b-good.")));
}

#[tokio::test]
async fn fail_fast_stops_at_the_first_failure() {
    let ctx = TestContext::new().await;
    ctx.write_file("a-broken.png", b"definitely not a png");
    ctx.write_png("b-good.png", 10, 10);
    ctx.write_png("c-good.png", 10, 10);

    let report = ctx
        .service(FAIL_FAST)
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.not_processed, vec!["b-good.png", "c-good.png"]);
    assert_eq!(report.total(), 3);
    assert!(ctx.store.keys().await.is_empty());
    assert!(ctx.repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn names_without_usable_characters_are_rejected_before_upload() {
    let ctx = TestContext::new().await;
    ctx.write_png("!!!.png", 10, 10);

    let report = ctx
        .service(IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    let (_, error) = report.failures().next().unwrap();
    assert!(matches!(error, FileError::EmptySlug));
    assert!(ctx.store.keys().await.is_empty());
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let ctx = TestContext::new().await;
    let missing = ctx.path().join("does-not-exist");

    let err = ctx
        .service(IngestOptions::default())
        .ingest_directory(&missing)
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::MissingDirectory(path) if path == missing));
}

#[tokio::test]
async fn a_file_path_is_not_a_directory() {
    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 10, 10);

    let err = ctx
        .service(IngestOptions::default())
        .ingest_directory(&ctx.path().join("red-apple.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::MissingDirectory(_)));
}

#[tokio::test]
async fn an_empty_directory_produces_an_empty_report() {
    let ctx = TestContext::new().await;

    let report = ctx
        .service(IngestOptions::default())
        .ingest_directory(ctx.path())
        .await
        .unwrap();

    assert_eq!(report.total(), 0);
    assert!(report.is_success());
}

#[tokio::test]
async fn ingesting_the_same_directory_twice_keeps_distinct_keys() {
    let ctx = TestContext::new().await;
    ctx.write_png("red-apple.png", 10, 10);
    let service = ctx.service(IngestOptions::default());

    service.ingest_directory(ctx.path()).await.unwrap();
    let second = service.ingest_directory(ctx.path()).await.unwrap();

    // The record already exists, but the new blobs never overwrite the old ones.
    assert_eq!(second.failed(), 1);
    assert_eq!(ctx.store.keys().await.len(), 6);
}
