use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use pngcatalog::application::services::{IngestOptions, IngestService, RetryPolicy, Uploader};
use pngcatalog::domain::repositories::{ObjectStore, PngRepository};
use pngcatalog::infrastructure::database::Database;
use pngcatalog::infrastructure::repositories::pngs::SqlPngRepository;
use pngcatalog::infrastructure::storage::MemoryObjectStore;
use tempfile::TempDir;

pub const PUBLIC_URL: &str = "https://pub-test.r2.dev";

/// Half opaque, half transparent RGBA PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([200u8, 30, 30, 255])
        } else {
            Rgba([0u8, 0, 0, 0])
        }
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode test PNG");
    buf.into_inner()
}

/// `{base}/{folder}/{digits}-{slug}.{ext}`
pub fn is_asset_url(url: &str, base: &str, folder: &str, slug: &str, ext: &str) -> bool {
    url.strip_prefix(&format!("{base}/{folder}/"))
        .and_then(|rest| rest.strip_suffix(&format!("-{slug}.{ext}")))
        .is_some_and(|millis| !millis.is_empty() && millis.bytes().all(|b| b.is_ascii_digit()))
}

pub struct TestContext {
    pub dir: TempDir,
    pub repo: Arc<dyn PngRepository>,
    pub store: Arc<MemoryObjectStore>,
}

impl TestContext {
    pub async fn new() -> Self {
        let database = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
            repo: Arc::new(SqlPngRepository::new(database.clone_pool())),
            store: Arc::new(MemoryObjectStore::new()),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_png(&self, name: &str, width: u32, height: u32) {
        self.write_file(name, &png_bytes(width, height));
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.dir.path().join(name), contents).expect("Failed to write test file");
    }

    pub fn service(&self, options: IngestOptions) -> IngestService {
        self.service_with_store(self.store.clone(), RetryPolicy::none(), options)
    }

    pub fn service_with_store(
        &self,
        store: Arc<dyn ObjectStore>,
        retry: RetryPolicy,
        options: IngestOptions,
    ) -> IngestService {
        IngestService::new(
            self.repo.clone(),
            Uploader::new(store, PUBLIC_URL, retry),
            options,
        )
    }
}
