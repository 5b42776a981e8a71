use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::services::uploader::Uploader;
use crate::domain::pngs::{AssetUrls, NewPng, Png};
use crate::domain::repositories::PngRepository;
use crate::domain::seo::derive_seo;
use crate::domain::{RepositoryError, StorageError};
use crate::infrastructure::image_processing::{ImageProcessingError, derive_variants};

const IMAGE_EXTENSION: &str = ".png";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ingestion directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to list {}: {source}", path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single file could not be ingested.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read file: {0}")]
    Read(#[source] std::io::Error),
    #[error("file name does not produce a usable slug")]
    EmptySlug,
    #[error("failed to process image: {0}")]
    Decode(#[from] ImageProcessingError),
    #[error("image processing task failed: {0}")]
    ProcessingTask(#[from] tokio::task::JoinError),
    #[error("failed to upload {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },
    #[error("failed to save catalog record: {0}")]
    Persist(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOptions {
    /// Stop at the first failing file instead of moving on to the next one.
    pub fail_fast: bool,
}

#[derive(Debug)]
pub enum FileOutcome {
    Ingested { file: String, png: Png },
    Failed { file: String, error: FileError },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Ingested { file, .. } | Self::Failed { file, .. } => file,
        }
    }
}

/// Result of one batch, in processing order.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<FileOutcome>,
    /// Files skipped because a fail-fast batch stopped early.
    pub not_processed: Vec<String>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.outcomes.len() + self.not_processed.len()
    }

    pub fn succeeded(&self) -> usize {
        self.ingested().count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.not_processed.is_empty()
    }

    pub fn ingested(&self) -> impl Iterator<Item = &Png> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Ingested { png, .. } => Some(png),
            FileOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &FileError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Failed { file, error } => Some((file.as_str(), error)),
            FileOutcome::Ingested { .. } => None,
        })
    }
}

/// Millisecond timestamps for storage keys, strictly increasing per clock.
///
/// Falls back to `last + 1` when the wall clock has not moved (or went
/// backwards), so two files never share a key prefix within one process.
#[derive(Debug, Default)]
pub struct KeyClock {
    last: AtomicI64,
}

impl KeyClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.next_after(Utc::now().timestamp_millis())
    }

    fn next_after(&self, now: i64) -> i64 {
        let mut previous = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(previous.saturating_add(1));
            match self.last.compare_exchange(
                previous,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}

/// Object keys for one ingested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub original: String,
    pub preview: String,
    pub thumb: String,
}

impl StorageKeys {
    /// Keys for the prefix `{millis}-{slug}`.
    pub fn new(millis: i64, slug: &str) -> Self {
        let prefix = format!("{millis}-{slug}");
        Self {
            original: format!("originals/{prefix}.png"),
            preview: format!("previews/{prefix}.webp"),
            thumb: format!("thumbs/{prefix}.webp"),
        }
    }
}

fn has_image_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(IMAGE_EXTENSION)
}

/// File name without its image extension, matched case-insensitively.
fn file_stem(name: &str) -> &str {
    if has_image_extension(name) {
        &name[..name.len() - IMAGE_EXTENSION.len()]
    } else {
        name
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Image files directly inside `dir`, sorted by file name.
pub async fn discover_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    match tokio::fs::metadata(dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => return Err(IngestError::MissingDirectory(dir.to_path_buf())),
    }

    let read_error = |source| IngestError::ReadDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_error)? {
        let path = entry.path();
        if !has_image_extension(&entry.file_name().to_string_lossy()) {
            continue;
        }
        // Follows symlinks; broken links are skipped rather than failing the batch.
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => warn!(file = %path.display(), error = %err, "skipping unreadable entry"),
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Turns a directory of PNGs into uploaded blobs plus catalog records.
#[derive(Clone)]
pub struct IngestService {
    repo: Arc<dyn PngRepository>,
    uploader: Uploader,
    clock: Arc<KeyClock>,
    options: IngestOptions,
}

impl IngestService {
    pub fn new(repo: Arc<dyn PngRepository>, uploader: Uploader, options: IngestOptions) -> Self {
        Self {
            repo,
            uploader,
            clock: Arc::new(KeyClock::new()),
            options,
        }
    }

    /// Process every image in `dir`, one file at a time.
    #[tracing::instrument(skip(self, dir), fields(directory = %dir.display(), fail_fast = self.options.fail_fast))]
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        let files = discover_files(dir).await?;
        let mut report = IngestReport::default();

        if files.is_empty() {
            warn!("no PNG files found");
            return Ok(report);
        }

        info!(count = files.len(), "starting ingestion");

        let mut remaining = files.into_iter();
        let mut aborted = false;
        for path in remaining.by_ref() {
            let file = display_name(&path);
            info!(file = %file, "processing");

            match self.ingest_file(&path).await {
                Ok(png) => {
                    info!(file = %file, slug = %png.slug, id = %png.id, "ingested");
                    report.outcomes.push(FileOutcome::Ingested { file, png });
                }
                Err(err) => {
                    error!(file = %file, error = %err, "failed to ingest file");
                    report.outcomes.push(FileOutcome::Failed { file, error: err });
                    if self.options.fail_fast {
                        aborted = true;
                        break;
                    }
                }
            }
        }

        if aborted {
            report.not_processed = remaining.map(|path| display_name(&path)).collect();
        }

        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            not_processed = report.not_processed.len(),
            total = report.total(),
            "ingestion finished"
        );

        Ok(report)
    }

    /// Read, derive, upload and persist a single file.
    ///
    /// Uploads that succeed before a later step fails are left in place.
    #[tracing::instrument(skip(self, path), fields(file = %path.display()))]
    pub async fn ingest_file(&self, path: &Path) -> Result<Png, FileError> {
        let name = display_name(path);
        let original = Bytes::from(tokio::fs::read(path).await.map_err(FileError::Read)?);

        let seo = derive_seo(file_stem(&name));
        if seo.is_degenerate() {
            return Err(FileError::EmptySlug);
        }

        let keys = StorageKeys::new(self.clock.next(), &seo.slug);

        let source = original.clone();
        let derived = tokio::task::spawn_blocking(move || derive_variants(&source)).await??;

        let original_url = self.upload(&keys.original, original, "image/png").await?;
        let preview_url = self
            .upload(&keys.preview, Bytes::from(derived.preview), "image/webp")
            .await?;
        let thumb_url = self
            .upload(&keys.thumb, Bytes::from(derived.thumb), "image/webp")
            .await?;

        let new_png = NewPng::from_seo(
            seo,
            AssetUrls {
                original: original_url,
                preview: preview_url,
                thumb: thumb_url,
            },
            derived.width,
            derived.height,
        );

        Ok(self.repo.insert(new_png).await?)
    }

    async fn upload(&self, key: &str, data: Bytes, content_type: &str) -> Result<String, FileError> {
        self.uploader
            .upload(key, data, content_type)
            .await
            .map_err(|source| FileError::Upload {
                key: key.to_string(),
                source,
            })
    }
}
