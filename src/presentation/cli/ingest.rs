use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;

use crate::application::services::{
    IngestOptions, IngestReport, IngestService, RetryPolicy, Uploader,
};
use crate::domain::repositories::PngRepository;
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::pngs::SqlPngRepository;
use crate::infrastructure::storage::s3::R2_REGION;
use crate::infrastructure::storage::{S3Config, StorageConfig};

#[derive(Debug, Args)]
pub struct IngestCommand {
    /// Directory containing the PNG files to ingest
    pub dir: PathBuf,

    /// Stop at the first file that fails instead of continuing
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(
        long,
        env = "PNGCATALOG_DATABASE_URL",
        default_value = "sqlite://pngcatalog.db"
    )]
    pub database_url: String,

    /// Base URL that uploaded keys are publicly reachable under
    #[arg(long, env = "PNGCATALOG_PUBLIC_URL")]
    pub public_url: String,

    /// Attempts per upload before giving up on transient errors
    #[arg(long, env = "PNGCATALOG_UPLOAD_ATTEMPTS", default_value_t = 3)]
    pub upload_attempts: u32,

    #[command(flatten)]
    pub storage: StorageArgs,
}

#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Write blobs below this directory instead of to a bucket
    #[arg(long, env = "PNGCATALOG_STORAGE_DIR", conflicts_with = "s3_bucket")]
    pub storage_dir: Option<PathBuf>,

    #[arg(long, env = "PNGCATALOG_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// S3-compatible endpoint; without this or an R2 account the bucket is on AWS
    /// and --s3-region must name a real AWS region
    #[arg(long, env = "PNGCATALOG_S3_ENDPOINT", conflicts_with = "r2_account_id")]
    pub s3_endpoint: Option<String>,

    /// Cloudflare account id, used to derive the R2 endpoint
    #[arg(long, env = "PNGCATALOG_R2_ACCOUNT_ID")]
    pub r2_account_id: Option<String>,

    /// Signing region; the default `auto` is only valid for R2
    #[arg(long, env = "PNGCATALOG_S3_REGION", default_value = R2_REGION)]
    pub s3_region: String,

    #[arg(long, env = "PNGCATALOG_S3_ACCESS_KEY_ID", hide_env_values = true)]
    pub s3_access_key_id: Option<String>,

    #[arg(long, env = "PNGCATALOG_S3_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub s3_secret_access_key: Option<String>,

    #[arg(long, env = "PNGCATALOG_S3_FORCE_PATH_STYLE")]
    pub s3_force_path_style: bool,
}

impl StorageArgs {
    pub fn into_config(self) -> anyhow::Result<StorageConfig> {
        if let Some(dir) = self.storage_dir {
            return Ok(StorageConfig::Filesystem(dir));
        }

        let bucket = self
            .s3_bucket
            .context("no storage configured: set --storage-dir or --s3-bucket")?;
        let endpoint = self
            .s3_endpoint
            .or_else(|| self.r2_account_id.as_deref().map(S3Config::r2_endpoint));
        if endpoint.is_none() && self.s3_region == R2_REGION {
            anyhow::bail!(
                "region {R2_REGION:?} needs an endpoint: set --s3-endpoint or --r2-account-id, \
                 or pass an AWS --s3-region"
            );
        }

        Ok(StorageConfig::S3(S3Config {
            bucket,
            endpoint,
            region: self.s3_region,
            access_key_id: self.s3_access_key_id.unwrap_or_default(),
            secret_access_key: self.s3_secret_access_key.unwrap_or_default(),
            force_path_style: self.s3_force_path_style,
        }))
    }
}

pub async fn run(command: IngestCommand) -> anyhow::Result<IngestReport> {
    let store = command
        .storage
        .into_config()?
        .build()
        .context("failed to configure object storage")?;

    let database = Database::connect(&command.database_url)
        .await
        .context("failed to connect to database")?;
    let repo: Arc<dyn PngRepository> = Arc::new(SqlPngRepository::new(database.clone_pool()));

    let retry = RetryPolicy {
        max_attempts: command.upload_attempts,
        ..RetryPolicy::default()
    };
    let uploader = Uploader::new(store, &command.public_url, retry);
    let service = IngestService::new(
        repo,
        uploader,
        IngestOptions {
            fail_fast: command.fail_fast,
        },
    );

    let report = service
        .ingest_directory(&command.dir)
        .await
        .with_context(|| format!("failed to ingest {}", command.dir.display()))?;

    print_report(&report);
    Ok(report)
}

pub fn print_report(report: &IngestReport) {
    for png in report.ingested() {
        println!("ingested {} -> {}", png.slug, png.original_url);
    }
    for (file, error) in report.failures() {
        eprintln!("failed {file}: {error}");
    }
    for file in &report.not_processed {
        eprintln!("skipped {file}");
    }
    println!("{} of {} succeeded", report.succeeded(), report.total());
}
