pub mod ingest;
pub mod uploader;

pub use ingest::{
    FileError, FileOutcome, IngestError, IngestOptions, IngestReport, IngestService, KeyClock,
    StorageKeys, discover_files,
};
pub use uploader::{RetryPolicy, Uploader};
