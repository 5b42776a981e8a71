pub mod errors;
pub mod ids;
pub mod pngs;
pub mod repositories;
pub mod seo;

pub use errors::{RepositoryError, StorageError};
