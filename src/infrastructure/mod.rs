pub mod database;
pub mod image_processing;
pub mod repositories;
pub mod storage;
