pub mod templates;
pub mod urls;
pub mod views;
