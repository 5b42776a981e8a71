mod pngs;

pub use pngs::{OgPageView, SitemapEntryView};
