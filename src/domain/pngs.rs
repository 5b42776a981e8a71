use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::PngId;
use crate::domain::seo::SeoMetadata;

/// Maximum number of records returned by a catalog listing.
pub const LIST_LIMIT: u32 = 50;

/// One ingested image: SEO copy, the three public URLs, and its download count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Png {
    pub id: PngId,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub h1: String,
    pub alt: String,
    pub tags: Vec<String>,
    pub original_url: String,
    pub preview_url: String,
    pub thumb_url: String,
    pub width: u32,
    pub height: u32,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
}

/// Public URLs of the uploaded original and its two derivatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    pub original: String,
    pub preview: String,
    pub thumb: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPng {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub h1: String,
    pub alt: String,
    pub tags: Vec<String>,
    pub original_url: String,
    pub preview_url: String,
    pub thumb_url: String,
    pub width: u32,
    pub height: u32,
}

impl NewPng {
    pub fn from_seo(seo: SeoMetadata, urls: AssetUrls, width: u32, height: u32) -> Self {
        Self {
            slug: seo.slug,
            title: seo.title,
            description: seo.description,
            h1: seo.h1,
            alt: seo.alt,
            tags: seo.tags,
            original_url: urls.original,
            preview_url: urls.preview,
            thumb_url: urls.thumb,
            width,
            height,
        }
    }
}

/// Grid projection used by catalog listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PngSummary {
    pub slug: String,
    pub title: String,
    pub thumb_url: String,
    pub width: u32,
    pub height: u32,
}

impl From<Png> for PngSummary {
    fn from(png: Png) -> Self {
        Self {
            slug: png.slug,
            title: png.title,
            thumb_url: png.thumb_url,
            width: png.width,
            height: png.height,
        }
    }
}
