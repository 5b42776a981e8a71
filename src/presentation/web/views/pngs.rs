use serde_json::json;

use crate::domain::pngs::Png;
use crate::presentation::web::urls::{asset_url, page_url};

/// Social card size assumed when a record has no usable dimensions.
const FALLBACK_WIDTH: u32 = 1200;
const FALLBACK_HEIGHT: u32 = 630;

fn display_image(png: &Png) -> &str {
    if png.preview_url.is_empty() {
        &png.original_url
    } else {
        &png.preview_url
    }
}

pub struct OgPageView {
    pub slug: String,
    pub title: String,
    pub image_url: String,
    pub page_url: String,
    pub width: u32,
    pub height: u32,
    /// Serialized `ImageObject`, safe to embed in a `<script>` element.
    pub json_ld: String,
}

impl OgPageView {
    pub fn new(png: &Png, site_url: &str, cdn: Option<&str>) -> Self {
        let image_url = asset_url(cdn, display_image(png));
        let page_url = page_url(site_url, &png.slug);
        let width = if png.width == 0 { FALLBACK_WIDTH } else { png.width };
        let height = if png.height == 0 { FALLBACK_HEIGHT } else { png.height };

        let json_ld = json!({
            "@context": "https://schema.org",
            "@type": "ImageObject",
            "name": png.title,
            "contentUrl": image_url,
            "url": page_url,
            "width": width,
            "height": height,
            "license": format!("{}/license", site_url.trim_end_matches('/')),
        })
        .to_string()
        .replace('<', "\\u003c");

        Self {
            slug: png.slug.clone(),
            title: png.title.clone(),
            image_url,
            page_url,
            width,
            height,
            json_ld,
        }
    }
}

pub struct SitemapEntryView {
    pub loc: String,
    pub lastmod: String,
    pub image_loc: String,
    pub image_title: String,
}

impl SitemapEntryView {
    pub fn new(png: &Png, site_url: &str, cdn: Option<&str>) -> Self {
        Self {
            loc: page_url(site_url, &png.slug),
            lastmod: png.created_at.format("%Y-%m-%d").to_string(),
            image_loc: asset_url(cdn, display_image(png)),
            image_title: png.title.clone(),
        }
    }
}
