use serde::{Deserialize, Serialize};

/// Static tags appended after the two templated ones.
const BOILERPLATE_TAGS: [&str; 6] = [
    "transparent png",
    "png image",
    "free png",
    "png download",
    "high quality png",
    "design resource",
];

/// Display and search metadata derived from an image's file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub h1: String,
    pub alt: String,
    pub tags: Vec<String>,
}

impl SeoMetadata {
    /// An empty slug cannot address a catalog page.
    pub fn is_degenerate(&self) -> bool {
        self.slug.is_empty()
    }
}

/// Turn separators into spaces and collapse whitespace runs.
///
/// `"red-apple__slice"` becomes `"red apple slice"`.
pub fn clean_text(text: &str) -> String {
    text.replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, drop anything outside `[a-z0-9 ]`, then turn each whitespace
/// run into a single `-`. Edges are not trimmed, so `"& apple"` keeps its
/// leading hyphen.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
            in_space = false;
        } else if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        }
    }

    slug
}

/// Derive the full SEO record for a file name stem (extension already removed).
pub fn derive_seo(stem: &str) -> SeoMetadata {
    let base = clean_text(stem);
    let slug = slugify(&base);

    let description = format!(
        "Download {base} PNG with transparent background in high resolution. \
         Free {base} transparent PNG perfect for graphic design, web design, \
         presentations, posters, and creative projects."
    );

    let mut tags = Vec::with_capacity(2 + BOILERPLATE_TAGS.len());
    tags.push(format!("{base} png"));
    tags.push(format!("{base} transparent png"));
    tags.extend(BOILERPLATE_TAGS.iter().map(|tag| (*tag).to_string()));

    SeoMetadata {
        slug,
        title: base.clone(),
        description,
        h1: base.clone(),
        alt: format!("{base} png"),
        tags,
    }
}
