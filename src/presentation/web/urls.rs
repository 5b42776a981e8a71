use url::Url;

/// Re-root the path of an absolute storage URL onto the CDN base.
///
/// Relative inputs are treated as paths; a leading `/` is always ensured.
pub fn cdn_url(cdn: &str, url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => match parsed.query() {
            Some(query) => format!("{}?{query}", parsed.path()),
            None => parsed.path().to_string(),
        },
        _ => url.to_string(),
    };

    let cdn = cdn.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{cdn}{path}")
    } else {
        format!("{cdn}/{path}")
    }
}

/// `url` on the CDN when one is configured, unchanged otherwise.
pub fn asset_url(cdn: Option<&str>, url: &str) -> String {
    match cdn {
        Some(cdn) => cdn_url(cdn, url),
        None => url.to_string(),
    }
}

/// Canonical public page for a catalog entry.
pub fn page_url(site_url: &str, slug: &str) -> String {
    format!("{}/image/{slug}", site_url.trim_end_matches('/'))
}
