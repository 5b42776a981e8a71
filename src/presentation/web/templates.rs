use askama::Template;

use super::views::{OgPageView, SitemapEntryView};

#[derive(Template)]
#[template(path = "og.html")]
pub struct OgPageTemplate {
    pub page: OgPageView,
}

#[derive(Template)]
#[template(path = "sitemap.xml")]
pub struct SitemapTemplate {
    pub entries: Vec<SitemapEntryView>,
}

pub fn render_template<T: Template>(template: T) -> Result<String, askama::Error> {
    template.render()
}
