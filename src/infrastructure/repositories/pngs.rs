use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, query_as};

use crate::domain::RepositoryError;
use crate::domain::ids::PngId;
use crate::domain::pngs::{NewPng, Png, PngSummary};
use crate::domain::repositories::PngRepository;
use crate::infrastructure::database::{DatabaseDriver, DatabasePool};

const PNG_COLUMNS: &str = "id, slug, title, description, h1, alt, tags, original_url, \
                           preview_url, thumb_url, width, height, downloads, created_at";

#[derive(Clone)]
pub struct SqlPngRepository {
    pool: DatabasePool,
}

impl SqlPngRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn into_domain(record: PngRecord) -> Png {
        Png {
            id: PngId::from(record.id),
            slug: record.slug,
            title: record.title,
            description: record.description,
            h1: record.h1,
            alt: record.alt,
            tags: record.tags.0,
            original_url: record.original_url,
            preview_url: record.preview_url,
            thumb_url: record.thumb_url,
            width: record.width as u32,
            height: record.height as u32,
            downloads: record.downloads,
            created_at: record.created_at,
        }
    }

    fn summary_to_domain(record: SummaryRecord) -> PngSummary {
        PngSummary {
            slug: record.slug,
            title: record.title,
            thumb_url: record.thumb_url,
            width: record.width as u32,
            height: record.height as u32,
        }
    }
}

/// Escape `LIKE` wildcards so user input only ever matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PngRepository for SqlPngRepository {
    async fn insert(&self, png: NewPng) -> Result<Png, RepositoryError> {
        let record = query_as::<_, PngRecord>(&format!(
            "INSERT INTO pngs (slug, title, description, h1, alt, tags, original_url, \
             preview_url, thumb_url, width, height, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {PNG_COLUMNS}"
        ))
        .bind(&png.slug)
        .bind(&png.title)
        .bind(&png.description)
        .bind(&png.h1)
        .bind(&png.alt)
        .bind(Json(&png.tags))
        .bind(&png.original_url)
        .bind(&png.preview_url)
        .bind(&png.thumb_url)
        .bind(i64::from(png.width))
        .bind(i64::from(png.height))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return RepositoryError::conflict(format!(
                    "a png with slug '{}' already exists",
                    png.slug
                ));
            }
            RepositoryError::unexpected(err.to_string())
        })?;

        Ok(Self::into_domain(record))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Png, RepositoryError> {
        let record =
            query_as::<_, PngRecord>(&format!("SELECT {PNG_COLUMNS} FROM pngs WHERE slug = ?"))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        match record {
            Some(record) => Ok(Self::into_domain(record)),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list(
        &self,
        search: Option<&str>,
        limit: u32,
    ) -> Result<Vec<PngSummary>, RepositoryError> {
        let mut qb: QueryBuilder<'_, DatabaseDriver> =
            QueryBuilder::new("SELECT slug, title, thumb_url, width, height FROM pngs");

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            qb.push(" WHERE title LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR EXISTS (SELECT 1 FROM json_each(pngs.tags) WHERE value LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(limit));

        let records: Vec<SummaryRecord> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Self::summary_to_domain).collect())
    }

    async fn list_all(&self) -> Result<Vec<Png>, RepositoryError> {
        let records = query_as::<_, PngRecord>(&format!(
            "SELECT {PNG_COLUMNS} FROM pngs ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        Ok(records.into_iter().map(Self::into_domain).collect())
    }

    async fn record_download(&self, slug: &str) -> Result<Png, RepositoryError> {
        let record = query_as::<_, PngRecord>(&format!(
            "UPDATE pngs SET downloads = downloads + 1 WHERE slug = ? RETURNING {PNG_COLUMNS}"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| RepositoryError::unexpected(err.to_string()))?;

        record.map(Self::into_domain).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PngRecord {
    id: i64,
    slug: String,
    title: String,
    description: String,
    h1: String,
    alt: String,
    tags: Json<Vec<String>>,
    original_url: String,
    preview_url: String,
    thumb_url: String,
    width: i64,
    height: i64,
    downloads: i64,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRecord {
    slug: String,
    title: String,
    thumb_url: String,
    width: i64,
    height: i64,
}
