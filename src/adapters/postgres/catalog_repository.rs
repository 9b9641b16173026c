//! PostgreSQL catalog tables: categories, speakers, partners and the
//! medical library.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::support::{db_error, like_pattern, parse_column, to_u64, unique_violation};
use crate::domain::catalog::{
    Category, CategoryFields, LibraryDocument, LibraryDocumentFields, Partner, PartnerFields,
    Speaker, SpeakerFields,
};
use crate::domain::foundation::{
    CategoryId, DocumentId, DomainError, ErrorCode, Page, PartnerId, SpeakerId, Timestamp,
};
use crate::ports::{CatalogQuery, CatalogRepository};

/// How one catalog table is listed.
struct Listing {
    table: &'static str,
    columns: &'static str,
    /// Predicate over `$1`, the ILIKE pattern.
    search: &'static str,
    has_active_flag: bool,
    order: &'static str,
}

async fn list_rows<Row>(
    pool: &PgPool,
    listing: &Listing,
    query: &CatalogQuery,
) -> Result<(Vec<Row>, u64), DomainError>
where
    Row: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    let pattern = like_pattern(query.search.as_deref());
    let mut filter = format!("WHERE ($1::text IS NULL OR {})", listing.search);
    if listing.has_active_flag && query.active_only {
        filter.push_str(" AND is_active");
    }

    let (total,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM {} {}", listing.table, filter))
            .bind(&pattern)
            .fetch_one(pool)
            .await
            .map_err(db_error("count catalog records"))?;

    let rows: Vec<Row> = sqlx::query_as(&format!(
        "SELECT {} FROM {} {} ORDER BY {} LIMIT $2 OFFSET $3",
        listing.columns, listing.table, filter, listing.order
    ))
    .bind(&pattern)
    .bind(query.page.limit())
    .bind(query.page.offset())
    .fetch_all(pool)
    .await
    .map_err(db_error("list catalog records"))?;

    Ok((rows, to_u64(total)))
}

async fn delete_row(pool: &PgPool, table: &'static str, entity: &str, id: i64) -> Result<(), DomainError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error("delete catalog record"))?;

    if result.rows_affected() == 0 {
        return Err(not_found(entity, id));
    }
    Ok(())
}

fn not_found(entity: &str, id: i64) -> DomainError {
    DomainError::new(ErrorCode::NotFound, format!("{} {} not found", entity, id))
}

// ════════════════════════════════════════════════════════════════════════════════
// Categories
// ════════════════════════════════════════════════════════════════════════════════

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, is_active, sort_order, created_at, updated_at";

const CATEGORIES: Listing = Listing {
    table: "categories",
    columns: CATEGORY_COLUMNS,
    search: "name ILIKE $1",
    has_active_flag: true,
    order: "sort_order ASC, name ASC",
};

pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

fn duplicate_category_slug(action: &'static str, slug: &str) -> impl FnOnce(sqlx::Error) -> DomainError {
    unique_violation(
        action,
        "categories_slug_key",
        ErrorCode::DuplicateSlug,
        format!("Slug '{}' is already taken", slug),
    )
}

#[async_trait]
impl CatalogRepository<Category, CategoryFields, CategoryId> for PostgresCategoryRepository {
    async fn list(&self, query: &CatalogQuery) -> Result<Page<Category>, DomainError> {
        let (rows, total) = list_rows::<CategoryRow>(&self.pool, &CATEGORIES, query).await?;
        Ok(Page::new(rows.into_iter().map(Category::from).collect(), total, query.page))
    }

    async fn find(&self, id: CategoryId) -> Result<Option<Category>, DomainError> {
        let row: Option<CategoryRow> =
            sqlx::query_as(&format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find category"))?;
        Ok(row.map(Category::from))
    }

    async fn create(&self, fields: &CategoryFields) -> Result<Category, DomainError> {
        let row: CategoryRow = sqlx::query_as(&format!(
            "INSERT INTO categories (name, slug, description, is_active, sort_order) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(fields.is_active)
        .bind(fields.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_category_slug("insert category", &fields.slug))?;
        Ok(row.into())
    }

    async fn update(&self, id: CategoryId, fields: &CategoryFields) -> Result<Category, DomainError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            "UPDATE categories SET name = $2, slug = $3, description = $4, is_active = $5, \
             sort_order = $6, updated_at = NOW() WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(id.as_i64())
        .bind(&fields.name)
        .bind(&fields.slug)
        .bind(&fields.description)
        .bind(fields.is_active)
        .bind(fields.sort_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(duplicate_category_slug("update category", &fields.slug))?;

        row.map(Category::from)
            .ok_or_else(|| not_found("Category", id.as_i64()))
    }

    async fn delete(&self, id: CategoryId) -> Result<(), DomainError> {
        delete_row(&self.pool, "categories", "Category", id.as_i64()).await
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Speakers
// ════════════════════════════════════════════════════════════════════════════════

const SPEAKER_COLUMNS: &str = "id, first_name, last_name, middle_name, photo, regalia, description, \
     position, company, is_active, sort_order, created_at, updated_at";

const SPEAKERS: Listing = Listing {
    table: "speakers",
    columns: SPEAKER_COLUMNS,
    search: "(first_name ILIKE $1 OR last_name ILIKE $1 OR middle_name ILIKE $1)",
    has_active_flag: true,
    order: "sort_order ASC, last_name ASC",
};

pub struct PostgresSpeakerRepository {
    pool: PgPool,
}

impl PostgresSpeakerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct SpeakerRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub photo: Option<String>,
    pub regalia: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SpeakerRow> for Speaker {
    fn from(row: SpeakerRow) -> Self {
        Speaker {
            id: SpeakerId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            photo: row.photo,
            regalia: row.regalia,
            description: row.description,
            position: row.position,
            company: row.company,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[async_trait]
impl CatalogRepository<Speaker, SpeakerFields, SpeakerId> for PostgresSpeakerRepository {
    async fn list(&self, query: &CatalogQuery) -> Result<Page<Speaker>, DomainError> {
        let (rows, total) = list_rows::<SpeakerRow>(&self.pool, &SPEAKERS, query).await?;
        Ok(Page::new(rows.into_iter().map(Speaker::from).collect(), total, query.page))
    }

    async fn find(&self, id: SpeakerId) -> Result<Option<Speaker>, DomainError> {
        let row: Option<SpeakerRow> =
            sqlx::query_as(&format!("SELECT {} FROM speakers WHERE id = $1", SPEAKER_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find speaker"))?;
        Ok(row.map(Speaker::from))
    }

    async fn create(&self, fields: &SpeakerFields) -> Result<Speaker, DomainError> {
        let row: SpeakerRow = sqlx::query_as(&format!(
            "INSERT INTO speakers (first_name, last_name, middle_name, photo, regalia, description, \
             position, company, is_active, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            SPEAKER_COLUMNS
        ))
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.middle_name)
        .bind(&fields.photo)
        .bind(&fields.regalia)
        .bind(&fields.description)
        .bind(&fields.position)
        .bind(&fields.company)
        .bind(fields.is_active)
        .bind(fields.sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert speaker"))?;
        Ok(row.into())
    }

    async fn update(&self, id: SpeakerId, fields: &SpeakerFields) -> Result<Speaker, DomainError> {
        let row: Option<SpeakerRow> = sqlx::query_as(&format!(
            "UPDATE speakers SET first_name = $2, last_name = $3, middle_name = $4, photo = $5, \
             regalia = $6, description = $7, position = $8, company = $9, is_active = $10, \
             sort_order = $11, updated_at = NOW() WHERE id = $1 RETURNING {}",
            SPEAKER_COLUMNS
        ))
        .bind(id.as_i64())
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.middle_name)
        .bind(&fields.photo)
        .bind(&fields.regalia)
        .bind(&fields.description)
        .bind(&fields.position)
        .bind(&fields.company)
        .bind(fields.is_active)
        .bind(fields.sort_order)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update speaker"))?;

        row.map(Speaker::from)
            .ok_or_else(|| not_found("Speaker", id.as_i64()))
    }

    async fn delete(&self, id: SpeakerId) -> Result<(), DomainError> {
        delete_row(&self.pool, "speakers", "Speaker", id.as_i64()).await
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Partners
// ════════════════════════════════════════════════════════════════════════════════

const PARTNER_COLUMNS: &str = "id, name, description, logo_path, website_url, created_at, updated_at";

const PARTNERS: Listing = Listing {
    table: "partners",
    columns: PARTNER_COLUMNS,
    search: "name ILIKE $1",
    has_active_flag: false,
    order: "created_at DESC, id DESC",
};

pub struct PostgresPartnerRepository {
    pool: PgPool,
}

impl PostgresPartnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PartnerRow {
    id: i64,
    name: String,
    description: Option<String>,
    logo_path: Option<String>,
    website_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PartnerRow> for Partner {
    fn from(row: PartnerRow) -> Self {
        Partner {
            id: PartnerId::new(row.id),
            name: row.name,
            description: row.description,
            logo_path: row.logo_path,
            website_url: row.website_url,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        }
    }
}

#[async_trait]
impl CatalogRepository<Partner, PartnerFields, PartnerId> for PostgresPartnerRepository {
    async fn list(&self, query: &CatalogQuery) -> Result<Page<Partner>, DomainError> {
        let (rows, total) = list_rows::<PartnerRow>(&self.pool, &PARTNERS, query).await?;
        Ok(Page::new(rows.into_iter().map(Partner::from).collect(), total, query.page))
    }

    async fn find(&self, id: PartnerId) -> Result<Option<Partner>, DomainError> {
        let row: Option<PartnerRow> =
            sqlx::query_as(&format!("SELECT {} FROM partners WHERE id = $1", PARTNER_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find partner"))?;
        Ok(row.map(Partner::from))
    }

    async fn create(&self, fields: &PartnerFields) -> Result<Partner, DomainError> {
        let row: PartnerRow = sqlx::query_as(&format!(
            "INSERT INTO partners (name, description, logo_path, website_url) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            PARTNER_COLUMNS
        ))
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.logo_path)
        .bind(&fields.website_url)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert partner"))?;
        Ok(row.into())
    }

    async fn update(&self, id: PartnerId, fields: &PartnerFields) -> Result<Partner, DomainError> {
        let row: Option<PartnerRow> = sqlx::query_as(&format!(
            "UPDATE partners SET name = $2, description = $3, logo_path = $4, website_url = $5, \
             updated_at = NOW() WHERE id = $1 RETURNING {}",
            PARTNER_COLUMNS
        ))
        .bind(id.as_i64())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.logo_path)
        .bind(&fields.website_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update partner"))?;

        row.map(Partner::from)
            .ok_or_else(|| not_found("Partner", id.as_i64()))
    }

    async fn delete(&self, id: PartnerId) -> Result<(), DomainError> {
        delete_row(&self.pool, "partners", "Partner", id.as_i64()).await
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Medical library
// ════════════════════════════════════════════════════════════════════════════════

const DOCUMENT_COLUMNS: &str = "id, title, description, file_path, image_path, publication_date, \
     language, created_at, updated_at";

const DOCUMENTS: Listing = Listing {
    table: "medical_libraries",
    columns: DOCUMENT_COLUMNS,
    search: "(title ILIKE $1 OR description ILIKE $1)",
    has_active_flag: false,
    order: "created_at DESC, id DESC",
};

pub struct PostgresLibraryRepository {
    pool: PgPool,
}

impl PostgresLibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: i64,
    title: String,
    description: Option<String>,
    file_path: Option<String>,
    image_path: Option<String>,
    publication_date: Option<NaiveDate>,
    language: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for LibraryDocument {
    type Error = DomainError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(LibraryDocument {
            id: DocumentId::new(row.id),
            title: row.title,
            description: row.description,
            file_path: row.file_path,
            image_path: row.image_path,
            publication_date: row.publication_date,
            language: parse_column("language", &row.language)?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl CatalogRepository<LibraryDocument, LibraryDocumentFields, DocumentId> for PostgresLibraryRepository {
    async fn list(&self, query: &CatalogQuery) -> Result<Page<LibraryDocument>, DomainError> {
        let (rows, total) = list_rows::<DocumentRow>(&self.pool, &DOCUMENTS, query).await?;
        let items = rows
            .into_iter()
            .map(LibraryDocument::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, query.page))
    }

    async fn find(&self, id: DocumentId) -> Result<Option<LibraryDocument>, DomainError> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM medical_libraries WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find library document"))?;
        row.map(LibraryDocument::try_from).transpose()
    }

    async fn create(&self, fields: &LibraryDocumentFields) -> Result<LibraryDocument, DomainError> {
        let row: DocumentRow = sqlx::query_as(&format!(
            "INSERT INTO medical_libraries (title, description, file_path, image_path, \
             publication_date, language) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.file_path)
        .bind(&fields.image_path)
        .bind(fields.publication_date)
        .bind(fields.language.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert library document"))?;
        LibraryDocument::try_from(row)
    }

    async fn update(
        &self,
        id: DocumentId,
        fields: &LibraryDocumentFields,
    ) -> Result<LibraryDocument, DomainError> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            "UPDATE medical_libraries SET title = $2, description = $3, file_path = $4, \
             image_path = $5, publication_date = $6, language = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            DOCUMENT_COLUMNS
        ))
        .bind(id.as_i64())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.file_path)
        .bind(&fields.image_path)
        .bind(fields.publication_date)
        .bind(fields.language.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update library document"))?;

        row.map(LibraryDocument::try_from)
            .transpose()?
            .ok_or_else(|| not_found("Document", id.as_i64()))
    }

    async fn delete(&self, id: DocumentId) -> Result<(), DomainError> {
        delete_row(&self.pool, "medical_libraries", "Document", id.as_i64()).await
    }
}
