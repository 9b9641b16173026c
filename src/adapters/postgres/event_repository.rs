//! PostgreSQL implementation of EventRepository.
//!
//! Events are read in two steps: the `events` rows first, then their
//! categories and speakers for the whole batch via `= ANY($1)`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use sqlx::PgPool;

use super::catalog_repository::{CategoryRow, SpeakerRow};
use super::support::{db_error, like_pattern, parse_column, to_u64, unique_violation};
use crate::domain::catalog::{Category, Speaker};
use crate::domain::event::{Event, EventFields, EventListCriteria, EventSpeaker, ListFilter};
use crate::domain::foundation::{
    CategoryId, DomainError, ErrorCode, EventId, Money, Page, PageRequest, Timestamp,
};
use crate::ports::EventRepository;

const SLUG_CONSTRAINT: &str = "events_slug_key";

const EVENT_COLUMNS: &str = r#"
    e.id, e.title, e.slug, e.start_date, e.end_date, e.start_time, e.end_time, e.event_type,
    e.short_description, e.full_description, e.topic, e.location, e.format, e.image,
    e.registration_enabled, e.category_id, e.is_active, e.sort_order, e.is_archived, e.price,
    e.is_paid, e.show_price, e.is_on_demand, e.kinescope_id, e.kinescope_playlist_id,
    e.kinescope_type, e.is_live, e.letter_draft_id, e.groupsensay, e.max_quantity,
    e.created_at, e.updated_at
"#;

pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attaches categories and speakers to a batch of rows, keeping row order.
    async fn hydrate(&self, rows: Vec<EventRow>) -> Result<Vec<Event>, DomainError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let category_rows: Vec<EventCategoryRow> = sqlx::query_as(
            r#"
            SELECT ec.event_id, c.id, c.name, c.slug, c.description, c.is_active, c.sort_order,
                   c.created_at, c.updated_at
            FROM event_categories ec
            JOIN categories c ON c.id = ec.category_id
            WHERE ec.event_id = ANY($1)
            ORDER BY c.sort_order, c.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load event categories"))?;

        let speaker_rows: Vec<EventSpeakerRow> = sqlx::query_as(
            r#"
            SELECT es.event_id, es.role AS link_role, es.topic AS link_topic,
                   es.sort_order AS link_sort_order,
                   s.id, s.first_name, s.last_name, s.middle_name, s.photo, s.regalia,
                   s.description, s.position, s.company, s.is_active, s.sort_order,
                   s.created_at, s.updated_at
            FROM event_speakers es
            JOIN speakers s ON s.id = es.speaker_id
            WHERE es.event_id = ANY($1)
            ORDER BY es.sort_order, s.last_name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load event speakers"))?;

        let mut categories: HashMap<i64, Vec<Category>> = HashMap::new();
        for row in category_rows {
            categories.entry(row.event_id).or_default().push(row.category.into());
        }
        let mut speakers: HashMap<i64, Vec<EventSpeaker>> = HashMap::new();
        for row in speaker_rows {
            speakers.entry(row.event_id).or_default().push(EventSpeaker {
                speaker: Speaker::from(row.speaker),
                role: row.link_role,
                topic: row.link_topic,
                sort_order: row.link_sort_order,
            });
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                let mut event = Event::try_from(row)?;
                event.categories = categories.remove(&id).unwrap_or_default();
                event.speakers = speakers.remove(&id).unwrap_or_default();
                Ok(event)
            })
            .collect()
    }

    async fn fetch(&self, id: EventId) -> Result<Event, DomainError> {
        self.find_by_id(id).await?.ok_or_else(|| missing(id))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    slug: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    event_type: Option<String>,
    short_description: Option<String>,
    full_description: Option<String>,
    topic: Option<String>,
    location: Option<String>,
    format: String,
    image: Option<String>,
    registration_enabled: bool,
    category_id: Option<i64>,
    is_active: bool,
    sort_order: i32,
    is_archived: bool,
    price: Option<i64>,
    is_paid: bool,
    show_price: bool,
    is_on_demand: bool,
    kinescope_id: Option<String>,
    kinescope_playlist_id: Option<String>,
    kinescope_type: Option<String>,
    is_live: Option<bool>,
    letter_draft_id: Option<String>,
    groupsensay: Option<String>,
    max_quantity: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct EventCategoryRow {
    event_id: i64,
    #[sqlx(flatten)]
    category: CategoryRow,
}

#[derive(Debug, sqlx::FromRow)]
struct EventSpeakerRow {
    event_id: i64,
    link_role: Option<String>,
    link_topic: Option<String>,
    link_sort_order: i32,
    #[sqlx(flatten)]
    speaker: SpeakerRow,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let kinescope_type = row
            .kinescope_type
            .as_deref()
            .map(|raw| parse_column("kinescope_type", raw))
            .transpose()?;

        Ok(Event {
            id: EventId::new(row.id),
            title: row.title,
            slug: row.slug,
            start_date: row.start_date,
            end_date: row.end_date,
            start_time: row.start_time,
            end_time: row.end_time,
            event_type: row.event_type,
            short_description: row.short_description,
            full_description: row.full_description,
            topic: row.topic,
            location: row.location,
            format: parse_column("format", &row.format)?,
            image: row.image,
            registration_enabled: row.registration_enabled,
            category_id: row.category_id.map(CategoryId::new),
            is_active: row.is_active,
            sort_order: row.sort_order,
            is_archived: row.is_archived,
            price: row.price.map(Money::from_kopecks),
            is_paid: row.is_paid,
            show_price: row.show_price,
            is_on_demand: row.is_on_demand,
            kinescope_id: row.kinescope_id,
            kinescope_playlist_id: row.kinescope_playlist_id,
            kinescope_type,
            is_live: row.is_live,
            letter_draft_id: row.letter_draft_id,
            groupsensay: row.groupsensay,
            max_quantity: row.max_quantity,
            categories: Vec::new(),
            speakers: Vec::new(),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn missing(id: EventId) -> DomainError {
    DomainError::new(ErrorCode::EventNotFound, format!("Event {} not found", id))
}

fn window_predicate(filter: ListFilter) -> &'static str {
    match filter {
        ListFilter::Upcoming => "NOT e.is_archived AND (e.end_date >= $1 OR e.is_on_demand)",
        ListFilter::Archive => "(e.is_archived OR (NOT e.is_on_demand AND e.end_date < $1))",
        ListFilter::All => "$1::date IS NOT NULL",
    }
}

async fn replace_links(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
    fields: &EventFields,
) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM event_categories WHERE event_id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("clear event categories"))?;
    for category_id in &fields.categories {
        sqlx::query(
            "INSERT INTO event_categories (event_id, category_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(category_id.as_i64())
        .execute(&mut **tx)
        .await
        .map_err(db_error("link event category"))?;
    }

    sqlx::query("DELETE FROM event_speakers WHERE event_id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("clear event speakers"))?;
    for link in &fields.speakers {
        sqlx::query(
            r#"
            INSERT INTO event_speakers (event_id, speaker_id, role, topic, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id, speaker_id) DO UPDATE SET
                role = EXCLUDED.role, topic = EXCLUDED.topic, sort_order = EXCLUDED.sort_order
            "#,
        )
        .bind(id)
        .bind(link.speaker_id.as_i64())
        .bind(&link.role)
        .bind(&link.topic)
        .bind(link.sort_order)
        .execute(&mut **tx)
        .await
        .map_err(db_error("link event speaker"))?;
    }
    Ok(())
}

/// Binds every scalar column of [`EventFields`] starting at the given query.
/// Parameter order matches the insert and update statements below.
fn bind_fields<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, (i64,), sqlx::postgres::PgArguments>,
    fields: &'q EventFields,
    slug: &'q str,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, (i64,), sqlx::postgres::PgArguments> {
    query
        .bind(&fields.title)
        .bind(slug)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.start_time)
        .bind(fields.end_time)
        .bind(&fields.event_type)
        .bind(&fields.short_description)
        .bind(&fields.full_description)
        .bind(&fields.topic)
        .bind(&fields.location)
        .bind(fields.format.as_str())
        .bind(&fields.image)
        .bind(fields.registration_enabled)
        .bind(fields.category_id.map(|c| c.as_i64()))
        .bind(fields.is_active)
        .bind(fields.sort_order)
        .bind(fields.is_archived)
        .bind(fields.price.map(|p| p.kopecks()))
        .bind(fields.is_paid)
        .bind(fields.show_price)
        .bind(fields.is_on_demand)
        .bind(&fields.kinescope_id)
        .bind(&fields.kinescope_playlist_id)
        .bind(fields.kinescope_type.map(|k| k.as_str()))
        .bind(fields.is_live)
        .bind(&fields.letter_draft_id)
        .bind(&fields.groupsensay)
        .bind(fields.max_quantity)
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>, DomainError> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {} FROM events e WHERE e.id = $1", EVENT_COLUMNS))
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find event"))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, DomainError> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {} FROM events e WHERE e.slug = $1", EVENT_COLUMNS))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find event by slug"))?;

        Ok(self.hydrate(row.into_iter().collect()).await?.pop())
    }

    async fn list(&self, criteria: &EventListCriteria, today: NaiveDate) -> Result<Page<Event>, DomainError> {
        let filter = format!(
            r#"
            WHERE e.is_active
              AND {}
              AND ($2::text IS NULL
                   OR e.title ILIKE $2 OR e.short_description ILIKE $2 OR e.location ILIKE $2)
              AND (cardinality($3::bigint[]) = 0
                   OR e.category_id = ANY($3)
                   OR EXISTS (SELECT 1 FROM event_categories ec
                              WHERE ec.event_id = e.id AND ec.category_id = ANY($3)))
              AND ($4::text IS NULL OR e.event_type = $4)
              AND ($5::text IS NULL OR e.format = $5)
            "#,
            window_predicate(criteria.filter)
        );
        let pattern = like_pattern(criteria.search.as_deref());
        let categories: Vec<i64> = criteria.categories.iter().map(|c| c.as_i64()).collect();
        let format = criteria.format.map(|f| f.as_str());

        let (total,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM events e {}", filter))
            .bind(today)
            .bind(&pattern)
            .bind(&categories)
            .bind(&criteria.event_type)
            .bind(format)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count events"))?;

        let direction = criteria.direction.as_sql();
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events e {} ORDER BY e.{} {} NULLS LAST, e.id {} LIMIT $6 OFFSET $7",
            EVENT_COLUMNS,
            filter,
            criteria.sort.column(),
            direction,
            direction
        ))
        .bind(today)
        .bind(&pattern)
        .bind(&categories)
        .bind(&criteria.event_type)
        .bind(format)
        .bind(criteria.page.limit())
        .bind(criteria.page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list events"))?;

        let events = self.hydrate(rows).await?;
        Ok(Page::new(events, to_u64(total), criteria.page))
    }

    async fn related(&self, event: &Event, limit: i64) -> Result<Vec<Event>, DomainError> {
        let ids: Vec<i64> = event.category_ids().iter().map(|c| c.as_i64()).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM events e
            WHERE e.is_active AND e.id <> $1
              AND (e.category_id = ANY($2)
                   OR EXISTS (SELECT 1 FROM event_categories ec
                              WHERE ec.event_id = e.id AND ec.category_id = ANY($2)))
            ORDER BY e.start_date DESC NULLS LAST, e.id DESC
            LIMIT $3
            "#,
            EVENT_COLUMNS
        ))
        .bind(event.id.as_i64())
        .bind(&ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("load related events"))?;

        self.hydrate(rows).await
    }

    async fn search(&self, title: Option<&str>, page: PageRequest) -> Result<Page<Event>, DomainError> {
        let pattern = like_pattern(title);

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM events e WHERE ($1::text IS NULL OR e.title ILIKE $1)")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("count events"))?;

        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events e WHERE ($1::text IS NULL OR e.title ILIKE $1) \
             ORDER BY e.created_at DESC, e.id DESC LIMIT $2 OFFSET $3",
            EVENT_COLUMNS
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("search events"))?;

        let events = self.hydrate(rows).await?;
        Ok(Page::new(events, to_u64(total), page))
    }

    async fn slug_exists(&self, slug: &str, except: Option<EventId>) -> Result<bool, DomainError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM events WHERE slug = $1 AND ($2::bigint IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(except.map(|id| id.as_i64()))
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("check event slug"))?;

        Ok(exists)
    }

    async fn create(&self, fields: &EventFields, slug: &str) -> Result<Event, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let insert = sqlx::query_as(
            r#"
            INSERT INTO events (
                title, slug, start_date, end_date, start_time, end_time, event_type,
                short_description, full_description, topic, location, format, image,
                registration_enabled, category_id, is_active, sort_order, is_archived, price,
                is_paid, show_price, is_on_demand, kinescope_id, kinescope_playlist_id,
                kinescope_type, is_live, letter_draft_id, groupsensay, max_quantity
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
            )
            RETURNING id
            "#,
        );
        let (id,) = bind_fields(insert, fields, slug)
            .fetch_one(&mut *tx)
            .await
            .map_err(unique_violation(
                "insert event",
                SLUG_CONSTRAINT,
                ErrorCode::DuplicateSlug,
                format!("Slug '{}' is already taken", slug),
            ))?;

        replace_links(&mut tx, id, fields).await?;
        tx.commit().await.map_err(db_error("commit transaction"))?;

        self.fetch(EventId::new(id)).await
    }

    async fn update(&self, id: EventId, fields: &EventFields, slug: &str) -> Result<Event, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let update = sqlx::query_as(
            r#"
            UPDATE events SET
                title = $1, slug = $2, start_date = $3, end_date = $4, start_time = $5,
                end_time = $6, event_type = $7, short_description = $8, full_description = $9,
                topic = $10, location = $11, format = $12, image = $13,
                registration_enabled = $14, category_id = $15, is_active = $16,
                sort_order = $17, is_archived = $18, price = $19, is_paid = $20,
                show_price = $21, is_on_demand = $22, kinescope_id = $23,
                kinescope_playlist_id = $24, kinescope_type = $25, is_live = $26,
                letter_draft_id = $27, groupsensay = $28, max_quantity = $29,
                updated_at = NOW()
            WHERE id = $30
            RETURNING id
            "#,
        );
        let updated: Option<(i64,)> = bind_fields(update, fields, slug)
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(unique_violation(
                "update event",
                SLUG_CONSTRAINT,
                ErrorCode::DuplicateSlug,
                format!("Slug '{}' is already taken", slug),
            ))?;
        if updated.is_none() {
            return Err(missing(id));
        }

        replace_links(&mut tx, id.as_i64(), fields).await?;
        tx.commit().await.map_err(db_error("commit transaction"))?;

        self.fetch(id).await
    }

    async fn delete(&self, id: EventId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error("delete event"))?;

        if result.rows_affected() == 0 {
            return Err(missing(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_window_excludes_on_demand_events() {
        let sql = window_predicate(ListFilter::Archive);
        assert!(sql.contains("NOT e.is_on_demand"));
        assert!(sql.contains("e.is_archived OR"));
    }

    #[test]
    fn every_window_binds_today() {
        for filter in [ListFilter::Upcoming, ListFilter::Archive, ListFilter::All] {
            assert!(window_predicate(filter).contains("$1"));
        }
    }
}
