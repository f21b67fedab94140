//! Database operations for articles and projects.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    content::core::{Content, ContentForm, ContentKind, ContentStatus, ContentSummary},
    database_id::DatabaseId,
    pagination::sql_count,
    tag::{get_tags, get_tags_for_owners, set_tags},
};

/// The most related items returned next to an article or project.
pub const MAX_RELATED: u64 = 5;

/// Create the articles and projects tables.
pub fn create_content_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [ContentKind::Article, ContentKind::Project] {
        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                {title} TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                image TEXT,
                summary TEXT,
                description TEXT,
                email TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_status ON {table}(status);",
            table = kind.table(),
            title = kind.title_column(),
        ))?;
    }

    Ok(())
}

fn map_slug_conflict(slug: &str) -> impl FnOnce(rusqlite::Error) -> Error + '_ {
    move |error| match error {
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::DuplicateSlug(slug.to_owned())
        }
        error => error.into(),
    }
}

/// Create an article or project and link its tags.
///
/// # Errors
/// Returns:
/// - [Error::Validation] if a field of the form is invalid,
/// - [Error::DuplicateSlug] if another item of the same kind has the same slug,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_content(
    kind: ContentKind,
    form: &ContentForm,
    connection: &Connection,
) -> Result<Content, Error> {
    let content = form.validate(kind)?;

    let transaction = connection.unchecked_transaction()?;

    transaction
        .execute(
            &format!(
                "INSERT INTO {table} ({title}, slug, image, summary, description, email, status, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                table = kind.table(),
                title = kind.title_column(),
            ),
            (
                &content.title,
                &content.slug,
                &content.image,
                &content.summary,
                &content.description,
                &content.email,
                content.status,
                OffsetDateTime::now_utc(),
            ),
        )
        .map_err(map_slug_conflict(&content.slug))?;
    let id = transaction.last_insert_rowid();

    if let Some(tags) = &content.tags {
        set_tags(kind, id, tags, &transaction)?;
    }

    transaction.commit()?;

    get_content(kind, &content.slug, connection)
}

fn select_columns(kind: ContentKind) -> String {
    format!(
        "SELECT id, {title}, slug, image, summary, description, email, status, created_at, updated_at
        FROM {table}",
        table = kind.table(),
        title = kind.title_column(),
    )
}

fn map_row(kind: ContentKind) -> impl Fn(&Row) -> Result<Content, rusqlite::Error> {
    move |row| {
        Ok(Content {
            kind,
            id: row.get(0)?,
            title: row.get(1)?,
            slug: row.get(2)?,
            image: row.get(3)?,
            summary: row.get(4)?,
            description: row.get(5)?,
            email: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            tags: Vec::new(),
        })
    }
}

/// Get an article or project by its slug, whatever its status.
///
/// # Errors
/// Returns [Error::ArticleNotFound] or [Error::ProjectNotFound] if no item of
/// `kind` has the slug.
pub fn get_content(
    kind: ContentKind,
    slug: &str,
    connection: &Connection,
) -> Result<Content, Error> {
    let mut content = connection
        .query_row(
            &format!("{} WHERE slug = ?1", select_columns(kind)),
            (slug,),
            map_row(kind),
        )
        .optional()?
        .ok_or(kind.not_found())?;

    content.tags = get_tags(kind, content.id, connection)?;

    Ok(content)
}

fn map_summary_row(kind: ContentKind) -> impl Fn(&Row) -> Result<ContentSummary, rusqlite::Error> {
    move |row| {
        Ok(ContentSummary {
            kind,
            id: row.get(0)?,
            title: row.get(1)?,
            summary: row.get(2)?,
            image: row.get(3)?,
            slug: row.get(4)?,
            tags: Vec::new(),
        })
    }
}

fn attach_tags(
    kind: ContentKind,
    mut items: Vec<ContentSummary>,
    connection: &Connection,
) -> Result<Vec<ContentSummary>, Error> {
    let ids: Vec<DatabaseId> = items.iter().map(|item| item.id).collect();
    let mut tags = get_tags_for_owners(kind, &ids, connection)?;

    for item in &mut items {
        item.tags = tags.remove(&item.id).unwrap_or_default();
    }

    Ok(items)
}

/// Get a slice of the active articles or projects ordered by ID, and the
/// number of active items in total.
pub fn get_active_content(
    kind: ContentKind,
    offset: u64,
    limit: u64,
    connection: &Connection,
) -> Result<(Vec<ContentSummary>, u64), Error> {
    let items = connection
        .prepare(&format!(
            "SELECT id, {title}, summary, image, slug
            FROM {table}
            WHERE status = ?1
            ORDER BY id
            LIMIT ?2 OFFSET ?3",
            table = kind.table(),
            title = kind.title_column(),
        ))?
        .query_map(
            (ContentStatus::Active, sql_count(limit), sql_count(offset)),
            map_summary_row(kind),
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total: i64 = connection.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE status = ?1", kind.table()),
        (ContentStatus::Active,),
        |row| row.get(0),
    )?;

    Ok((attach_tags(kind, items, connection)?, total as u64))
}

/// Get up to [MAX_RELATED] other active items that share a tag with `content`.
pub fn get_related_content(
    content: &Content,
    connection: &Connection,
) -> Result<Vec<ContentSummary>, Error> {
    let kind = content.kind;

    let items = connection
        .prepare(&format!(
            "SELECT DISTINCT c.id, c.{title}, c.summary, c.image, c.slug
            FROM {table} c
            JOIN {link_table} l ON l.{link_column} = c.id
            WHERE c.status = ?1
                AND c.id != ?2
                AND l.fk_tag_id IN (
                    SELECT fk_tag_id FROM {link_table} WHERE {link_column} = ?2
                )
            ORDER BY c.id
            LIMIT ?3",
            table = kind.table(),
            title = kind.title_column(),
            link_table = kind.tag_link_table(),
            link_column = kind.tag_link_column(),
        ))?
        .query_map(
            (ContentStatus::Active, content.id, MAX_RELATED as i64),
            map_summary_row(kind),
        )?
        .collect::<Result<Vec<_>, _>>()?;

    attach_tags(kind, items, connection)
}

/// Replace the fields of the item with `slug`.
///
/// The slug follows the new title. Tags are only replaced when the form
/// includes them.
///
/// # Errors
/// Returns:
/// - [Error::Validation] if a field of the form is invalid,
/// - [Error::ArticleNotFound] or [Error::ProjectNotFound] if no item has `slug`,
/// - [Error::DuplicateSlug] if the new slug belongs to another item,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn update_content(
    kind: ContentKind,
    slug: &str,
    form: &ContentForm,
    connection: &Connection,
) -> Result<Content, Error> {
    let content = form.validate(kind)?;
    let id = get_content(kind, slug, connection)?.id;

    let transaction = connection.unchecked_transaction()?;

    transaction
        .execute(
            &format!(
                "UPDATE {table}
                SET {title} = ?1, slug = ?2, image = ?3, summary = ?4, description = ?5,
                    email = ?6, status = ?7, updated_at = ?8
                WHERE id = ?9",
                table = kind.table(),
                title = kind.title_column(),
            ),
            (
                &content.title,
                &content.slug,
                &content.image,
                &content.summary,
                &content.description,
                &content.email,
                content.status,
                OffsetDateTime::now_utc(),
                id,
            ),
        )
        .map_err(map_slug_conflict(&content.slug))?;

    if let Some(tags) = &content.tags {
        set_tags(kind, id, tags, &transaction)?;
    }

    transaction.commit()?;

    get_content(kind, &content.slug, connection)
}

/// Permanently delete the item with `slug` and its tag links.
///
/// # Errors
/// Returns [Error::ArticleNotFound] or [Error::ProjectNotFound] if no item
/// has `slug`.
pub fn delete_content(kind: ContentKind, slug: &str, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!("DELETE FROM {} WHERE slug = ?1", kind.table()),
        (slug,),
    )?;

    if rows_affected == 0 {
        return Err(kind.not_found());
    }

    Ok(())
}
