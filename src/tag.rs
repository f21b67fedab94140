//! Tags shared by articles and projects.
//!
//! Tags are identified by their slug, so "Rust" and "rust" are the same tag.

use std::{collections::HashMap, fmt::Display};

use rusqlite::{Connection, Row, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    content::ContentKind,
    database_id::DatabaseId,
    sanitize::{clean_text, slugify},
};

/// The name of a tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TagName(String);

impl TagName {
    /// Create a tag name from client input.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the cleaned name is empty or has no
    /// letters or digits to build a slug from.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = clean_text(name);

        if name.is_empty() || slugify(&name).is_empty() {
            Err(Error::Validation(
                "Tag names must contain a letter or digit".to_owned(),
            ))
        } else {
            Ok(Self(name))
        }
    }

    /// The slug the tag is stored under.
    pub fn slug(&self) -> String {
        slugify(&self.0)
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag attached to articles or projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// The ID of the tag.
    pub id: DatabaseId,
    /// The display name of the tag.
    pub name: String,
    /// The URL friendly form of the name.
    pub slug: String,
}

/// Create the tags table and the tables linking tags to articles and projects.
///
/// The articles and projects tables must exist first.
pub fn create_tag_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        )",
        (),
    )?;

    for kind in [ContentKind::Article, ContentKind::Project] {
        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {link_table} (
                {link_column} INTEGER NOT NULL REFERENCES {table}(id) ON DELETE CASCADE,
                fk_tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY ({link_column}, fk_tag_id)
            );

            CREATE INDEX IF NOT EXISTS idx_{link_table}_tag ON {link_table}(fk_tag_id);",
            link_table = kind.tag_link_table(),
            link_column = kind.tag_link_column(),
            table = kind.table(),
        ))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Tag, rusqlite::Error> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
    })
}

/// Get the tag with the slug of `name`, creating it if needed.
pub fn get_or_create_tag(name: &TagName, connection: &Connection) -> Result<Tag, Error> {
    let slug = name.slug();

    connection.execute(
        "INSERT INTO tags (name, slug) VALUES (?1, ?2) ON CONFLICT(slug) DO NOTHING",
        (name.as_ref(), &slug),
    )?;

    connection
        .query_row(
            "SELECT id, name, slug FROM tags WHERE slug = ?1",
            (&slug,),
            map_row,
        )
        .map_err(Error::from)
}

/// Replace the tags of an article or project.
///
/// Duplicate names are only linked once.
pub fn set_tags(
    kind: ContentKind,
    owner_id: DatabaseId,
    names: &[TagName],
    connection: &Connection,
) -> Result<Vec<Tag>, Error> {
    connection.execute(
        &format!(
            "DELETE FROM {link_table} WHERE {link_column} = ?1",
            link_table = kind.tag_link_table(),
            link_column = kind.tag_link_column(),
        ),
        (owner_id,),
    )?;

    let insert_query = format!(
        "INSERT OR IGNORE INTO {link_table} ({link_column}, fk_tag_id) VALUES (?1, ?2)",
        link_table = kind.tag_link_table(),
        link_column = kind.tag_link_column(),
    );

    for name in names {
        let tag = get_or_create_tag(name, connection)?;
        connection.execute(&insert_query, (owner_id, tag.id))?;
    }

    get_tags(kind, owner_id, connection)
}

/// Get the tags of an article or project ordered by name.
pub fn get_tags(
    kind: ContentKind,
    owner_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Tag>, Error> {
    connection
        .prepare(&format!(
            "SELECT t.id, t.name, t.slug
            FROM tags t
            JOIN {link_table} l ON t.id = l.fk_tag_id
            WHERE l.{link_column} = ?1
            ORDER BY t.name, t.id",
            link_table = kind.tag_link_table(),
            link_column = kind.tag_link_column(),
        ))?
        .query_map((owner_id,), map_row)?
        .map(|maybe_tag| maybe_tag.map_err(Error::from))
        .collect()
}

/// Get the tags of several articles or projects at once, keyed by owner ID.
///
/// Owners without tags are missing from the map.
pub fn get_tags_for_owners(
    kind: ContentKind,
    owner_ids: &[DatabaseId],
    connection: &Connection,
) -> Result<HashMap<DatabaseId, Vec<Tag>>, Error> {
    let mut tags_by_owner: HashMap<DatabaseId, Vec<Tag>> = HashMap::new();

    if owner_ids.is_empty() {
        return Ok(tags_by_owner);
    }

    let placeholders = vec!["?"; owner_ids.len()].join(", ");
    let mut statement = connection.prepare(&format!(
        "SELECT l.{link_column}, t.id, t.name, t.slug
        FROM tags t
        JOIN {link_table} l ON t.id = l.fk_tag_id
        WHERE l.{link_column} IN ({placeholders})
        ORDER BY t.name, t.id",
        link_table = kind.tag_link_table(),
        link_column = kind.tag_link_column(),
    ))?;

    let rows = statement.query_map(params_from_iter(owner_ids), |row| {
        let owner_id: DatabaseId = row.get(0)?;
        let tag = Tag {
            id: row.get(1)?,
            name: row.get(2)?,
            slug: row.get(3)?,
        };

        Ok((owner_id, tag))
    })?;

    for row in rows {
        let (owner_id, tag) = row?;
        tags_by_owner.entry(owner_id).or_default().push(tag);
    }

    Ok(tags_by_owner)
}
