//! Core types shared by articles and projects.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    database_id::DatabaseId,
    sanitize::{
        clean_optional_text, clean_text, is_plausible_email, is_plausible_url, slugify, trimmed,
    },
    tag::{Tag, TagName},
};

/// Whether a piece of content is a blog article or a portfolio project.
///
/// Both are stored the same way apart from projects having a contact e-mail,
/// and both are shown to clients under keys named after the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// A blog article.
    Article,
    /// A portfolio project.
    Project,
}

impl ContentKind {
    /// The table that holds content of this kind.
    pub(crate) fn table(self) -> &'static str {
        match self {
            ContentKind::Article => "articles",
            ContentKind::Project => "projects",
        }
    }

    /// The column, and JSON key, holding the heading.
    pub(crate) fn title_column(self) -> &'static str {
        match self {
            ContentKind::Article => "title",
            ContentKind::Project => "name",
        }
    }

    /// The prefix of the keys in list responses, e.g. `article_id`.
    pub(crate) fn key_prefix(self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Project => "project",
        }
    }

    /// The table linking content of this kind to tags.
    pub(crate) fn tag_link_table(self) -> &'static str {
        match self {
            ContentKind::Article => "article_tags",
            ContentKind::Project => "project_tags",
        }
    }

    /// The column of [Self::tag_link_table] referencing the content.
    pub(crate) fn tag_link_column(self) -> &'static str {
        match self {
            ContentKind::Article => "fk_article_id",
            ContentKind::Project => "fk_project_id",
        }
    }

    /// The key of the list in list responses.
    pub(crate) fn list_key(self) -> &'static str {
        match self {
            ContentKind::Article => "articles",
            ContentKind::Project => "projects",
        }
    }

    /// The key of the total count in list responses.
    pub(crate) fn total_key(self) -> &'static str {
        match self {
            ContentKind::Article => "totalArticles",
            ContentKind::Project => "totalProjects",
        }
    }

    /// The key of the related items in detail responses.
    pub(crate) fn related_key(self) -> &'static str {
        match self {
            ContentKind::Article => "relatedArticles",
            ContentKind::Project => "relatedProjects",
        }
    }

    /// The error for a slug that does not match any content of this kind.
    pub(crate) fn not_found(self) -> Error {
        match self {
            ContentKind::Article => Error::ArticleNotFound,
            ContentKind::Project => Error::ProjectNotFound,
        }
    }
}

/// Whether content is shown on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    /// Listed on the public site.
    #[default]
    Active,
    /// Hidden from the public lists.
    Inactive,
}

impl ContentStatus {
    fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Active => "active",
            ContentStatus::Inactive => "inactive",
        }
    }

    fn parse(text: &str) -> Result<Self, Error> {
        match text.trim() {
            "active" => Ok(ContentStatus::Active),
            "inactive" => Ok(ContentStatus::Inactive),
            _ => Err(Error::Validation(
                "Status must be either active or inactive".to_owned(),
            )),
        }
    }
}

impl ToSql for ContentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ContentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        ContentStatus::parse(value.as_str()?)
            .map_err(|error| FromSqlError::Other(error.to_string().into()))
    }
}

/// An article or project with its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    /// Whether this is an article or a project.
    pub kind: ContentKind,
    /// The ID of the content within its table.
    pub id: DatabaseId,
    /// The title of an article or the name of a project.
    pub title: String,
    /// The unique URL friendly form of the title.
    pub slug: String,
    /// The URL of the cover image.
    pub image: Option<String>,
    /// A short teaser.
    pub summary: Option<String>,
    /// The body text.
    pub description: Option<String>,
    /// The contact e-mail of a project.
    pub email: Option<String>,
    /// Whether the content is publicly listed.
    pub status: ContentStatus,
    /// When the content was created.
    pub created_at: OffsetDateTime,
    /// When the content was last changed.
    pub updated_at: Option<OffsetDateTime>,
    /// The tags of the content, ordered by name.
    pub tags: Vec<Tag>,
}

fn format_timestamp(timestamp: OffsetDateTime) -> Value {
    timestamp
        .format(&Rfc3339)
        .map(Value::from)
        .unwrap_or(Value::Null)
}

impl Content {
    /// The JSON object sent to clients, using `name` instead of `title` for
    /// projects and only including `email` for projects.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();

        object.insert("id".to_owned(), json!(self.id));
        object.insert(self.kind.title_column().to_owned(), json!(self.title));
        object.insert("slug".to_owned(), json!(self.slug));
        object.insert("image".to_owned(), json!(self.image));
        object.insert("summary".to_owned(), json!(self.summary));
        object.insert("description".to_owned(), json!(self.description));
        if self.kind == ContentKind::Project {
            object.insert("email".to_owned(), json!(self.email));
        }
        object.insert("status".to_owned(), json!(self.status));
        object.insert("created_at".to_owned(), format_timestamp(self.created_at));
        object.insert(
            "updated_at".to_owned(),
            self.updated_at.map_or(Value::Null, format_timestamp),
        );
        object.insert("tags".to_owned(), json!(self.tags));

        Value::Object(object)
    }
}

/// The fields of an article or project shown in lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSummary {
    /// Whether this is an article or a project.
    pub kind: ContentKind,
    /// The ID of the content within its table.
    pub id: DatabaseId,
    /// The title of an article or the name of a project.
    pub title: String,
    /// A short teaser.
    pub summary: Option<String>,
    /// The URL of the cover image.
    pub image: Option<String>,
    /// The unique URL friendly form of the title.
    pub slug: String,
    /// The tags of the content, ordered by name.
    pub tags: Vec<Tag>,
}

impl ContentSummary {
    /// The list item JSON with keys prefixed by the kind, e.g. `article_title`.
    pub fn to_list_json(&self) -> Value {
        let prefix = self.kind.key_prefix();
        let mut object = Map::new();

        object.insert(format!("{prefix}_id"), json!(self.id));
        object.insert(
            format!("{prefix}_{}", self.kind.title_column()),
            json!(self.title),
        );
        object.insert(format!("{prefix}_summary"), json!(self.summary));
        object.insert(format!("{prefix}_image"), json!(self.image));
        object.insert(format!("{prefix}_slug"), json!(self.slug));
        object.insert("tags".to_owned(), json!(self.tags));

        Value::Object(object)
    }

    /// The JSON for a related item shown next to a detail page.
    pub fn to_related_json(&self) -> Value {
        let mut object = Map::new();

        object.insert("id".to_owned(), json!(self.id));
        object.insert(self.kind.title_column().to_owned(), json!(self.title));
        object.insert("summary".to_owned(), json!(self.summary));
        object.insert("slug".to_owned(), json!(self.slug));
        object.insert("image".to_owned(), json!(self.image));
        object.insert("tags".to_owned(), json!(self.tags));

        Value::Object(object)
    }
}

/// The client supplied fields for creating or updating an article or project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentForm {
    /// The title of an article or the name of a project.
    #[serde(alias = "name")]
    pub title: Option<String>,
    /// A short teaser, required for articles.
    pub summary: Option<String>,
    /// The URL of the cover image.
    pub image: Option<String>,
    /// The body text.
    pub description: Option<String>,
    /// "active" or "inactive", defaults to active.
    pub status: Option<String>,
    /// The contact e-mail, required for projects.
    pub email: Option<String>,
    /// Tag names. Leaving this out on update keeps the current tags.
    pub tags: Option<Vec<String>>,
}

/// The fields of an article or project after validation and cleaning.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidContent {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub status: ContentStatus,
    pub email: Option<String>,
    pub tags: Option<Vec<TagName>>,
}

impl ContentForm {
    /// Check the fields of the form for `kind` and clean the text.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first invalid field.
    pub(crate) fn validate(&self, kind: ContentKind) -> Result<ValidContent, Error> {
        let title = self.title.as_deref().map(clean_text).unwrap_or_default();

        if title.is_empty() {
            return Err(Error::Validation(match kind {
                ContentKind::Article => "Title is required".to_owned(),
                ContentKind::Project => "Name is required".to_owned(),
            }));
        }

        let slug = slugify(&title);

        if slug.is_empty() {
            return Err(Error::Validation(format!(
                "The {} must contain a letter or digit",
                kind.title_column()
            )));
        }

        let summary = clean_optional_text(self.summary.as_deref());

        if kind == ContentKind::Article && summary.is_none() {
            return Err(Error::Validation("Summary is required".to_owned()));
        }

        let email = match kind {
            ContentKind::Article => None,
            ContentKind::Project => {
                let email = trimmed(self.email.as_deref()).unwrap_or_default();

                if !is_plausible_email(&email) {
                    return Err(Error::Validation("Valid email is required".to_owned()));
                }

                Some(email)
            }
        };

        let image = trimmed(self.image.as_deref());

        if image.as_deref().is_some_and(|image| !is_plausible_url(image)) {
            return Err(Error::Validation("Image must be an http(s) URL".to_owned()));
        }

        let status = match self.status.as_deref() {
            None => ContentStatus::default(),
            Some(status) => ContentStatus::parse(status)?,
        };

        let tags = self
            .tags
            .as_ref()
            .map(|names| {
                names
                    .iter()
                    .map(|name| TagName::new(name))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(ValidContent {
            title,
            slug,
            summary,
            image,
            description: clean_optional_text(self.description.as_deref()),
            status,
            email,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::Error;

    use super::{Content, ContentForm, ContentKind, ContentStatus, ContentSummary};

    fn article_form() -> ContentForm {
        ContentForm {
            title: Some("Hello, World!".to_owned()),
            summary: Some("A first post".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn article_requires_title_and_summary() {
        let form = ContentForm {
            title: Some("  ".to_owned()),
            ..article_form()
        };
        assert_eq!(
            form.validate(ContentKind::Article),
            Err(Error::Validation("Title is required".to_owned()))
        );

        let form = ContentForm {
            summary: None,
            ..article_form()
        };
        assert_eq!(
            form.validate(ContentKind::Article),
            Err(Error::Validation("Summary is required".to_owned()))
        );
    }

    #[test]
    fn article_slug_comes_from_title() {
        let valid = article_form().validate(ContentKind::Article).unwrap();

        assert_eq!(valid.slug, "hello-world");
        assert_eq!(valid.status, ContentStatus::Active);
        assert_eq!(valid.email, None);
        assert_eq!(valid.tags, None);
    }

    #[test]
    fn project_requires_name_and_email() {
        let form: ContentForm = serde_json::from_value(json!({"name": "Folio"})).unwrap();
        assert_eq!(
            form.validate(ContentKind::Project),
            Err(Error::Validation("Valid email is required".to_owned()))
        );

        let form: ContentForm =
            serde_json::from_value(json!({"email": "me@example.com"})).unwrap();
        assert_eq!(
            form.validate(ContentKind::Project),
            Err(Error::Validation("Name is required".to_owned()))
        );

        let form: ContentForm =
            serde_json::from_value(json!({"name": "Folio", "email": "me@example.com"})).unwrap();
        let valid = form.validate(ContentKind::Project).unwrap();
        assert_eq!(valid.title, "Folio");
        assert_eq!(valid.email.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn rejects_unknown_status_and_bad_tags() {
        let form = ContentForm {
            status: Some("draft".to_owned()),
            ..article_form()
        };
        assert!(matches!(
            form.validate(ContentKind::Article),
            Err(Error::Validation(_))
        ));

        let form = ContentForm {
            tags: Some(vec!["ok".to_owned(), " ".to_owned()]),
            ..article_form()
        };
        assert!(matches!(
            form.validate(ContentKind::Article),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn image_must_be_a_plain_http_url() {
        let form = ContentForm {
            image: Some(r#"x.png" onerror="alert(1)"#.to_owned()),
            ..article_form()
        };
        assert_eq!(
            form.validate(ContentKind::Article),
            Err(Error::Validation("Image must be an http(s) URL".to_owned()))
        );

        let form = ContentForm {
            image: Some(" https://example.com/cover.png?w=1&h=2 ".to_owned()),
            ..article_form()
        };
        let valid = form.validate(ContentKind::Article).unwrap();
        assert_eq!(
            valid.image.as_deref(),
            Some("https://example.com/cover.png?w=1&h=2")
        );
    }

    #[test]
    fn strips_script_from_fields() {
        let form = ContentForm {
            description: Some("<p>Hi</p><script>alert(1)</script>".to_owned()),
            ..article_form()
        };

        let valid = form.validate(ContentKind::Article).unwrap();

        assert_eq!(valid.description.as_deref(), Some("<p>Hi</p>"));
    }

    #[test]
    fn project_json_uses_name_and_email() {
        let project = Content {
            kind: ContentKind::Project,
            id: 3,
            title: "Folio".to_owned(),
            slug: "folio".to_owned(),
            image: None,
            summary: None,
            description: None,
            email: Some("me@example.com".to_owned()),
            status: ContentStatus::Active,
            created_at: datetime!(2025-01-02 03:04:05 UTC),
            updated_at: None,
            tags: Vec::new(),
        };

        assert_eq!(
            project.to_json(),
            json!({
                "id": 3,
                "name": "Folio",
                "slug": "folio",
                "image": null,
                "summary": null,
                "description": null,
                "email": "me@example.com",
                "status": "active",
                "created_at": "2025-01-02T03:04:05Z",
                "updated_at": null,
                "tags": [],
            })
        );
    }

    #[test]
    fn list_json_prefixes_keys() {
        let article = ContentSummary {
            kind: ContentKind::Article,
            id: 1,
            title: "Hello".to_owned(),
            summary: Some("Hi".to_owned()),
            image: None,
            slug: "hello".to_owned(),
            tags: Vec::new(),
        };

        assert_eq!(
            article.to_list_json(),
            json!({
                "article_id": 1,
                "article_title": "Hello",
                "article_summary": "Hi",
                "article_image": null,
                "article_slug": "hello",
                "tags": [],
            })
        );
    }
}
