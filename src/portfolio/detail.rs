//! The public pages for a single article or project.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    content::{Content, ContentKind, ContentSummary, get_content, get_related_content},
    endpoints::{self, format_endpoint},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, stored_text},
    portfolio::tag_badges,
};

fn detail_view(content: &Content, related: &[ContentSummary]) -> Markup {
    let (detail_view, related_title) = match content.kind {
        ContentKind::Article => (endpoints::ARTICLE_VIEW, "Related articles"),
        ContentKind::Project => (endpoints::PROJECT_VIEW, "Related projects"),
    };

    let body = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-3xl space-y-6"
            {
                nav { a href=(endpoints::ROOT) class=(LINK_STYLE) { "Home" } }

                article class="space-y-4"
                {
                    h1 class="text-3xl font-bold" { (stored_text(&content.title)) }

                    (tag_badges(&content.tags))

                    @if let Some(image) = &content.image {
                        img src=(image) alt="" class="rounded w-full";
                    }

                    @if let Some(summary) = &content.summary {
                        p class="text-lg text-gray-600 dark:text-gray-300" { (stored_text(summary)) }
                    }

                    @if let Some(description) = &content.description {
                        div class="prose dark:prose-invert" { (stored_text(description)) }
                    }

                    @if let Some(email) = &content.email {
                        p
                        {
                            "Contact: "
                            a href={ "mailto:" (email) } class=(LINK_STYLE) { (email) }
                        }
                    }
                }

                @if !related.is_empty() {
                    section id="related" class="space-y-2"
                    {
                        h2 class="text-xl font-semibold" { (related_title) }

                        ul class="list-disc list-inside"
                        {
                            @for item in related {
                                li
                                {
                                    a href=(format_endpoint(detail_view, &item.slug)) class=(LINK_STYLE)
                                    {
                                        (stored_text(&item.title))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base(&content.title, &body)
}

fn render_detail_page(state: &DbState, kind: ContentKind, slug: &str) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let content = get_content(kind, slug, &connection)?;
            let related = get_related_content(&content, &connection)?;

            Ok((content, related))
        });

    match result {
        Ok((content, related)) => {
            Html(detail_view(&content, &related).into_string()).into_response()
        }
        Err(error) => error.into_page_response(),
    }
}

/// Display a single article with its tags and related articles.
pub async fn get_article_page(State(state): State<DbState>, Path(slug): Path<String>) -> Response {
    render_detail_page(&state, ContentKind::Article, &slug)
}

/// Display a single project with its tags and related projects.
pub async fn get_project_page(State(state): State<DbState>, Path(slug): Path<String>) -> Response {
    render_detail_page(&state, ContentKind::Project, &slug)
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};
    use time::OffsetDateTime;

    use crate::{
        app_state::DbState,
        content::{Content, ContentForm, ContentKind, ContentStatus, create_content},
        test_utils::{
            assert_status_ok, assert_valid_html, get_test_connection, parse_html_document, shared,
        },
    };

    use super::{detail_view, get_article_page, get_project_page};

    fn state() -> DbState {
        let connection = get_test_connection();
        for (title, tag) in [("Main", "rust"), ("Sibling", "rust"), ("Stranger", "cooking")] {
            create_content(
                ContentKind::Article,
                &ContentForm {
                    title: Some(title.to_owned()),
                    summary: Some(format!("{title} summary")),
                    description: Some("<p>Body</p>".to_owned()),
                    tags: Some(vec![tag.to_owned()]),
                    ..Default::default()
                },
                &connection,
            )
            .unwrap();
        }

        DbState {
            db_connection: shared(connection),
        }
    }

    #[tokio::test]
    async fn article_page_shows_tags_and_related() {
        let response = get_article_page(State(state()), Path("main".to_owned())).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let title: String = html
            .select(&Selector::parse("h1").unwrap())
            .flat_map(|element| element.text())
            .collect();
        assert_eq!(title, "Main");
        let tags: Vec<String> = html
            .select(&Selector::parse("article [data-tag]").unwrap())
            .map(|element| element.text().collect())
            .collect();
        assert_eq!(tags, ["rust"]);
        let related: Vec<_> = html
            .select(&Selector::parse("#related a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(related, ["/article/sibling"]);
    }

    #[tokio::test]
    async fn unknown_slug_is_404_page() {
        let response = get_project_page(State(state()), Path("main".to_owned())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn quotes_in_attribute_values_stay_inside_the_attribute() {
        let image = r#"x.png" onerror="alert(1)"#;
        let email = r#"me@x.com" onmouseover="alert(1)"#;
        let content = Content {
            kind: ContentKind::Project,
            id: 1,
            title: "Folio".to_owned(),
            slug: "folio".to_owned(),
            image: Some(image.to_owned()),
            summary: None,
            description: None,
            email: Some(email.to_owned()),
            status: ContentStatus::Active,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: None,
            tags: Vec::new(),
        };

        let html = Html::parse_document(&detail_view(&content, &[]).into_string());

        let img = html
            .select(&Selector::parse("article img").unwrap())
            .next()
            .expect("image missing");
        assert_eq!(img.value().attr("src"), Some(image));
        assert_eq!(img.value().attr("onerror"), None);
        let link = html
            .select(&Selector::parse("a[href^=mailto]").unwrap())
            .next()
            .expect("mailto link missing");
        assert_eq!(link.value().attr("onmouseover"), None);
        assert_eq!(
            link.value().attr("href"),
            Some(format!("mailto:{email}").as_str())
        );
    }
}
