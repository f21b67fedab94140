//! The public landing page with projects, articles and a contact form.

use axum::{
    Extension,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    content::{ContentKind, ContentSummary, DEFAULT_LIST_LIMIT, ListQuery, get_active_content},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        base, loading_spinner, stored_text,
    },
    message::MessageForm,
    portfolio::tag_badges,
};

/// The line shown above the contact form after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactNotice<'a> {
    /// Nothing has been submitted yet.
    None,
    /// The message was stored.
    Sent,
    /// The message was rejected, with the reason.
    Failed(&'a str),
}

/// The contact form, filled with `form` so a rejected message is not lost.
pub fn contact_form(form: &MessageForm, notice: ContactNotice) -> Markup {
    let value = |field: &Option<String>| field.clone().unwrap_or_default();

    html! {
        form
            id="contact-form"
            hx-post=(endpoints::MESSAGES)
            hx-target="this"
            hx-target-error="this"
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            class="space-y-4 w-full"
        {
            @match notice {
                ContactNotice::None => {},
                ContactNotice::Sent => {
                    p role="status" class="text-green-700 dark:text-green-400"
                    {
                        "Thanks, your message was sent."
                    }
                },
                ContactNotice::Failed(reason) => {
                    p role="alert" class="text-red-600 dark:text-red-500" { (reason) }
                },
            }

            div
            {
                label for="subject" class=(FORM_LABEL_STYLE) { "Subject" }
                input
                    type="text"
                    name="subject"
                    id="subject"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(value(&form.subject));
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "E-mail" }
                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="name@example.com"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=(value(&form.email));
            }

            div
            {
                label for="message" class=(FORM_LABEL_STYLE) { "Message" }
                textarea
                    name="message"
                    id="message"
                    rows="5"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (value(&form.message))
                }
            }

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" { (loading_spinner()) }
                " Send"
            }
        }
    }
}

/// The cards for one page of `kind`, followed by a "View more" button that
/// replaces itself with the next page when there are more to show.
fn card_page(kind: ContentKind, items: &[ContentSummary], offset: u64, total: u64) -> Markup {
    let (detail_view, more_view) = match kind {
        ContentKind::Article => (endpoints::ARTICLE_VIEW, endpoints::MORE_ARTICLES),
        ContentKind::Project => (endpoints::PROJECT_VIEW, endpoints::MORE_PROJECTS),
    };
    let next_offset = offset.saturating_add(items.len() as u64);

    html! {
        @for item in items {
            article
                class="rounded-lg border border-gray-200 bg-white p-4 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                data-slug=(item.slug)
            {
                @if let Some(image) = &item.image {
                    img src=(image) alt="" class="mb-3 rounded w-full h-40 object-cover";
                }

                h3 class="text-lg font-semibold"
                {
                    a href=(format_endpoint(detail_view, &item.slug)) class="hover:underline"
                    {
                        (stored_text(&item.title))
                    }
                }

                @if let Some(summary) = &item.summary {
                    p class="mt-2 text-sm text-gray-600 dark:text-gray-300" { (stored_text(summary)) }
                }

                (tag_badges(&item.tags))
            }
        }

        @if !items.is_empty() && next_offset < total {
            button
                type="button"
                hx-get={ (more_view) "?offset=" (next_offset) "&limit=" (DEFAULT_LIST_LIMIT) }
                hx-target="this"
                hx-swap="outerHTML"
                class="col-span-full justify-self-center px-4 py-2 rounded border border-gray-300 dark:border-gray-600 hover:bg-gray-100 dark:hover:bg-gray-800"
            {
                "View more"
            }
        }
    }
}

fn content_cards(kind: ContentKind, items: &[ContentSummary], total: u64) -> Markup {
    html! {
        div class="grid grid-cols-1 gap-4 md:grid-cols-3"
        {
            (card_page(kind, items, 0, total))

            @if items.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "Nothing here yet." }
            }
        }
    }
}

/// A page of active content shown on the landing page.
struct Shelf {
    items: Vec<ContentSummary>,
    total: u64,
}

fn home_view(projects: &Shelf, articles: &Shelf) -> Markup {
    let content = html! {
        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-10"
            {
                section id="projects" class="space-y-4"
                {
                    h2 class="text-2xl font-bold" { "Projects" }
                    (content_cards(ContentKind::Project, &projects.items, projects.total))
                }

                section id="articles" class="space-y-4"
                {
                    h2 class="text-2xl font-bold" { "Articles" }
                    (content_cards(ContentKind::Article, &articles.items, articles.total))
                }

                section id="contact" class="space-y-4 max-w-xl"
                {
                    h2 class="text-2xl font-bold" { "Get in touch" }
                    (contact_form(&MessageForm::default(), ContactNotice::None))
                }
            }
        }
    };

    base("Home", &content)
}

/// Display the portfolio landing page.
pub async fn get_home_page(State(state): State<DbState>) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let shelf = |kind| {
                get_active_content(kind, 0, DEFAULT_LIST_LIMIT, &connection)
                    .map(|(items, total)| Shelf { items, total })
            };

            Ok((shelf(ContentKind::Project)?, shelf(ContentKind::Article)?))
        });

    match result {
        Ok((projects, articles)) => {
            Html(home_view(&projects, &articles).into_string()).into_response()
        }
        Err(error) => error.into_page_response(),
    }
}

/// A route handler for the next cards of a kind, for the "View more" button.
pub async fn get_more_content(
    State(state): State<DbState>,
    Extension(kind): Extension<ContentKind>,
    Query(query): Query<ListQuery>,
) -> Response {
    let (offset, limit) = (query.offset(), query.limit());

    let page = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_active_content(kind, offset, limit, &connection));

    match page {
        Ok((items, total)) => Html(card_page(kind, &items, offset, total).into_string()).into_response(),
        Err(error) => error.into_response(),
    }
}
