//! The pages listing incomes and expenses.

use axum::{
    Extension,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::ListState,
    auth::UserID,
    config::get_paginate_rows,
    endpoints::format_endpoint,
    html::{
        BUTTON_DELETE_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
        stored_text,
    },
    ledger::{Entry, EntryKind, form::EntryViews, get_entries_page},
    navigation::NavBar,
    pagination::{PageQuery, PageRequest, Paged, pagination_nav},
};

/// The URL of a page of the list, keeping the search term.
fn page_url(base_url: &str, page: u64, page_size: u64, search: Option<&str>) -> String {
    let mut params = vec![
        ("page", page.to_string()),
        ("pageSize", page_size.to_string()),
    ];

    if let Some(search) = search {
        params.push(("search", search.to_owned()));
    }

    match serde_urlencoded::to_string(params) {
        Ok(query) => format!("{base_url}?{query}"),
        Err(error) => {
            tracing::warn!("could not encode page query: {error}");
            format!("{base_url}?page={page}&pageSize={page_size}")
        }
    }
}

fn entries_view(
    kind: EntryKind,
    page: &Paged<Entry>,
    search: Option<&str>,
    max_pages: u64,
) -> Markup {
    let views = EntryViews::of(kind);
    let (title, view_url) = (views.title, views.list);
    let nav_bar = NavBar::new(view_url).into_html();
    let page_size = page.pagination.page_size;

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div class="flex items-center gap-4"
                    {
                        h1 class="text-xl font-bold" { (title) }
                        a href=(views.new) class=(LINK_STYLE) { "Add " (views.noun) }
                    }

                    form method="get" action=(view_url) class="flex gap-2" role="search"
                    {
                        input type="hidden" name="pageSize" value=(page_size);
                        input
                            type="search"
                            name="search"
                            placeholder="Search description or wallet"
                            aria-label="Search"
                            class=(FORM_TEXT_INPUT_STYLE)
                            value=[search];
                    }
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Wallet" }
                            th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for entry in &page.data {
                            tr class=(TABLE_ROW_STYLE) data-entry-id=(entry.id)
                            {
                                td class=(TABLE_CELL_STYLE)
                                {
                                    time datetime=(entry.date) { (entry.date) }
                                }
                                td class=(TABLE_CELL_STYLE) { (stored_text(&entry.description)) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if let Some(wallet_name) = &entry.wallet_name {
                                        (stored_text(wallet_name))
                                    }
                                }
                                td class="px-6 py-4 text-right tabular-nums"
                                {
                                    (format_currency(entry.amount, entry.currency.symbol()))
                                }
                                td class="px-6 py-4 flex gap-4"
                                {
                                    a href=(format_endpoint(views.edit, entry.id)) class=(LINK_STYLE)
                                    {
                                        "Edit"
                                    }

                                    button
                                        type="button"
                                        hx-delete=(format_endpoint(views.api_item, entry.id))
                                        hx-confirm={ "Delete this " (views.noun) "?" }
                                        hx-target="closest tr"
                                        hx-swap="delete"
                                        class=(BUTTON_DELETE_STYLE)
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }

                        @if page.data.is_empty() {
                            tr
                            {
                                td
                                    colspan="5"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    @match search {
                                        Some(_) => "No matching entries found.",
                                        None => "Nothing recorded yet.",
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination_nav(&page.pagination, max_pages, |page_number| {
                    page_url(view_url, page_number, page_size, search)
                }))
            }
        }
    );

    base(title, &content)
}

async fn render_entries_page(
    kind: EntryKind,
    state: ListState,
    user_id: UserID,
    query: PageQuery,
) -> Response {
    let search = query.search_term();

    let page = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let default_page_size = get_paginate_rows(&state.setting_defaults, &connection)?;
            let request = PageRequest::new(&query, default_page_size, &state.pagination_config);

            get_entries_page(kind, user_id, request, search, &connection)
        });

    match page {
        Ok(page) => Html(
            entries_view(kind, &page, search, state.pagination_config.max_pages).into_string(),
        )
        .into_response(),
        Err(error) => error.into_page_response(),
    }
}

/// Renders a page of the user's incomes.
pub async fn get_incomes_page(
    State(state): State<ListState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PageQuery>,
) -> Response {
    render_entries_page(EntryKind::Income, state, user_id, query).await
}

/// Renders a page of the user's expenses.
pub async fn get_expenses_page(
    State(state): State<ListState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PageQuery>,
) -> Response {
    render_entries_page(EntryKind::Expense, state, user_id, query).await
}
