//! The page listing the cashbook ledger.

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
    cashbook::{CashbookEntry, get_cashbook_page},
    config::{get_default_currency, get_paginate_rows},
    endpoints,
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    ledger::Currency,
    navigation::NavBar,
    pagination::{PageQuery, PageRequest, Paged, pagination_nav},
};

fn source(entry: &CashbookEntry) -> String {
    match (entry.income_id, entry.expense_id) {
        (Some(id), _) => format!("Income #{id}"),
        (_, Some(id)) => format!("Expense #{id}"),
        (None, None) => String::new(),
    }
}

fn cashbook_view(page: &Paged<CashbookEntry>, symbol: &str, max_pages: u64) -> Markup {
    let nav_bar = NavBar::new(endpoints::CASHBOOK_VIEW).into_html();
    let page_size = page.pagination.page_size;

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Cashbook" }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Source" }
                            th scope="col" class="px-6 py-3 text-right" { "In" }
                            th scope="col" class="px-6 py-3 text-right" { "Out" }
                        }
                    }

                    tbody
                    {
                        @for entry in &page.data {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { time datetime=(entry.date) { (entry.date) } }
                                td class=(TABLE_CELL_STYLE) { (source(entry)) }
                                td class="px-6 py-4 text-right tabular-nums text-green-700 dark:text-green-400"
                                {
                                    @if entry.in_amount > 0.0 { (format_currency(entry.in_amount, symbol)) }
                                }
                                td class="px-6 py-4 text-right tabular-nums text-red-700 dark:text-red-400"
                                {
                                    @if entry.out_amount > 0.0 { (format_currency(entry.out_amount, symbol)) }
                                }
                            }
                        }

                        @if page.data.is_empty() {
                            tr
                            {
                                td
                                    colspan="4"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "The cashbook is empty."
                                }
                            }
                        }
                    }
                }

                (pagination_nav(&page.pagination, max_pages, |page_number| {
                    format!("{}?page={page_number}&pageSize={page_size}", endpoints::CASHBOOK_VIEW)
                }))
            }
        }
    );

    base("Cashbook", &content)
}

/// Renders a page of the user's cashbook.
///
/// Amounts are shown with the symbol of the default currency.
pub async fn get_cashbook_view(
    State(state): State<ListState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PageQuery>,
) -> Response {
    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let default_page_size = get_paginate_rows(&state.setting_defaults, &connection)?;
            let request = PageRequest::new(&query, default_page_size, &state.pagination_config);
            let currency = get_default_currency(&state.setting_defaults, &connection)?
                .parse::<Currency>()
                .unwrap_or(state.setting_defaults.default_currency);

            Ok((get_cashbook_page(user_id, request, &connection)?, currency))
        });

    match result {
        Ok((page, currency)) => Html(
            cashbook_view(&page, currency.symbol(), state.pagination_config.max_pages)
                .into_string(),
        )
        .into_response(),
        Err(error) => error.into_page_response(),
    }
}
