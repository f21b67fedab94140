//! Displays the user's wallets.

use axum::{
    Extension,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    app_state::DbState,
    auth::UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, stored_text,
    },
    navigation::NavBar,
    wallet::{Wallet, get_wallets},
};

fn wallets_view(wallets: &[Wallet]) -> Markup {
    let nav_bar = NavBar::new(endpoints::WALLETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Wallets" }
                    a href=(endpoints::NEW_WALLET_VIEW) class=(LINK_STYLE) { "Add wallet" }
                }

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for wallet in wallets {
                            tr class=(TABLE_ROW_STYLE) data-wallet-id=(wallet.id)
                            {
                                th
                                    scope="row"
                                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                                {
                                    (stored_text(&wallet.name))
                                }

                                td class=(TABLE_CELL_STYLE)
                                {
                                    time datetime=(wallet.created_at.date()) { (wallet.created_at.date()) }
                                }

                                td class="px-6 py-4 flex gap-4"
                                {
                                    a
                                        href=(format_endpoint(endpoints::EDIT_WALLET_VIEW, wallet.id))
                                        class=(LINK_STYLE)
                                    {
                                        "Rename"
                                    }

                                    button
                                        type="button"
                                        hx-delete=(format_endpoint(endpoints::WALLET, wallet.id))
                                        hx-confirm="Delete this wallet? Entries filed under it are kept."
                                        hx-target="closest tr"
                                        hx-swap="delete"
                                        class=(BUTTON_DELETE_STYLE)
                                    {
                                        "Delete"
                                    }
                                }
                            }
                        }

                        @if wallets.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No wallets found."
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Wallets", &content)
}

/// Renders the page listing the user's wallets.
pub async fn get_wallets_page(
    State(state): State<DbState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let wallets = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_wallets(user_id, &connection));

    match wallets {
        Ok(wallets) => Html(wallets_view(&wallets).into_string()).into_response(),
        Err(error) => error.into_page_response(),
    }
}
