//! Cards and tables for the dashboard page.

use maud::{Markup, html};

use crate::{
    dashboard::aggregation::DashboardSummary,
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency, stored_text},
};

/// Label for entries that are not filed under a wallet.
const NO_WALLET_LABEL: &str = "No wallet";

fn total_card(title: &str, amount: f64, symbol: &str, accent: &str) -> Markup {
    html! {
        div class="rounded-lg border border-gray-200 bg-white p-4 shadow-sm dark:border-gray-700 dark:bg-gray-800"
            data-total=(title)
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class={ "mt-2 text-2xl font-semibold tabular-nums " (accent) }
            {
                (format_currency(amount, symbol))
            }
        }
    }
}

/// Money in, money out and the difference for the month.
pub(super) fn totals_view(summary: &DashboardSummary, symbol: &str) -> Markup {
    html! {
        section class="grid w-full grid-cols-1 gap-4 sm:grid-cols-3"
        {
            (total_card("In", summary.total_in, symbol, "text-green-700 dark:text-green-400"))
            (total_card("Out", summary.total_out, symbol, "text-red-700 dark:text-red-400"))
            (total_card("Net", summary.net(), symbol, ""))
        }
    }
}

/// A table of per wallet totals.
pub(super) fn wallet_table(
    title: &str,
    rows: &[(Option<&str>, f64)],
    symbol: &str,
) -> Markup {
    html! {
        section class="w-full"
        {
            h2 class="text-lg font-semibold mb-2" { (title) }

            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Wallet" }
                        th scope="col" class="px-6 py-3 text-right" { "Total" }
                    }
                }

                tbody
                {
                    @for (wallet_name, total) in rows {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE)
                            {
                                @match wallet_name {
                                    Some(name) => (stored_text(name)),
                                    None => span class="italic" { (NO_WALLET_LABEL) },
                                }
                            }
                            td class="px-6 py-4 text-right tabular-nums"
                            {
                                (format_currency(*total, symbol))
                            }
                        }
                    }

                    @if rows.is_empty() {
                        tr
                        {
                            td colspan="2" class="px-6 py-4 text-center" { "Nothing this month." }
                        }
                    }
                }
            }
        }
    }
}
