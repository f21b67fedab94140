//! This modules defines the common functionality for paging data.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::html::LINK_STYLE;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of rows per page when neither the request nor the settings specify one.
    pub default_page_size: u64,
    /// The largest page size a client may ask for.
    pub max_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 50,
            max_page_size: 500,
            max_pages: 5,
        }
    }
}

/// The query string of a paged list request, e.g. `?page=2&pageSize=20&search=rent`.
///
/// Numbers are kept as text so that junk values fall back to the defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// The 1-based page number.
    pub page: Option<String>,
    /// The number of rows per page.
    pub page_size: Option<String>,
    /// An optional search term.
    pub search: Option<String>,
}

impl PageQuery {
    /// The search term, if one was given that is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: u64,
    /// The number of rows per page, at least one.
    pub page_size: u64,
}

impl PageRequest {
    /// Resolve `query` against the defaults.
    ///
    /// Missing, non-numeric or zero values use the config's default page and
    /// `default_page_size`, and the page size is capped at the config's maximum.
    pub fn new(query: &PageQuery, default_page_size: u64, config: &PaginationConfig) -> Self {
        let parse = |value: &Option<String>| {
            value
                .as_deref()
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|&value| value > 0)
        };

        let page = parse(&query.page).unwrap_or(config.default_page.max(1));
        let page_size = parse(&query.page_size)
            .unwrap_or(default_page_size)
            .clamp(1, config.max_page_size.max(1));

        Self { page, page_size }
    }

    /// The number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// The SQL `LIMIT` for the page.
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// [PageRequest::offset] as an SQLite integer.
    pub fn sql_offset(&self) -> i64 {
        sql_count(self.offset())
    }

    /// [PageRequest::limit] as an SQLite integer.
    pub fn sql_limit(&self) -> i64 {
        sql_count(self.limit())
    }
}

/// Convert a row count to an SQLite integer, saturating at `i64::MAX`.
pub fn sql_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// The pagination metadata sent alongside a page of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The 1-based page number.
    pub page: u64,
    /// The number of rows per page.
    pub page_size: u64,
    /// The number of rows across all pages.
    pub total_items: u64,
    /// The number of pages needed to show all rows.
    pub total_pages: u64,
}

impl Pagination {
    /// Describe the page `request` out of `total_items` rows.
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        Self {
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages: total_items.div_ceil(request.page_size),
        }
    }
}

/// A page of rows and the metadata describing it.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    /// The rows on the requested page.
    pub data: Vec<T>,
    /// Where the page sits in the full list.
    pub pagination: Pagination,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// Render the pagination indicators for `pagination` as a row of links.
///
/// `page_url` maps a page number to the URL for that page.
pub fn pagination_nav(
    pagination: &Pagination,
    max_pages: u64,
    page_url: impl Fn(u64) -> String,
) -> Markup {
    let indicators =
        create_pagination_indicators(pagination.page, pagination.total_pages, max_pages);

    html! {
        nav class="pagination flex gap-3 justify-center py-4" aria-label="Pagination"
        {
            @for indicator in indicators {
                @match indicator {
                    PaginationIndicator::Page(page) => a href=(page_url(page)) class=(LINK_STYLE) { (page) },
                    PaginationIndicator::CurrPage(page) => span aria-current="page" class="font-bold" { (page) },
                    PaginationIndicator::Ellipsis => span { "..." },
                    PaginationIndicator::BackButton(page) => a href=(page_url(page)) class=(LINK_STYLE) { "Back" },
                    PaginationIndicator::NextButton(page) => a href=(page_url(page)) class=(LINK_STYLE) { "Next" },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pagination::{PaginationIndicator, create_pagination_indicators};

    #[test]
    fn shows_all_pages() {
        let max_pages = 5;
        let page_count = 5;
        let curr_page = 1;
        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::NextButton(2),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_on_left() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 1;
        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(2),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn shows_page_subset_on_right() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 10;
        let want = [
            PaginationIndicator::BackButton(9),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Page(8),
            PaginationIndicator::Page(9),
            PaginationIndicator::CurrPage(10),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn pagination_indicator_shows_page_subset_in_center() {
        let max_pages = 5;
        let page_count = 10;
        let curr_page = 5;
        let want = [
            PaginationIndicator::BackButton(4),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::CurrPage(5),
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(6),
        ];

        let got = create_pagination_indicators(curr_page, page_count, max_pages);

        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn no_pages_shows_nothing() {
        assert!(create_pagination_indicators(1, 0, 5).is_empty());
    }
}
