//! The dashboard navigation bar.

use maud::{Markup, html};

use crate::endpoints;

/// The dashboard sections in the order they appear in the bar.
const SECTIONS: [(&str, &str); 5] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::CASHBOOK_VIEW, "Cashbook"),
    (endpoints::INCOMES_VIEW, "Incomes"),
    (endpoints::EXPENSES_VIEW, "Expenses"),
    (endpoints::WALLETS_VIEW, "Wallets"),
];

const CURRENT_LINK_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";

const LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 dark:hover:text-white \
    lg:dark:hover:bg-transparent";

const CURRENT_TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    bg-blue-50 px-2.5 py-2 text-xs font-semibold text-blue-700 shadow-sm sm:text-sm \
    dark:bg-blue-900/30 dark:text-blue-200";

const TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold text-gray-600 sm:text-sm hover:bg-blue-50/70 \
    hover:text-blue-700 dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";

/// Whether `path` is `section` or one of the pages under it, e.g. the new
/// income page belongs to the incomes section.
///
/// The dashboard overview only matches itself since every other section
/// lives under it.
fn is_in_section(path: &str, section: &str) -> bool {
    if section == endpoints::DASHBOARD_VIEW {
        return path == section;
    }

    path.strip_prefix(section)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Debug, Clone, Copy)]
struct Link {
    url: &'static str,
    title: &'static str,
    is_current: bool,
}

/// The navigation bar for a dashboard page.
pub struct NavBar {
    links: Vec<Link>,
}

impl NavBar {
    /// The bar for the page at `current_path`, with its section highlighted.
    pub fn new(current_path: &str) -> Self {
        let mut links: Vec<_> = SECTIONS
            .into_iter()
            .map(|(url, title)| Link {
                url,
                title,
                is_current: is_in_section(current_path, url),
            })
            .collect();

        links.push(Link {
            url: endpoints::LOG_OUT,
            title: "Log out",
            is_current: false,
        });

        Self { links }
    }

    pub fn into_html(self) -> Markup {
        let current = |link: &Link| link.is_current.then_some("page");

        // Layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Folio"
                    }

                    ul
                        class="hidden lg:flex font-medium lg:flex-row lg:space-x-8 rtl:space-x-reverse"
                    {
                        @for link in &self.links {
                            li
                            {
                                a
                                    href=(link.url)
                                    class=(if link.is_current { CURRENT_LINK_STYLE } else { LINK_STYLE })
                                    aria-current=[current(link)]
                                {
                                    (link.title)
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Dashboard sections"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-3 gap-2 rounded-xl border border-gray-200 bg-white/95 px-4 py-3 shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for link in &self.links {
                        li class="min-w-0"
                        {
                            a
                                href=(link.url)
                                class=(if link.is_current { CURRENT_TAB_STYLE } else { TAB_STYLE })
                                aria-current=[current(link)]
                            {
                                span class="truncate" { (link.title) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{
        endpoints::{self, format_endpoint},
        navigation::NavBar,
    };

    use super::is_in_section;

    /// The titles of the links marked as the current page, once per bar.
    fn current_titles(path: &str) -> Vec<String> {
        let html = Html::parse_fragment(&NavBar::new(path).into_html().into_string());

        html.select(&Selector::parse("a[aria-current=page]").unwrap())
            .map(|link| link.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[test]
    fn highlights_the_section_of_the_page() {
        assert_eq!(current_titles(endpoints::DASHBOARD_VIEW), ["Dashboard", "Dashboard"]);
        assert_eq!(current_titles(endpoints::WALLETS_VIEW), ["Wallets", "Wallets"]);
        assert_eq!(current_titles(endpoints::NEW_INCOME_VIEW), ["Incomes", "Incomes"]);
        assert_eq!(
            current_titles(&format_endpoint(endpoints::EDIT_EXPENSE_VIEW, 3)),
            ["Expenses", "Expenses"]
        );
    }

    #[test]
    fn pages_outside_the_dashboard_highlight_nothing() {
        for path in [
            endpoints::ROOT,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT,
            endpoints::WALLETS,
            endpoints::INTERNAL_ERROR_VIEW,
        ] {
            assert!(current_titles(path).is_empty(), "{path} highlighted a link");
        }
    }

    #[test]
    fn sections_match_whole_path_segments() {
        assert!(is_in_section("/dashboard/incomes/new", endpoints::INCOMES_VIEW));
        assert!(!is_in_section("/dashboard/incomes-archive", endpoints::INCOMES_VIEW));
        assert!(!is_in_section("/dashboard/cashbook", endpoints::DASHBOARD_VIEW));
    }

    #[test]
    fn log_out_is_always_last() {
        let html = Html::parse_fragment(&NavBar::new(endpoints::CASHBOOK_VIEW).into_html().into_string());

        let last = html
            .select(&Selector::parse("nav:first-of-type li a").unwrap())
            .last()
            .and_then(|link| link.value().attr("href"));
        assert_eq!(last, Some(endpoints::LOG_OUT));
    }
}
