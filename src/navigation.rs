//! The navigation bar for logged in users.
//!
//! Wide screens get a bar across the top of the page. Small screens get a
//! bar pinned to the bottom with the most used pages, and a "More" menu for
//! the rest.

use maud::{Markup, html};

use crate::endpoints;

/// A page reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Dashboard,
    Income,
    Expenses,
    Categories,
    Budgets,
    Settings,
    LogOut,
}

impl Section {
    /// The order the links appear in.
    const ALL: [Section; 7] = [
        Section::Dashboard,
        Section::Income,
        Section::Expenses,
        Section::Categories,
        Section::Budgets,
        Section::Settings,
        Section::LogOut,
    ];

    fn url(self) -> &'static str {
        match self {
            Section::Dashboard => endpoints::DASHBOARD_VIEW,
            Section::Income => endpoints::INCOME_VIEW,
            Section::Expenses => endpoints::EXPENSES_VIEW,
            Section::Categories => endpoints::CATEGORIES_VIEW,
            Section::Budgets => endpoints::BUDGETS_VIEW,
            Section::Settings => endpoints::SETTINGS_VIEW,
            Section::LogOut => endpoints::LOG_OUT,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Income => "Income",
            Section::Expenses => "Expenses",
            Section::Categories => "Categories",
            Section::Budgets => "Budgets",
            Section::Settings => "Settings",
            Section::LogOut => "Log out",
        }
    }

    /// The section whose page lives at `url`. Logging out is an action, not a
    /// page, so it never matches.
    fn from_url(url: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter(|section| *section != Section::LogOut)
            .find(|section| section.url() == url)
    }

    /// Whether the section has its own button on the mobile bar.
    fn on_mobile_bar(self) -> bool {
        matches!(
            self,
            Section::Dashboard | Section::Income | Section::Expenses
        )
    }
}

const DESKTOP_LINK: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:bg-gray-100 lg:hover:bg-transparent lg:hover:text-blue-700 \
    dark:text-white dark:hover:bg-gray-700 lg:dark:hover:bg-transparent \
    lg:dark:hover:text-blue-500";
const DESKTOP_LINK_CURRENT: &str = "block py-2 px-3 rounded-sm lg:p-0 text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 dark:text-white \
    lg:dark:text-blue-500";

const MOBILE_BUTTON: &str = "flex w-full min-w-0 items-center justify-center \
    rounded-lg px-2.5 py-2 text-xs font-semibold sm:px-4 sm:text-sm \
    cursor-pointer list-none [&::-webkit-details-marker]:hidden \
    text-gray-600 hover:bg-blue-50/70 hover:text-blue-700 \
    dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const MOBILE_BUTTON_CURRENT: &str = "flex w-full min-w-0 items-center justify-center \
    rounded-lg px-2.5 py-2 text-xs font-semibold sm:px-4 sm:text-sm \
    cursor-pointer list-none [&::-webkit-details-marker]:hidden shadow-sm \
    bg-blue-50 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

const MENU_ITEM: &str = "block rounded-lg px-3 py-2 text-gray-700 \
    hover:bg-gray-100 hover:text-blue-700 dark:text-gray-200 \
    dark:hover:bg-gray-800/80 dark:hover:text-blue-200";
const MENU_ITEM_CURRENT: &str = "block rounded-lg px-3 py-2 bg-blue-50 \
    text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

fn pick(is_current: bool, current: &'static str, other: &'static str) -> &'static str {
    if is_current { current } else { other }
}

/// The navigation bar with the link for the current page highlighted.
#[derive(Debug, Clone, Copy)]
pub struct NavBar {
    current: Option<Section>,
}

impl NavBar {
    /// Highlight the link to `current_page`, if there is one.
    pub fn new(current_page: &str) -> Self {
        Self {
            current: Section::from_url(current_page),
        }
    }

    fn is_current(&self, section: Section) -> bool {
        self.current == Some(section)
    }

    fn page_link(&self, section: Section, class: &'static str) -> Markup {
        html! {
            a
                href=(section.url())
                class=(class)
                aria-current=[self.is_current(section).then_some("page")]
            {
                (section.title())
            }
        }
    }

    pub fn into_html(self) -> Markup {
        let more_is_current = self.current.is_some_and(|section| !section.on_mobile_bar());

        html! {
            nav class="bg-white border-gray-200 dark:bg-gray-900" {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4" {
                    a href=(endpoints::DASHBOARD_VIEW) class="flex items-center gap-3" {
                        img src="/static/favicon-128x128.png" alt="FinanceTrack Logo" class="h-8";
                        span class="text-2xl font-semibold whitespace-nowrap dark:text-white" {
                            "FinanceTrack"
                        }
                    }

                    ul
                        class="hidden lg:flex lg:flex-row lg:space-x-8 font-medium"
                    {
                        @for section in Section::ALL {
                            li {
                                (self.page_link(
                                    section,
                                    pick(self.is_current(section), DESKTOP_LINK_CURRENT, DESKTOP_LINK),
                                ))
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" {
                div
                    class="mx-auto max-w-screen-xl mb-4 mx-4 rounded-xl border border-gray-200
                    bg-white/95 shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                {
                    ul class="grid grid-cols-4 gap-2 px-4 py-3" aria-label="Primary" {
                        @for section in Section::ALL.into_iter().filter(|s| s.on_mobile_bar()) {
                            li class="min-w-0" {
                                (self.page_link(
                                    section,
                                    pick(self.is_current(section), MOBILE_BUTTON_CURRENT, MOBILE_BUTTON),
                                ))
                            }
                        }

                        li class="min-w-0" {
                            details class="relative" {
                                summary
                                    class=(pick(more_is_current, MOBILE_BUTTON_CURRENT, MOBILE_BUTTON))
                                    aria-current=[more_is_current.then_some("page")]
                                {
                                    "More"
                                }

                                ul
                                    class="absolute bottom-full right-0 mb-3 w-40 flex flex-col
                                    gap-1 rounded-xl border border-gray-200 bg-white p-2
                                    text-sm font-medium shadow-xl dark:border-gray-700
                                    dark:bg-gray-900"
                                {
                                    @for section in Section::ALL.into_iter().filter(|s| !s.on_mobile_bar()) {
                                        li {
                                            (self.page_link(
                                                section,
                                                pick(self.is_current(section), MENU_ITEM_CURRENT, MENU_ITEM),
                                            ))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::NavBar;

    fn current_links(nav_bar: NavBar) -> Vec<String> {
        let document = Html::parse_fragment(&nav_bar.into_html().into_string());
        let selector = Selector::parse("a[aria-current=page]").unwrap();

        document
            .select(&selector)
            .filter_map(|link| link.value().attr("href").map(str::to_owned))
            .collect()
    }

    #[test]
    fn highlights_each_page_in_both_bars() {
        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::INCOME_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::SETTINGS_VIEW,
        ] {
            assert_eq!(
                current_links(NavBar::new(page)),
                vec![page.to_owned(), page.to_owned()],
                "wrong links highlighted for {page}"
            );
        }
    }

    #[test]
    fn highlights_nothing_for_other_pages() {
        for page in [
            endpoints::ROOT,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT,
            endpoints::REGISTER_VIEW,
        ] {
            assert!(
                current_links(NavBar::new(page)).is_empty(),
                "{page} should not highlight a link"
            );
        }
    }

    #[test]
    fn renders_every_link_on_both_bars() {
        let html = NavBar::new(endpoints::DASHBOARD_VIEW).into_html().into_string();
        let document = Html::parse_fragment(&html);
        let selector = Selector::parse("a[href]").unwrap();

        let log_out_links = document
            .select(&selector)
            .filter(|link| link.value().attr("href") == Some(endpoints::LOG_OUT))
            .count();

        assert_eq!(log_out_links, 2);
    }

    #[test]
    fn more_menu_is_marked_current_for_settings() {
        let html = NavBar::new(endpoints::SETTINGS_VIEW).into_html().into_string();
        let document = Html::parse_fragment(&html);

        let summary = document
            .select(&Selector::parse("summary").unwrap())
            .next()
            .expect("No summary element found");

        assert_eq!(summary.value().attr("aria-current"), Some("page"));
    }

    #[test]
    fn more_menu_is_not_current_on_dashboard() {
        let html = NavBar::new(endpoints::DASHBOARD_VIEW).into_html().into_string();
        let document = Html::parse_fragment(&html);

        let summary = document
            .select(&Selector::parse("summary").unwrap())
            .next()
            .expect("No summary element found");

        assert_eq!(summary.value().attr("aria-current"), None);
    }
}
