//! Categories page: the add form and one table per category kind.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{
        CategoryKind, count_records_per_category, create::new_category_form,
        domain::{CategoryWithUsage, NewCategoryForm},
        get_categories_by_kind,
    },
    endpoints,
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the categories page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page with usage counts.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let usage = count_records_per_category(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not count records per category: {error}"))?;

    let mut tables = Vec::with_capacity(2);
    for kind in [CategoryKind::Income, CategoryKind::Expense] {
        let categories = get_categories_by_kind(user_id, kind, &connection)
            .inspect_err(|error| tracing::error!("Failed to retrieve {kind} categories: {error}"))?
            .into_iter()
            .map(|category| CategoryWithUsage {
                usage_count: usage.get(&category.id).copied().unwrap_or(0),
                category,
            })
            .collect::<Vec<_>>();

        tables.push((kind, categories));
    }

    Ok(categories_view(&tables).into_response())
}

fn categories_view(tables: &[(CategoryKind, Vec<CategoryWithUsage>)]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Categories" }

                div class=(CARD_STYLE)
                {
                    h2 class="text-lg font-semibold mb-4" { "Add Category" }

                    (new_category_form(&NewCategoryForm::default(), None))
                }

                @for (kind, categories) in tables {
                    (category_table(*kind, categories))
                }
            }
        }
    );

    base("Categories", &[], &content)
}

fn category_table(kind: CategoryKind, categories: &[CategoryWithUsage]) -> Markup {
    let table_row = |item: &CategoryWithUsage| {
        let category = &item.category;
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
        let delete_url = endpoints::format_endpoint(endpoints::CATEGORY, category.id);
        let confirm_message = format!(
            "Are you sure you want to delete the category '{}'?",
            category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-category-row="true"
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (category.name) }
                }

                td class=(TABLE_CELL_STYLE) { (category.description) }

                td class=(TABLE_CELL_STYLE) { (item.usage_count) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    html!(
        section class="overflow-x-auto dark:bg-gray-800" data-category-kind=(kind.as_str())
        {
            h2 class="text-lg font-semibold mb-2" { (kind.label()) " Categories" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for item in categories {
                        (table_row(item))
                    }

                    @if categories.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No " (kind.as_str()) " categories yet."
                            }
                        }
                    }
                }
            }
        }
    )
}
