//! The budgets page: the add form and a card per budget with its progress.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        BudgetForm, BudgetWithCategory,
        db::get_budgets_with_category,
        form::{BudgetFormTarget, budget_form},
        progress::{BudgetProgress, budget_progress, progress_bar, status_label},
    },
    category::{Category, CategoryKind, get_categories_by_kind},
    endpoints,
    html::{
        CARD_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles, edit_delete_action_links,
        format_currency, format_date,
    },
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

struct BudgetCard {
    item: BudgetWithCategory,
    progress: BudgetProgress,
}

/// Render the budgets page.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories_by_kind(user_id, CategoryKind::Expense, &connection)
        .inspect_err(|error| tracing::error!("Could not get expense categories: {error}"))?;

    let cards = get_budgets_with_category(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get budgets: {error}"))?
        .into_iter()
        .map(|item| {
            budget_progress(&item.budget, today, &connection)
                .map(|progress| BudgetCard { item, progress })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(budgets_view(&categories, &cards, today).into_response())
}

fn budgets_view(categories: &[Category], cards: &[BudgetCard], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 lg:max-w-5xl lg:w-full lg:mx-auto"
            {
                h1 class="text-xl font-bold" { "Budgets" }

                div class=(CARD_STYLE)
                {
                    h2 class="text-lg font-semibold mb-4" { "Add Budget" }

                    (budget_form(
                        BudgetFormTarget::Create,
                        categories,
                        &BudgetForm::starting(today),
                        None,
                    ))
                }

                @if cards.is_empty() {
                    div
                        class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                    {
                        "No budgets yet. Add one above to keep your spending in check."
                    }
                } @else {
                    ul class="grid grid-cols-1 gap-4 md:grid-cols-2"
                    {
                        @for card in cards {
                            (budget_card(card))
                        }
                    }
                }
            }
        }
    );

    base("Budgets", &[dollar_input_styles()], &content)
}

fn budget_card(card: &BudgetCard) -> Markup {
    let budget = &card.item.budget;
    let progress = &card.progress;
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_url = endpoints::format_endpoint(endpoints::BUDGET, budget.id);
    let end_date = budget
        .end_date
        .map(format_date)
        .unwrap_or_else(|| "Ongoing".to_owned());

    html!(
        li class=(CARD_STYLE) data-budget-card="true"
        {
            div class="flex items-start justify-between gap-3"
            {
                div
                {
                    h3 class="font-semibold" data-budget-category="true" { (card.item.category_name) }
                    span class="text-xs text-gray-500 dark:text-gray-400" { (budget.period.label()) }
                }

                (status_label(progress.status))
            }

            div class="mt-3 flex justify-between text-sm"
            {
                span data-budget-spent="true" { (format_currency(progress.spent)) " spent" }
                span { "of " (format_currency(budget.amount)) }
            }

            div class="mt-2" { (progress_bar(progress)) }

            div class="mt-2 flex justify-between text-xs text-gray-500 dark:text-gray-400"
            {
                span data-budget-percent="true" { (format!("{:.1}%", progress.percent)) }
                span { (format_date(budget.start_date)) " - " (end_date) }
            }

            div class="mt-3 flex items-center gap-4 text-sm"
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    &format!(
                        "Are you sure you want to delete the budget for '{}'?",
                        card.item.category_name
                    ),
                    "closest [data-budget-card='true']",
                    "delete",
                ))
            }
        }
    )
}
