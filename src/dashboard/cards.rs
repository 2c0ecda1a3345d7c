//! Summary cards and the budget overview.

use maud::{Markup, html};

use crate::{
    budget::{BudgetProgress, BudgetWithCategory, progress_bar, status_label},
    dashboard::aggregation::DashboardTotals,
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, format_currency},
};

const POSITIVE_STYLE: &str = "text-green-600 dark:text-green-400";
const NEGATIVE_STYLE: &str = "text-red-600 dark:text-red-400";

fn amount_color_class(amount: f64) -> &'static str {
    if amount >= 0.0 {
        POSITIVE_STYLE
    } else {
        NEGATIVE_STYLE
    }
}

/// Cards for total income, total expenses, balance and savings rate.
pub(super) fn summary_cards_view(totals: &DashboardTotals) -> Markup {
    html! {
        section class="grid w-full grid-cols-1 gap-4 sm:grid-cols-2 lg:grid-cols-4"
        {
            (summary_card("Total Income", &format_currency(totals.income), "income", POSITIVE_STYLE))
            (summary_card("Total Expenses", &format_currency(totals.expenses), "expenses", NEGATIVE_STYLE))
            (summary_card(
                "Balance",
                &format_currency(totals.balance),
                "balance",
                amount_color_class(totals.balance),
            ))
            (summary_card(
                "Savings Rate",
                &format!("{:.1}%", totals.savings_rate),
                "savings-rate",
                amount_color_class(totals.savings_rate),
            ))
        }
    }
}

fn summary_card(title: &str, value: &str, key: &str, value_style: &str) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h3 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
            span class={ "text-2xl font-semibold " (value_style) } data-summary=(key) { (value) }
        }
    }
}

/// Progress of each budget that is currently active.
pub(super) fn budget_overview_view(budgets: &[(BudgetWithCategory, BudgetProgress)]) -> Markup {
    html! {
        section class="w-full"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Budget Overview" }
                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "Manage budgets" }
            }

            @if budgets.is_empty() {
                div class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No active budgets."
                }
            } @else {
                div class="grid grid-cols-1 gap-4 md:grid-cols-2"
                {
                    @for (item, progress) in budgets {
                        div class=(CARD_STYLE) data-budget-overview="true"
                        {
                            div class="flex justify-between items-baseline mb-2"
                            {
                                span class="font-semibold" { (item.category_name) }
                                (status_label(progress.status))
                            }

                            (progress_bar(progress))

                            div class="mt-2 flex justify-between text-xs text-gray-500 dark:text-gray-400"
                            {
                                span
                                {
                                    (format_currency(progress.spent)) " of "
                                    (format_currency(item.budget.amount))
                                }
                                span { (format!("{:.1}%", progress.percent)) }
                            }
                        }
                    }
                }
            }
        }
    }
}
