//! How much of a budget has been spent.

use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    budget::Budget,
    record::{RecordKind, get_category_total_in_range},
};

/// Spending at or above this percentage of the budget is a warning.
const WARNING_PERCENT: f64 = 90.0;

/// Spending at or above this percentage of the budget exceeds it.
const EXCEEDED_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    /// The budget starts in the future.
    NotStarted,
    OnTrack,
    /// Spending is close to the limit.
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::NotStarted => "Not started",
            BudgetStatus::OnTrack => "On track",
            BudgetStatus::Warning => "Warning",
            BudgetStatus::Exceeded => "Exceeded",
        }
    }

    fn text_style(&self) -> &'static str {
        match self {
            BudgetStatus::NotStarted => "text-gray-500 dark:text-gray-400",
            BudgetStatus::OnTrack => "text-green-700 dark:text-green-400",
            BudgetStatus::Warning => "text-yellow-600 dark:text-yellow-400",
            BudgetStatus::Exceeded => "text-red-600 dark:text-red-400",
        }
    }

    fn bar_style(&self) -> &'static str {
        match self {
            BudgetStatus::NotStarted => "bg-gray-400",
            BudgetStatus::OnTrack => "bg-green-600 dark:bg-green-500",
            BudgetStatus::Warning => "bg-yellow-400",
            BudgetStatus::Exceeded => "bg-red-600 dark:bg-red-500",
        }
    }
}

/// The spending against a budget as of a given day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetProgress {
    /// The amount spent in dollars.
    pub spent: f64,
    /// The percentage of the budget spent, capped at 100.
    pub percent: f64,
    pub status: BudgetStatus,
}

impl BudgetProgress {
    /// Classify `spent` against a budget of `amount` dollars.
    ///
    /// Budgets that start after `today` have not started, regardless of `spent`.
    pub fn new(amount: f64, spent: f64, start_date: Date, today: Date) -> Self {
        if today < start_date {
            return Self {
                spent: 0.0,
                percent: 0.0,
                status: BudgetStatus::NotStarted,
            };
        }

        let raw_percent = if amount > 0.0 {
            spent / amount * 100.0
        } else {
            0.0
        };

        let status = if raw_percent >= EXCEEDED_PERCENT {
            BudgetStatus::Exceeded
        } else if raw_percent >= WARNING_PERCENT {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        };

        Self {
            spent,
            percent: raw_percent.min(100.0),
            status,
        }
    }
}

/// Calculate the progress of `budget` as of `today`.
///
/// Spending is the sum of the user's expenses in the budget's category from
/// the start date up to the end date, or up to `today` for open-ended budgets.
pub fn budget_progress(
    budget: &Budget,
    today: Date,
    connection: &Connection,
) -> Result<BudgetProgress, Error> {
    if today < budget.start_date {
        return Ok(BudgetProgress::new(
            budget.amount,
            0.0,
            budget.start_date,
            today,
        ));
    }

    let spent = get_category_total_in_range(
        RecordKind::Expense,
        budget.user_id,
        budget.category_id,
        budget.start_date,
        budget.end_date.unwrap_or(today),
        connection,
    )?;

    Ok(BudgetProgress::new(
        budget.amount,
        spent,
        budget.start_date,
        today,
    ))
}

/// A horizontal bar coloured by the budget status.
pub fn progress_bar(progress: &BudgetProgress) -> Markup {
    let percent = progress.percent.clamp(0.0, 100.0);

    // Keep small values visible with rounded corners
    let display_percent = if percent > 0.0 && percent < 3.0 {
        3.0
    } else {
        percent
    };

    html! {
        div
            class="w-full bg-gray-200 dark:bg-gray-700 rounded-full h-2.5"
            role="progressbar"
            aria-valuenow=(format!("{percent:.1}"))
            aria-valuemin="0"
            aria-valuemax="100"
        {
            @if percent > 0.0 {
                div
                    class={ "h-2.5 rounded-full " (progress.status.bar_style()) }
                    style=(format!("width: {display_percent:.1}%"))
                {}
            }
        }
    }
}

/// The status label coloured to match the progress bar.
pub fn status_label(status: BudgetStatus) -> Markup {
    html! {
        span class={ "text-sm font-medium " (status.text_style()) } data-budget-status="true"
        {
            (status.label())
        }
    }
}

#[cfg(test)]
mod budget_progress_tests {
    use time::macros::date;

    use crate::{
        auth::UserID,
        budget::{Budget, BudgetPeriod},
        category::CategoryKind,
        test_utils::{
            get_test_connection, insert_test_category, insert_test_record_on, insert_test_user,
        },
    };

    use super::{BudgetProgress, BudgetStatus, budget_progress, progress_bar};

    const START: time::Date = date!(2025 - 01 - 01);
    const TODAY: time::Date = date!(2025 - 01 - 20);

    #[test]
    fn future_budget_has_not_started() {
        let progress = BudgetProgress::new(100.0, 500.0, date!(2025 - 02 - 01), TODAY);

        assert_eq!(progress.status, BudgetStatus::NotStarted);
        assert_eq!(progress.spent, 0.0);
        assert_eq!(progress.percent, 0.0);
    }

    #[test]
    fn below_ninety_percent_is_on_track() {
        let progress = BudgetProgress::new(100.0, 89.99, START, TODAY);

        assert_eq!(progress.status, BudgetStatus::OnTrack);
    }

    #[test]
    fn ninety_percent_is_a_warning() {
        let progress = BudgetProgress::new(100.0, 90.0, START, TODAY);

        assert_eq!(progress.status, BudgetStatus::Warning);
        assert_eq!(progress.percent, 90.0);
    }

    #[test]
    fn exactly_spent_budget_is_exceeded() {
        let progress = BudgetProgress::new(100.0, 100.0, START, TODAY);

        assert_eq!(progress.status, BudgetStatus::Exceeded);
    }

    #[test]
    fn percent_is_capped_at_one_hundred() {
        let progress = BudgetProgress::new(100.0, 250.0, START, TODAY);

        assert_eq!(progress.status, BudgetStatus::Exceeded);
        assert_eq!(progress.percent, 100.0);
        assert_eq!(progress.spent, 250.0);
    }

    #[test]
    fn starting_today_counts_as_started() {
        let progress = BudgetProgress::new(100.0, 0.0, TODAY, TODAY);

        assert_eq!(progress.status, BudgetStatus::OnTrack);
    }

    #[test]
    fn sums_expenses_in_budget_category_and_range() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        let fun = insert_test_category(&connection, user_id, "Fun", CategoryKind::Expense);
        insert_test_record_on(&connection, user_id, "expense", food, 40.0, START);
        insert_test_record_on(&connection, user_id, "expense", food, 50.0, TODAY);
        insert_test_record_on(&connection, user_id, "expense", food, 70.0, date!(2024 - 12 - 31));
        insert_test_record_on(&connection, user_id, "expense", food, 80.0, date!(2025 - 01 - 21));
        insert_test_record_on(&connection, user_id, "expense", fun, 60.0, TODAY);
        let budget = Budget {
            id: 1,
            user_id,
            category_id: food,
            amount: 200.0,
            period: BudgetPeriod::Monthly,
            start_date: START,
            end_date: None,
        };

        let progress = budget_progress(&budget, TODAY, &connection).unwrap();

        assert_eq!(progress.spent, 90.0);
        assert_eq!(progress.percent, 45.0);
        assert_eq!(progress.status, BudgetStatus::OnTrack);
    }

    #[test]
    fn ended_budget_sums_up_to_end_date() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        insert_test_record_on(&connection, user_id, "expense", food, 40.0, date!(2025 - 01 - 05));
        insert_test_record_on(&connection, user_id, "expense", food, 50.0, date!(2025 - 01 - 15));
        let budget = Budget {
            id: 1,
            user_id,
            category_id: food,
            amount: 40.0,
            period: BudgetPeriod::Weekly,
            start_date: START,
            end_date: Some(date!(2025 - 01 - 07)),
        };

        let progress = budget_progress(&budget, TODAY, &connection).unwrap();

        assert_eq!(progress.spent, 40.0);
        assert_eq!(progress.status, BudgetStatus::Exceeded);
    }

    #[test]
    fn other_users_expenses_are_ignored() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        insert_test_record_on(&connection, user_id, "expense", food, 40.0, TODAY);
        let budget = Budget {
            id: 1,
            user_id: UserID::new(user_id.as_i64() + 1),
            category_id: food,
            amount: 40.0,
            period: BudgetPeriod::Monthly,
            start_date: START,
            end_date: None,
        };

        let progress = budget_progress(&budget, TODAY, &connection).unwrap();

        assert_eq!(progress.spent, 0.0);
    }

    #[test]
    fn progress_bar_has_minimum_width() {
        let html = progress_bar(&BudgetProgress::new(100.0, 1.0, START, TODAY)).into_string();

        assert!(html.contains("width: 3.0%"));
        assert!(html.contains("aria-valuenow=\"1.0\""));
    }

    #[test]
    fn empty_progress_bar_has_no_fill() {
        let html = progress_bar(&BudgetProgress::new(100.0, 0.0, START, TODAY)).into_string();

        assert!(html.contains("progressbar"));
        assert!(!html.contains("width:"));
    }
}
