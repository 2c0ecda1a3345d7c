//! The budget form, shared by the budgets page and the edit page.

use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    budget::{BudgetForm, BudgetId, BudgetPeriod, NewBudget, db::has_overlapping_budget},
    category::{Category, CategoryKind, get_category},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, link,
    },
};

const FORM_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Where the form is submitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BudgetFormTarget {
    Create,
    Update(BudgetId),
}

/// Render the budget form.
///
/// Only expense categories should be passed in `categories`.
pub fn budget_form(
    target: BudgetFormTarget,
    categories: &[Category],
    values: &BudgetForm,
    error_message: Option<&str>,
) -> Markup {
    let selected_category = values
        .category_id
        .as_deref()
        .and_then(|id| id.parse::<i64>().ok());
    let selected_period = values
        .period
        .as_deref()
        .and_then(|period| period.parse::<BudgetPeriod>().ok())
        .unwrap_or_default();
    let (post_endpoint, put_endpoint, submit_text) = match target {
        BudgetFormTarget::Create => (Some(endpoints::POST_BUDGET.to_owned()), None, "Add Budget"),
        BudgetFormTarget::Update(id) => (
            None,
            Some(endpoints::format_endpoint(endpoints::BUDGET, id)),
            "Update Budget",
        ),
    };

    html! {
        form
            hx-post=[post_endpoint]
            hx-put=[put_endpoint]
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="category_id"
                    id="category_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select a category" }

                    @for category in categories {
                        option value=(category.id) selected[Some(category.id) == selected_category]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        value=[values.amount.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                select name="period" id="period" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for period in BudgetPeriod::ALL {
                        option value=(period.as_str()) selected[period == selected_period]
                        {
                            (period.label())
                        }
                    }
                }
            }

            div class="grid grid-cols-1 gap-4 sm:grid-cols-2"
            {
                div
                {
                    label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }

                    input
                        name="start_date"
                        id="start_date"
                        type="date"
                        required
                        value=[values.start_date.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end_date" class=(FORM_LABEL_STYLE) { "End Date (optional)" }

                    input
                        name="end_date"
                        id="end_date"
                        type="date"
                        value=[values.end_date.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            @if categories.is_empty() {
                div class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You have no expense categories yet. "
                    (link(endpoints::CATEGORIES_VIEW, "Add one first."))
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}

/// Validate the submitted form for `user_id`.
///
/// `existing` is the budget being updated, which is ignored when checking for
/// overlapping budgets.
///
/// # Errors
///
/// Returns the first problem found, in this order:
/// - [Error::InvalidCategory] if the category is missing, belongs to another
///   user, or is not an expense category.
/// - [Error::InvalidAmount] if the amount is missing, not a number, or not positive.
/// - [Error::InvalidBudgetPeriod] if the period is not one of the known periods.
/// - [Error::MissingStartDate] if the start date is missing or invalid.
/// - [Error::InvalidEndDate] if an end date is given but cannot be parsed.
/// - [Error::EndDateBeforeStartDate] if the end date is before the start date.
/// - [Error::OverlappingBudget] if another budget for the same category and
///   period overlaps the date range.
pub fn parse_budget_form(
    user_id: UserID,
    form: &BudgetForm,
    existing: Option<BudgetId>,
    connection: &Connection,
) -> Result<NewBudget, Error> {
    let category_id = form
        .category_id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or(Error::InvalidCategory)?;

    match get_category(category_id, user_id, connection) {
        Ok(category) if category.kind == CategoryKind::Expense => {}
        Ok(_) | Err(Error::NotFound) => return Err(Error::InvalidCategory),
        Err(error) => return Err(error),
    }

    let amount = form
        .amount
        .as_deref()
        .and_then(|amount| amount.trim().parse::<f64>().ok())
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or(Error::InvalidAmount)?;

    let period = match form.period.as_deref().map(str::trim) {
        None | Some("") => BudgetPeriod::default(),
        Some(period) => period.parse()?,
    };

    let start_date = parse_date(form.start_date.as_deref()).ok_or(Error::MissingStartDate)?;
    let end_date = match form.end_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => {
            Some(Date::parse(text, FORM_DATE_FORMAT).map_err(|_| Error::InvalidEndDate)?)
        }
    };

    if end_date.is_some_and(|end_date| end_date < start_date) {
        return Err(Error::EndDateBeforeStartDate);
    }

    if has_overlapping_budget(
        user_id,
        category_id,
        period,
        start_date,
        end_date,
        existing,
        connection,
    )? {
        return Err(Error::OverlappingBudget);
    }

    Ok(NewBudget {
        category_id,
        amount,
        period,
        start_date,
        end_date,
    })
}

fn parse_date(text: Option<&str>) -> Option<Date> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .and_then(|text| Date::parse(text, FORM_DATE_FORMAT).ok())
}

/// Whether the error should be shown in the form rather than as an alert.
pub fn is_form_error(error: &Error) -> bool {
    matches!(
        error,
        Error::InvalidCategory
            | Error::InvalidAmount
            | Error::InvalidBudgetPeriod(_)
            | Error::MissingStartDate
            | Error::InvalidEndDate
            | Error::EndDateBeforeStartDate
            | Error::OverlappingBudget
    )
}

#[cfg(test)]
mod budget_form_tests {
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        budget::{BudgetForm, BudgetPeriod, NewBudget, create_budget},
        category::CategoryKind,
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_optional_form_input, get_test_connection,
            insert_test_category, insert_test_user, must_get_form,
        },
    };

    use super::{BudgetFormTarget, budget_form, parse_budget_form};

    fn setup() -> (Connection, UserID, i64, i64) {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let salary = insert_test_category(&connection, user_id, "Salary", CategoryKind::Income);
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);

        (connection, user_id, salary, food)
    }

    fn form(category_id: i64, amount: &str, period: &str, start: &str, end: &str) -> BudgetForm {
        BudgetForm {
            category_id: Some(category_id.to_string()),
            amount: Some(amount.to_owned()),
            period: Some(period.to_owned()),
            start_date: Some(start.to_owned()),
            end_date: Some(end.to_owned()),
        }
    }

    #[test]
    fn parses_open_ended_budget() {
        let (connection, user_id, _, food) = setup();

        let budget = parse_budget_form(
            user_id,
            &form(food, "250", "weekly", "2025-03-01", ""),
            None,
            &connection,
        )
        .unwrap();

        assert_eq!(
            budget,
            NewBudget {
                category_id: food,
                amount: 250.0,
                period: BudgetPeriod::Weekly,
                start_date: date!(2025 - 03 - 01),
                end_date: None,
            }
        );
    }

    #[test]
    fn category_is_checked_first() {
        let (connection, user_id, salary, _) = setup();

        assert_eq!(
            parse_budget_form(user_id, &form(salary, "0", "bogus", "", ""), None, &connection),
            Err(Error::InvalidCategory)
        );
    }

    #[test]
    fn amount_is_checked_before_period() {
        let (connection, user_id, _, food) = setup();

        assert_eq!(
            parse_budget_form(user_id, &form(food, "-1", "bogus", "", ""), None, &connection),
            Err(Error::InvalidAmount)
        );
    }

    #[test]
    fn rejects_unknown_period() {
        let (connection, user_id, _, food) = setup();

        assert_eq!(
            parse_budget_form(
                user_id,
                &form(food, "10", "fortnightly", "2025-03-01", ""),
                None,
                &connection
            ),
            Err(Error::InvalidBudgetPeriod("fortnightly".to_owned()))
        );
    }

    #[test]
    fn rejects_missing_start_date() {
        let (connection, user_id, _, food) = setup();

        assert_eq!(
            parse_budget_form(user_id, &form(food, "10", "monthly", "", ""), None, &connection),
            Err(Error::MissingStartDate)
        );
    }

    #[test]
    fn rejects_end_date_before_start_date() {
        let (connection, user_id, _, food) = setup();

        assert_eq!(
            parse_budget_form(
                user_id,
                &form(food, "10", "monthly", "2025-03-01", "2025-02-28"),
                None,
                &connection
            ),
            Err(Error::EndDateBeforeStartDate)
        );
    }

    #[test]
    fn rejects_unparsable_end_date() {
        let (connection, user_id, _, food) = setup();

        assert_eq!(
            parse_budget_form(
                user_id,
                &form(food, "10", "monthly", "2025-03-01", "31/12/2025"),
                None,
                &connection
            ),
            Err(Error::InvalidEndDate)
        );
    }

    #[test]
    fn rejects_overlapping_budget_unless_it_is_the_same_budget() {
        let (connection, user_id, _, food) = setup();
        let existing = create_budget(
            user_id,
            NewBudget {
                category_id: food,
                amount: 100.0,
                period: BudgetPeriod::Monthly,
                start_date: date!(2025 - 01 - 01),
                end_date: None,
            },
            &connection,
        )
        .unwrap();
        let submitted = form(food, "10", "monthly", "2025-03-01", "");

        assert_eq!(
            parse_budget_form(user_id, &submitted, None, &connection),
            Err(Error::OverlappingBudget)
        );
        assert!(parse_budget_form(user_id, &submitted, Some(existing.id), &connection).is_ok());
    }

    #[test]
    fn create_form_offers_every_period() {
        let markup = budget_form(
            BudgetFormTarget::Create,
            &[],
            &BudgetForm::starting(date!(2025 - 01 - 01)),
            None,
        );
        let html = Html::parse_fragment(&markup.into_string());
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, "/api/budgets", "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "start_date", "date");
        assert_optional_form_input(&form, "end_date", "date");

        let periods = html
            .select(&Selector::parse("select[name=period] option").unwrap())
            .map(|option| option.value().attr("value").unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(periods, ["daily", "weekly", "monthly", "yearly"]);

        let selected = html
            .select(&Selector::parse("select[name=period] option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(selected, ["monthly"]);
    }

    #[test]
    fn update_form_uses_put() {
        let markup = budget_form(
            BudgetFormTarget::Update(3),
            &[],
            &BudgetForm::default(),
            None,
        );
        let html = Html::parse_fragment(&markup.into_string());

        assert_hx_endpoint(&must_get_form(&html), "/api/budgets/3", "hx-put");
    }
}
