//! The income and expense form, shared by the list and edit pages.

use maud::{Markup, html};
use rusqlite::Connection;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    category::{Category, get_category},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, link,
    },
    record::{NewRecord, RecordForm, RecordId, RecordKind},
};

const FORM_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Where the form is submitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordFormTarget {
    Create,
    Update(RecordId),
}

/// Render the record form.
///
/// `categories` should only hold categories of the matching kind. With no
/// categories the form links to the categories page instead of offering an
/// empty select.
pub fn record_form(
    kind: RecordKind,
    target: RecordFormTarget,
    categories: &[Category],
    values: &RecordForm,
    error_message: Option<&str>,
) -> Markup {
    let selected_category = values
        .category_id
        .as_deref()
        .and_then(|id| id.parse::<i64>().ok());
    let (post_endpoint, put_endpoint, submit_text) = match target {
        RecordFormTarget::Create => (
            Some(kind.create_endpoint().to_owned()),
            None,
            format!("Add {}", kind.label()),
        ),
        RecordFormTarget::Update(id) => (
            None,
            Some(endpoints::format_endpoint(kind.record_endpoint(), id)),
            format!("Update {}", kind.label()),
        ),
    };

    let fields = html! {
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
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Optional"
                value=[values.description.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                required
                value=[values.date.as_deref()]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    };

    html! {
        form
            hx-post=[post_endpoint]
            hx-put=[put_endpoint]
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            (fields)

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            @if categories.is_empty() {
                div class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "You have no " (kind.category_kind().as_str()) " categories yet. "
                    (link(endpoints::CATEGORIES_VIEW, "Add one first."))
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_text) }
        }
    }
}

/// Validate the submitted form for `user_id`.
///
/// # Errors
///
/// Returns the first problem found, in this order:
/// - [Error::InvalidAmount] if the amount is missing, not a number, or not positive.
/// - [Error::InvalidCategory] if the category is missing, belongs to another
///   user, or is of the wrong kind.
/// - [Error::MissingDate] if the date is missing or not a valid date.
/// - Any other error from looking up the category.
pub fn parse_record_form(
    kind: RecordKind,
    user_id: UserID,
    form: &RecordForm,
    connection: &Connection,
) -> Result<NewRecord, Error> {
    let amount = form
        .amount
        .as_deref()
        .and_then(|amount| amount.trim().parse::<f64>().ok())
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or(Error::InvalidAmount)?;

    let category_id = form
        .category_id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or(Error::InvalidCategory)?;

    match get_category(category_id, user_id, connection) {
        Ok(category) if category.kind == kind.category_kind() => {}
        Ok(_) | Err(Error::NotFound) => return Err(Error::InvalidCategory),
        Err(error) => return Err(error),
    }

    let date = form
        .date
        .as_deref()
        .and_then(|date| Date::parse(date.trim(), FORM_DATE_FORMAT).ok())
        .ok_or(Error::MissingDate)?;

    Ok(NewRecord {
        category_id,
        amount,
        description: form
            .description
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_owned(),
        date,
    })
}

#[cfg(test)]
mod record_form_tests {
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        category::{CategoryKind, get_category},
        record::{RecordForm, RecordKind},
        test_utils::{
            assert_form_input, assert_hx_endpoint, get_test_connection, insert_test_category,
            insert_test_user, must_get_form,
        },
    };

    use super::{RecordFormTarget, parse_record_form, record_form};

    fn setup() -> (Connection, UserID, i64, i64) {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let salary = insert_test_category(&connection, user_id, "Salary", CategoryKind::Income);
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);

        (connection, user_id, salary, food)
    }

    fn form(amount: &str, category_id: &str, date: &str) -> RecordForm {
        RecordForm {
            amount: Some(amount.to_owned()),
            category_id: Some(category_id.to_owned()),
            description: Some("  Pay day ".to_owned()),
            date: Some(date.to_owned()),
        }
    }

    #[test]
    fn parses_valid_form() {
        let (connection, user_id, salary, _) = setup();

        let record = parse_record_form(
            RecordKind::Income,
            user_id,
            &form("1200.50", &salary.to_string(), "2025-04-01"),
            &connection,
        )
        .unwrap();

        assert_eq!(record.amount, 1200.5);
        assert_eq!(record.category_id, salary);
        assert_eq!(record.description, "Pay day");
        assert_eq!(record.date, date!(2025 - 04 - 01));
    }

    #[test]
    fn rejects_missing_zero_and_negative_amounts() {
        let (connection, user_id, salary, _) = setup();

        for amount in ["", "0", "-5", "abc"] {
            assert_eq!(
                parse_record_form(
                    RecordKind::Income,
                    user_id,
                    &form(amount, &salary.to_string(), "2025-04-01"),
                    &connection
                ),
                Err(Error::InvalidAmount),
                "amount {amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn amount_is_checked_before_category() {
        let (connection, user_id, _, _) = setup();

        assert_eq!(
            parse_record_form(
                RecordKind::Income,
                user_id,
                &form("0", "", ""),
                &connection
            ),
            Err(Error::InvalidAmount)
        );
    }

    #[test]
    fn rejects_category_of_wrong_kind() {
        let (connection, user_id, _, food) = setup();

        assert_eq!(
            parse_record_form(
                RecordKind::Income,
                user_id,
                &form("10", &food.to_string(), "2025-04-01"),
                &connection
            ),
            Err(Error::InvalidCategory)
        );
    }

    #[test]
    fn rejects_category_of_other_user() {
        let (connection, _, salary, _) = setup();
        let other_user = insert_test_user(&connection, "john@example.com");
        assert!(get_category(salary, other_user, &connection).is_err());

        assert_eq!(
            parse_record_form(
                RecordKind::Income,
                other_user,
                &form("10", &salary.to_string(), "2025-04-01"),
                &connection
            ),
            Err(Error::InvalidCategory)
        );
    }

    #[test]
    fn rejects_missing_category_and_date() {
        let (connection, user_id, salary, _) = setup();

        assert_eq!(
            parse_record_form(RecordKind::Income, user_id, &form("10", "", ""), &connection),
            Err(Error::InvalidCategory)
        );
        assert_eq!(
            parse_record_form(
                RecordKind::Income,
                user_id,
                &form("10", &salary.to_string(), ""),
                &connection
            ),
            Err(Error::MissingDate)
        );
    }

    #[test]
    fn update_form_uses_put() {
        let markup = record_form(
            RecordKind::Expense,
            RecordFormTarget::Update(7),
            &[],
            &RecordForm::default(),
            None,
        );
        let html = Html::parse_fragment(&markup.into_string());
        let form = must_get_form(&html);

        assert_hx_endpoint(&form, "/api/expenses/7", "hx-put");
        assert!(form.value().attr("hx-post").is_none());
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
    }

    #[test]
    fn selects_current_category() {
        let (connection, user_id, _, food) = setup();
        let category = get_category(food, user_id, &connection).unwrap();
        let values = RecordForm {
            category_id: Some(food.to_string()),
            ..Default::default()
        };

        let markup = record_form(
            RecordKind::Expense,
            RecordFormTarget::Create,
            &[category],
            &values,
            None,
        );
        let html = Html::parse_fragment(&markup.into_string());

        let selected = html
            .select(&Selector::parse("option[selected]").unwrap())
            .map(|option| option.value().attr("value").unwrap().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(selected, vec![food.to_string()]);
    }
}
