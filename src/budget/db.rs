//! Database operations for budgets.

use rusqlite::{Connection, Row, types::Type};
use time::{Date, macros::date};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, BudgetPeriod, BudgetWithCategory, NewBudget},
    category::CategoryId,
};

/// Stands in for a missing end date when comparing date ranges.
const OPEN_END_DATE: Date = date!(9999 - 12 - 31);

/// Create the `budget` table.
///
/// Deleting a user or a category removes its budgets.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            period TEXT NOT NULL DEFAULT 'monthly'
                CHECK (period IN ('daily', 'weekly', 'monthly', 'yearly')),
            start_date TEXT NOT NULL,
            end_date TEXT,
            FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY (category_id) REFERENCES category(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user ON budget(user_id);",
    )
}

/// Insert a budget for `user_id` and return it with its generated ID.
///
/// The caller is responsible for validating the category and checking for
/// overlapping budgets.
pub fn create_budget(
    user_id: UserID,
    new_budget: NewBudget,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, category_id, amount, period, start_date, end_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            new_budget.category_id,
            new_budget.amount,
            new_budget.period.as_str(),
            new_budget.start_date,
            new_budget.end_date,
        ),
    )?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        user_id,
        category_id: new_budget.category_id,
        amount: new_budget.amount,
        period: new_budget.period,
        start_date: new_budget.start_date,
        end_date: new_budget.end_date,
    })
}

/// Get a single budget owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .query_row(
            "SELECT id, user_id, category_id, amount, period, start_date, end_date
            FROM budget WHERE id = ?1 AND user_id = ?2",
            (budget_id, user_id.as_i64()),
            map_budget_row,
        )
        .map_err(Error::from)
}

/// Get the user's budgets with their category names, latest start date first.
pub fn get_budgets_with_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<BudgetWithCategory>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date, b.end_date,
                c.name
            FROM budget b
            INNER JOIN category c ON c.id = b.category_id
            WHERE b.user_id = ?1
            ORDER BY b.start_date DESC, b.id DESC",
        )?
        .query_map([user_id.as_i64()], |row| {
            Ok(BudgetWithCategory {
                budget: map_budget_row(row)?,
                category_name: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Get the user's budgets that apply on `date`, ordered by category name.
pub fn get_active_budgets(
    user_id: UserID,
    date: Date,
    connection: &Connection,
) -> Result<Vec<BudgetWithCategory>, Error> {
    connection
        .prepare(
            "SELECT b.id, b.user_id, b.category_id, b.amount, b.period, b.start_date, b.end_date,
                c.name
            FROM budget b
            INNER JOIN category c ON c.id = b.category_id
            WHERE b.user_id = ?1
                AND b.start_date <= ?2
                AND (b.end_date IS NULL OR b.end_date >= ?2)
            ORDER BY c.name ASC, b.id ASC",
        )?
        .query_map((user_id.as_i64(), date), |row| {
            Ok(BudgetWithCategory {
                budget: map_budget_row(row)?,
                category_name: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Whether another budget of the user's for the same category and period
/// overlaps the date range `start_date..=end_date`.
///
/// A missing end date means the range never ends. `exclude` skips a budget,
/// so that a budget being updated does not clash with itself.
pub fn has_overlapping_budget(
    user_id: UserID,
    category_id: CategoryId,
    period: BudgetPeriod,
    start_date: Date,
    end_date: Option<Date>,
    exclude: Option<BudgetId>,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (
                SELECT 1 FROM budget
                WHERE user_id = ?1
                    AND category_id = ?2
                    AND period = ?3
                    AND id != ?4
                    AND start_date <= ?5
                    AND COALESCE(end_date, ?6) >= ?7
            )",
            (
                user_id.as_i64(),
                category_id,
                period.as_str(),
                exclude.unwrap_or(-1),
                end_date.unwrap_or(OPEN_END_DATE),
                OPEN_END_DATE,
                start_date,
            ),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Replace every field of a budget owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingBudget] if no budget owned by the user has `budget_id`.
pub fn update_budget(
    budget_id: BudgetId,
    user_id: UserID,
    new_budget: &NewBudget,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget
        SET category_id = ?1, amount = ?2, period = ?3, start_date = ?4, end_date = ?5
        WHERE id = ?6 AND user_id = ?7",
        (
            new_budget.category_id,
            new_budget.amount,
            new_budget.period.as_str(),
            new_budget.start_date,
            new_budget.end_date,
            budget_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete a budget owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingBudget] if no budget owned by the user has `budget_id`.
pub fn delete_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let period: String = row.get(4)?;
    let period = period.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        period,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
    })
}
