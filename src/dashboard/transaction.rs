//! Database query for the most recent income and expense records.

use rusqlite::Connection;
use time::Date;

use crate::{Error, auth::UserID, record::RecordKind};

/// An income or expense record as listed on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RecentTransaction {
    pub kind: RecordKind,
    pub category_name: String,
    pub description: String,
    pub date: Date,
    pub amount: f64,
}

impl RecentTransaction {
    /// The amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            RecordKind::Income => self.amount,
            RecordKind::Expense => -self.amount,
        }
    }
}

/// Get the user's `limit` most recent records across income and expenses,
/// newest first.
pub(super) fn get_recent_transactions(
    user_id: UserID,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<RecentTransaction>, Error> {
    connection
        .prepare(
            "SELECT kind, category_name, description, date, amount FROM (
                SELECT 'income' AS kind, c.name AS category_name, r.description AS description,
                    r.date AS date, r.amount AS amount, r.id AS id
                FROM income r
                INNER JOIN category c ON c.id = r.category_id
                WHERE r.user_id = ?1
                UNION ALL
                SELECT 'expense' AS kind, c.name AS category_name, r.description AS description,
                    r.date AS date, r.amount AS amount, r.id AS id
                FROM expense r
                INNER JOIN category c ON c.id = r.category_id
                WHERE r.user_id = ?1
            )
            ORDER BY date DESC, id DESC
            LIMIT ?2",
        )?
        .query_map((user_id.as_i64(), limit), |row| {
            let kind: String = row.get(0)?;

            Ok(RecentTransaction {
                kind: if kind == "income" {
                    RecordKind::Income
                } else {
                    RecordKind::Expense
                },
                category_name: row.get(1)?,
                description: row.get(2)?,
                date: row.get(3)?,
                amount: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

#[cfg(test)]
mod recent_transaction_tests {
    use time::macros::date;

    use crate::{
        category::CategoryKind,
        record::RecordKind,
        test_utils::{
            get_test_connection, insert_test_category, insert_test_record_on, insert_test_user,
        },
    };

    use super::get_recent_transactions;

    #[test]
    fn merges_income_and_expenses_newest_first() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let salary = insert_test_category(&connection, user_id, "Salary", CategoryKind::Income);
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        insert_test_record_on(&connection, user_id, "income", salary, 1000.0, date!(2025 - 01 - 01));
        insert_test_record_on(&connection, user_id, "expense", food, 20.0, date!(2025 - 01 - 03));
        insert_test_record_on(&connection, user_id, "income", salary, 50.0, date!(2025 - 01 - 02));

        let recent = get_recent_transactions(user_id, 5, &connection).unwrap();

        let summary = recent
            .iter()
            .map(|transaction| (transaction.kind, transaction.date, transaction.signed_amount()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (RecordKind::Expense, date!(2025 - 01 - 03), -20.0),
                (RecordKind::Income, date!(2025 - 01 - 02), 50.0),
                (RecordKind::Income, date!(2025 - 01 - 01), 1000.0),
            ]
        );
        assert_eq!(recent[0].category_name, "Food");
    }

    #[test]
    fn limits_number_of_transactions() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        for day in 1..=7 {
            insert_test_record_on(
                &connection,
                user_id,
                "expense",
                food,
                10.0,
                date!(2025 - 01 - 01).replace_day(day).unwrap(),
            );
        }

        let recent = get_recent_transactions(user_id, 5, &connection).unwrap();

        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].date, date!(2025 - 01 - 07));
    }

    #[test]
    fn ignores_other_users() {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let other_user = insert_test_user(&connection, "john@example.com");
        let food = insert_test_category(&connection, other_user, "Food", CategoryKind::Expense);
        insert_test_record_on(&connection, other_user, "expense", food, 10.0, date!(2025 - 01 - 01));

        assert!(get_recent_transactions(user_id, 5, &connection)
            .unwrap()
            .is_empty());
    }
}
