//! Database operations for income and expense records.
//!
//! Every query is scoped to a single user, so one user can never read or
//! change another user's records.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryId,
    record::{CategoryTotal, NewRecord, Record, RecordId, RecordKind, RecordWithCategory},
};

/// Create the `income` and `expense` tables.
///
/// Both tables have the same columns. Deleting a user removes their records,
/// while deleting a category that is still referenced fails.
pub fn create_record_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    for kind in [RecordKind::Income, RecordKind::Expense] {
        let table = kind.table();

        connection.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY (category_id) REFERENCES category(id)
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_user_date ON {table}(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_{table}_category ON {table}(category_id);"
        ))?;
    }

    Ok(())
}

/// Insert a record for `user_id` and return it with its generated ID.
///
/// The caller is responsible for checking that the category belongs to the user.
pub fn create_record(
    kind: RecordKind,
    user_id: UserID,
    new_record: NewRecord,
    connection: &Connection,
) -> Result<Record, Error> {
    connection.execute(
        &format!(
            "INSERT INTO {} (user_id, category_id, amount, description, date)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            kind.table()
        ),
        (
            user_id.as_i64(),
            new_record.category_id,
            new_record.amount,
            &new_record.description,
            new_record.date,
        ),
    )?;

    Ok(Record {
        id: connection.last_insert_rowid(),
        user_id,
        category_id: new_record.category_id,
        amount: new_record.amount,
        description: new_record.description,
        date: new_record.date,
    })
}

/// Get a single record owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the record does not exist or belongs to another user.
pub fn get_record(
    kind: RecordKind,
    record_id: RecordId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Record, Error> {
    connection
        .query_row(
            &format!(
                "SELECT id, user_id, category_id, amount, description, date
                FROM {} WHERE id = ?1 AND user_id = ?2",
                kind.table()
            ),
            (record_id, user_id.as_i64()),
            map_record_row,
        )
        .map_err(Error::from)
}

/// Replace every field of a record owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingRecord] if no record owned by the user has `record_id`.
pub fn update_record(
    kind: RecordKind,
    record_id: RecordId,
    user_id: UserID,
    new_record: &NewRecord,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!(
            "UPDATE {} SET category_id = ?1, amount = ?2, description = ?3, date = ?4
            WHERE id = ?5 AND user_id = ?6",
            kind.table()
        ),
        (
            new_record.category_id,
            new_record.amount,
            &new_record.description,
            new_record.date,
            record_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRecord);
    }

    Ok(())
}

/// Delete a record owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingRecord] if no record owned by the user has `record_id`.
pub fn delete_record(
    kind: RecordKind,
    record_id: RecordId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", kind.table()),
        (record_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecord);
    }

    Ok(())
}

/// All of the user's records with their category names, newest first.
pub fn get_records_with_category(
    kind: RecordKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecordWithCategory>, Error> {
    connection
        .prepare(&format!(
            "SELECT r.id, r.user_id, r.category_id, r.amount, r.description, r.date, c.name
            FROM {} r
            INNER JOIN category c ON c.id = r.category_id
            WHERE r.user_id = ?1
            ORDER BY r.date DESC, r.id DESC",
            kind.table()
        ))?
        .query_map([user_id.as_i64()], |row| {
            Ok(RecordWithCategory {
                record: map_record_row(row)?,
                category_name: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The sum of all of the user's record amounts, zero if there are none.
pub fn get_total(kind: RecordKind, user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(amount), 0.0) FROM {} WHERE user_id = ?1",
                kind.table()
            ),
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// The user's records dated between `start` and `end`, inclusive, oldest first.
pub fn get_records_in_date_range(
    kind: RecordKind,
    user_id: UserID,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Record>, Error> {
    connection
        .prepare(&format!(
            "SELECT id, user_id, category_id, amount, description, date
            FROM {}
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date ASC, id ASC",
            kind.table()
        ))?
        .query_map((user_id.as_i64(), start, end), map_record_row)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The sum of the user's records in one category between `start` and `end`, inclusive.
pub fn get_category_total_in_range(
    kind: RecordKind,
    user_id: UserID,
    category_id: CategoryId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(amount), 0.0) FROM {}
                WHERE user_id = ?1 AND category_id = ?2 AND date BETWEEN ?3 AND ?4",
                kind.table()
            ),
            (user_id.as_i64(), category_id, start, end),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// The user's totals per category, largest first.
///
/// Categories without records are left out.
pub fn get_totals_by_category(
    kind: RecordKind,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(&format!(
            "SELECT c.id, c.name, SUM(r.amount) AS total
            FROM {} r
            INNER JOIN category c ON c.id = r.category_id
            WHERE r.user_id = ?1
            GROUP BY c.id, c.name
            ORDER BY total DESC, c.name ASC",
            kind.table()
        ))?
        .query_map([user_id.as_i64()], |row| {
            Ok(CategoryTotal {
                category_id: row.get(0)?,
                category_name: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn map_record_row(row: &Row) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
    })
}
