use rusqlite::Connection;
use time::{Date, macros::date};

use crate::{
    auth::{Email, PasswordHash, UserID, Username, create_user},
    category::{CategoryId, CategoryKind, CategoryName, create_category},
    db::initialize,
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> UserID {
    create_user(
        Username::new_unchecked("Test User"),
        Email::new(email).expect("Invalid test email"),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
    .id
}

pub(crate) fn insert_test_category(
    connection: &Connection,
    user_id: UserID,
    name: &str,
    kind: CategoryKind,
) -> CategoryId {
    create_category(
        user_id,
        CategoryName::new_unchecked(name),
        "",
        kind,
        connection,
    )
    .expect("Could not create test category")
    .id
}

/// Insert a row into the `income` or `expense` table dated 2025-01-15.
pub(crate) fn insert_test_record(
    connection: &Connection,
    user_id: UserID,
    table: &str,
    category_id: CategoryId,
    amount: f64,
) -> i64 {
    insert_test_record_on(
        connection,
        user_id,
        table,
        category_id,
        amount,
        date!(2025 - 01 - 15),
    )
}

pub(crate) fn insert_test_record_on(
    connection: &Connection,
    user_id: UserID,
    table: &str,
    category_id: CategoryId,
    amount: f64,
    date: Date,
) -> i64 {
    connection
        .execute(
            &format!(
                "INSERT INTO {table} (user_id, category_id, amount, description, date)
                VALUES (?1, ?2, ?3, '', ?4)"
            ),
            (user_id.as_i64(), category_id, amount, date),
        )
        .expect("Could not insert test record");

    connection.last_insert_rowid()
}
