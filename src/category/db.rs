//! Database operations for categories.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryKind, CategoryName},
};

/// The categories every new user starts with, as (name, description) pairs.
const DEFAULT_INCOME_CATEGORIES: [(&str, &str); 5] = [
    ("Salary", "Regular employment income"),
    ("Freelance", "Income from freelance work"),
    ("Investments", "Income from investments"),
    ("Gifts", "Money received as gifts"),
    ("Other", "Other sources of income"),
];

const DEFAULT_EXPENSE_CATEGORIES: [(&str, &str); 10] = [
    ("Housing", "Rent, mortgage, utilities"),
    ("Food", "Groceries and dining out"),
    ("Transportation", "Fuel, public transit, car maintenance"),
    ("Entertainment", "Movies, events, subscriptions"),
    ("Shopping", "Clothing, electronics, personal items"),
    ("Health", "Medical expenses, insurance"),
    ("Education", "Tuition, books, courses"),
    ("Personal Care", "Haircuts, gym, spa"),
    ("Travel", "Vacations, trips"),
    ("Miscellaneous", "Other expenses"),
];

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category
/// with the same name and kind.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    description: &str,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, description, kind) VALUES (?1, ?2, ?3, ?4);",
        (user_id.as_i64(), name.as_ref(), description, kind.as_str()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        description: description.to_owned(),
        kind,
    })
}

/// Give a new user the default income and expense categories.
pub fn seed_default_categories(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let defaults = DEFAULT_INCOME_CATEGORIES
        .iter()
        .map(|category| (category, CategoryKind::Income))
        .chain(
            DEFAULT_EXPENSE_CATEGORIES
                .iter()
                .map(|category| (category, CategoryKind::Expense)),
        );

    for ((name, description), kind) in defaults {
        create_category(
            user_id,
            CategoryName::new_unchecked(name),
            description,
            kind,
            connection,
        )?;
    }

    Ok(())
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, description, kind FROM category
            WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the user's categories of one kind, ordered alphabetically by name.
pub fn get_categories_by_kind(
    user_id: UserID,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, description, kind FROM category
            WHERE user_id = ?1 AND kind = ?2
            ORDER BY name ASC;",
        )?
        .query_map((user_id.as_i64(), kind.as_str()), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Change the name and description of a category. The kind is left unchanged.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateCategoryName] if another category of the same kind has the new name.
/// - [Error::UpdateMissingCategory] if the category does not exist or belongs to another user.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    name: &CategoryName,
    description: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, description = ?2 WHERE id = ?3 AND user_id = ?4",
        (name.as_ref(), description, category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category that no income or expense record uses.
///
/// # Errors
///
/// Returns a:
/// - [Error::CategoryInUse] if any income or expense record references the category.
/// - [Error::DeleteMissingCategory] if the category does not exist or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let usage_count: u64 = connection.query_row(
        "SELECT (SELECT COUNT(1) FROM income WHERE category_id = ?1 AND user_id = ?2)
            + (SELECT COUNT(1) FROM expense WHERE category_id = ?1 AND user_id = ?2)",
        (category_id, user_id.as_i64()),
        |row| row.get(0),
    )?;

    if usage_count > 0 {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Count the income and expense records of `user_id` per category.
///
/// Categories without any records are not included in the map.
pub fn count_records_per_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<CategoryId, u64>, Error> {
    let result: Result<HashMap<CategoryId, u64>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM (
                SELECT category_id FROM income WHERE user_id = ?1
                UNION ALL
                SELECT category_id FROM expense WHERE user_id = ?1
            )
            GROUP BY category_id",
        )?
        .query_map([user_id.as_i64()], |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            UNIQUE (user_id, name, kind),
            FOREIGN KEY (user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_kind ON category(user_id, kind);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_name: String = row.get(2)?;
    let description = row.get(3)?;
    let raw_kind: String = row.get(4)?;
    let kind = raw_kind.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Category {
        id,
        user_id,
        name: CategoryName::new_unchecked(&raw_name),
        description,
        kind,
    })
}
