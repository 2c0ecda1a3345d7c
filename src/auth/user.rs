//! Code for creating the user table and fetching and updating users in the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An email address of the form `local@domain`, trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Parse and normalise an email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw_email` has no `@`, has an empty
    /// local part, has a domain without a dot or contains whitespace.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        let (local, domain) = email.split_once('@').ok_or(Error::InvalidEmail)?;

        let is_valid = !local.is_empty()
            && !domain.contains('@')
            && domain
                .split_once('.')
                .is_some_and(|(name, tld)| !name.is_empty() && !tld.is_empty())
            && !domain.ends_with('.')
            && !email.chars().any(char::is_whitespace);

        if is_valid {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail)
        }
    }

    /// Create an email without validation, e.g. for values read from the database.
    pub fn new_unchecked(raw_email: &str) -> Self {
        Self(raw_email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The name a user is greeted by. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a username from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyUsername] if `raw_username` is empty or only whitespace.
    pub fn new(raw_username: &str) -> Result<Self, Error> {
        let username = raw_username.trim();

        if username.is_empty() {
            Err(Error::EmptyUsername)
        } else {
            Ok(Self(username.to_owned()))
        }
    }

    /// Create a username without validation, e.g. for values read from the database.
    pub fn new_unchecked(raw_username: &str) -> Self {
        Self(raw_username.to_owned())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown on the dashboard and settings page.
    pub username: Username,
    /// The email address used to log in. Unique across users.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if another user has already registered `email`.
/// - [Error::SqlError] if another SQL related error occurred.
pub fn create_user(
    username: Username,
    email: Email,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user (username, email, password, created_at) VALUES (?1, ?2, ?3, ?4)",
        (
            username.as_ref(),
            email.as_ref(),
            password_hash.as_ref(),
            created_at,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username,
        email,
        password_hash,
        created_at,
    })
}

const SELECT_USER: &str = "SELECT id, username, email, password, created_at FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_username: String = row.get(1)?;
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        username: Username::new_unchecked(&raw_username),
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(4)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user who registered `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered `email`.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", email.as_ref())], map_user_row)
        .map_err(|error| error.into())
}

/// Whether a user other than `user_id` has registered `email`.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn is_email_taken_by_other_user(
    email: &Email,
    user_id: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE email = ?1 AND id != ?2)",
            (email.as_ref(), user_id.as_i64()),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Change the username and email of the user with `user_id`.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if another user has registered `email`.
/// - [Error::UpdateMissingUser] if there is no user with `user_id`.
pub fn update_user_profile(
    user_id: UserID,
    username: &Username,
    email: &Email,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET username = ?1, email = ?2 WHERE id = ?3",
        (username.as_ref(), email.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingUser] if there is no user with `user_id`.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}


#[cfg(test)]
mod user_db_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, UserID},
    };

    use super::{
        Email, Username, count_users, create_user, create_user_table, get_user_by_email,
        get_user_by_id, is_email_taken_by_other_user, update_password, update_user_profile,
    };

    fn get_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        connection
    }

    fn insert_user(email: &str, connection: &Connection) -> super::User {
        create_user(
            Username::new("Jane").unwrap(),
            Email::new(email).unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .unwrap()
    }

    #[test]
    fn create_user_then_get_by_id_and_email() {
        let connection = get_connection();
        let user = insert_user("jane@example.com", &connection);

        let by_id = get_user_by_id(user.id, &connection).unwrap();
        let by_email = get_user_by_email(&user.email, &connection).unwrap();

        for got in [by_id, by_email] {
            assert_eq!(got.id, user.id);
            assert_eq!(got.username, user.username);
            assert_eq!(got.email, user.email);
            assert_eq!(got.password_hash, user.password_hash);
        }
    }

    #[test]
    fn create_user_fails_on_duplicate_email() {
        let connection = get_connection();
        insert_user("jane@example.com", &connection);

        let result = create_user(
            Username::new("Other Jane").unwrap(),
            Email::new("JANE@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(count_users(&connection), Ok(1));
    }

    #[test]
    fn get_user_by_email_fails_for_unknown_email() {
        let connection = get_connection();

        let result = get_user_by_email(&Email::new("nobody@example.com").unwrap(), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_profile_changes_username_and_email() {
        let connection = get_connection();
        let user = insert_user("jane@example.com", &connection);
        let username = Username::new("Janet").unwrap();
        let email = Email::new("janet@example.com").unwrap();

        update_user_profile(user.id, &username, &email, &connection).unwrap();

        let got = get_user_by_id(user.id, &connection).unwrap();
        assert_eq!(got.username, username);
        assert_eq!(got.email, email);
    }

    #[test]
    fn update_profile_fails_for_missing_user() {
        let connection = get_connection();

        let result = update_user_profile(
            UserID::new(42),
            &Username::new("Ghost").unwrap(),
            &Email::new("ghost@example.com").unwrap(),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingUser));
    }

    #[test]
    fn email_taken_ignores_own_account() {
        let connection = get_connection();
        let jane = insert_user("jane@example.com", &connection);
        let john = insert_user("john@example.com", &connection);

        assert_eq!(
            is_email_taken_by_other_user(&jane.email, jane.id, &connection),
            Ok(false)
        );
        assert_eq!(
            is_email_taken_by_other_user(&jane.email, john.id, &connection),
            Ok(true)
        );
    }

    #[test]
    fn update_password_replaces_hash() {
        let connection = get_connection();
        let user = insert_user("jane@example.com", &connection);
        let new_hash = PasswordHash::new_unchecked("correcthorsebatterystaple");

        update_password(user.id, &new_hash, &connection).unwrap();

        assert_eq!(
            get_user_by_id(user.id, &connection).unwrap().password_hash,
            new_hash
        );
    }
}
