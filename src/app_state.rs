//! The state shared by every request handler.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, timezone::get_local_offset};

/// Everything handlers need: the cookie key, session settings and the database.
///
/// Handlers take a narrower state struct built from this one with [FromRef].
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signs and encrypts the session cookie.
    pub cookie_key: Key,
    /// How long a session lasts without "remember me".
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The one connection to the application database.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Set up the database behind `db_connection` and derive the cookie key from `cookie_secret`.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [Error::InvalidTimezoneError] if `local_timezone` is not a canonical timezone name.
    /// - [Error::SqlError] if the tables could not be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive a cookie key from `secret` by hashing it with SHA-512.
pub fn create_cookie_key(secret: &str) -> Key {
    Key::from(&Sha512::digest(secret))
}
