//! The registration page and the endpoint for creating new user accounts.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, Email, MIN_PASSWORD_LENGTH, PasswordHash, User, Username,
        ValidatedPassword, create_user, set_auth_cookie,
    },
    category::seed_default_categories,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        auth_form_footer, base, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

const ALL_FIELDS_REQUIRED_ERROR_MSG: &str = "All fields are required";
const PASSWORD_MISMATCH_ERROR_MSG: &str = "Passwords do not match";

fn registration_form(form: &RegisterForm, error_message: Option<&str>) -> Markup {
    let username = form.username.as_deref().unwrap_or_default();
    let email = form.email.as_deref().unwrap_or_default();
    let min_length = MIN_PASSWORD_LENGTH as u8;

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            div
            {
                label for="username" class=(FORM_LABEL_STYLE) { "Username" }

                input
                    type="text"
                    name="username"
                    id="username"
                    value=(username)
                    class=(FORM_TEXT_INPUT_STYLE)
                    autofocus
                    required;
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    placeholder="you@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            (password_input("password", "Password", min_length, true))
            (password_input("confirm_password", "Confirm Password", min_length, true))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            (auth_form_footer("Already have an account?", endpoints::LOG_IN_VIEW, "Log in here"))
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), None);
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered in the registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Create a user and give them the default set of categories.
///
/// Both steps run in one transaction, so a failure leaves no partial account behind.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` is already registered.
/// - [Error::SqlError] if another SQL related error occurred.
pub fn register_new_user(
    username: Username,
    email: Email,
    password_hash: PasswordHash,
    connection: &mut Connection,
) -> Result<User, Error> {
    let transaction = connection.transaction()?;

    let user = create_user(username, email, password_hash, &transaction)?;
    seed_default_categories(user.id, &transaction)?;

    transaction.commit()?;

    Ok(user)
}

/// Handle registration form submissions.
///
/// Validation failures re-render the form with the first problem found. On
/// success the new user is logged in and redirected to the dashboard.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let raw_username = form.username.as_deref().unwrap_or_default();
    let raw_email = form.email.as_deref().unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();
    let confirm_password = form.confirm_password.as_deref().unwrap_or_default();

    if [raw_username.trim(), raw_email.trim(), password, confirm_password]
        .iter()
        .any(|field| field.is_empty())
    {
        return registration_form(&form, Some(ALL_FIELDS_REQUIRED_ERROR_MSG)).into_response();
    }

    if password != confirm_password {
        return registration_form(&form, Some(PASSWORD_MISMATCH_ERROR_MSG)).into_response();
    }

    let validated_password = match ValidatedPassword::new(password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(&form, Some(&error.to_string())).into_response();
        }
    };

    let email = match Email::new(raw_email) {
        Ok(email) => email,
        Err(error) => {
            return registration_form(&form, Some(&error.to_string())).into_response();
        }
    };

    let username = match Username::new(raw_username) {
        Ok(username) => username,
        Err(error) => {
            return registration_form(&form, Some(&error.to_string())).into_response();
        }
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let user = {
        let mut connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match register_new_user(username, email, password_hash, &mut connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                return registration_form(&form, Some(&Error::DuplicateEmail.to_string()))
                    .into_response();
            }
            Err(error) => {
                tracing::error!("An unhandled error occurred while inserting a new user: {error}");
                return get_internal_server_error_redirect();
            }
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_timezone) {
        Ok(jar) => {
            tracing::info!("Registered user {}", user.id);
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                jar,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}
