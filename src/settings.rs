//! The settings page for changing the current user's profile and password.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{
        Email, MIN_PASSWORD_LENGTH, PasswordHash, UserID, Username, ValidatedPassword,
        get_user_by_id, is_email_taken_by_other_user, update_password, update_user_profile,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE,
        FORM_LABEL_STYLE, FORM_SUCCESS_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    navigation::NavBar,
};

const PROFILE_REQUIRED_ERROR_MSG: &str = "Username and email are required";
const EMAIL_IN_USE_ERROR_MSG: &str = "Email is already in use";
const WRONG_PASSWORD_ERROR_MSG: &str = "Current password is incorrect";
const NEW_PASSWORD_REQUIRED_ERROR_MSG: &str = "New password is required";
const NEW_PASSWORD_MISMATCH_ERROR_MSG: &str = "New passwords do not match";
const NEW_PASSWORD_TOO_SHORT_ERROR_MSG: &str = "New password must be at least 8 characters long";
const PROFILE_UPDATED_MSG: &str = "Profile updated successfully!";

/// The state needed for the settings page and endpoint.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data entered in the settings form.
///
/// The password fields are only checked when at least one of them is filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

impl SettingsForm {
    fn wants_password_change(&self) -> bool {
        [
            &self.current_password,
            &self.new_password,
            &self.confirm_password,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|value| !value.is_empty()))
    }
}

/// A message shown at the top of the settings form.
enum FormMessage<'a> {
    Error(&'a str),
    Success(&'a str),
}

fn settings_form(username: &str, email: &str, message: Option<FormMessage>) -> Markup {
    let min_length = MIN_PASSWORD_LENGTH as u8;

    html! {
        form
            hx-put=(endpoints::SETTINGS_API)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            @match message {
                Some(FormMessage::Error(text)) => p class=(FORM_ERROR_STYLE) { (text) },
                Some(FormMessage::Success(text)) => p class=(FORM_SUCCESS_STYLE) { (text) },
                None => {},
            }

            h3 class="text-lg font-semibold" { "Profile" }

            div
            {
                label for="username" class=(FORM_LABEL_STYLE) { "Username" }

                input
                    type="text"
                    name="username"
                    id="username"
                    value=(username)
                    class=(FORM_TEXT_INPUT_STYLE)
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
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            h3 class="text-lg font-semibold pt-4" { "Change Password" }

            span class="block text-sm text-gray-500 dark:text-gray-400"
            {
                "Leave these blank to keep your current password."
            }

            (password_input("current_password", "Current Password", 0, false))
            (password_input("new_password", "New Password", min_length, false))
            (password_input("confirm_password", "Confirm New Password", min_length, false))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Save Changes"
            }
        }
    }
}

fn settings_view(username: &str, email: &str) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();
    let form = settings_form(username, email, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class={ (CARD_STYLE) " w-full max-w-md" }
            {
                h2 class="text-xl font-bold mb-4" { "Settings" }

                (form)
            }
        }
    };

    base("Settings", &[], &content)
}

/// Display the settings form filled in with the user's current profile.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;

    Ok(settings_view(user.username.as_ref(), user.email.as_ref()).into_response())
}

enum SettingsError {
    /// The form input was rejected, with the message to show the user.
    Invalid(String),
    Internal(Error),
}

impl From<Error> for SettingsError {
    fn from(error: Error) -> Self {
        SettingsError::Internal(error)
    }
}

fn invalid(message: &str) -> SettingsError {
    SettingsError::Invalid(message.to_owned())
}

/// Check the new password fields and hash the new password.
fn new_password_hash(
    user_id: UserID,
    form: &SettingsForm,
    connection: &Connection,
) -> Result<PasswordHash, SettingsError> {
    let current_password = form.current_password.as_deref().unwrap_or_default();
    let new_password = form.new_password.as_deref().unwrap_or_default();
    let confirm_password = form.confirm_password.as_deref().unwrap_or_default();

    let user = get_user_by_id(user_id, connection)?;

    match user.password_hash.verify(current_password) {
        Ok(true) => {}
        Ok(false) => return Err(invalid(WRONG_PASSWORD_ERROR_MSG)),
        Err(error) => {
            tracing::error!("could not verify password for user {user_id}: {error}");
            return Err(invalid(WRONG_PASSWORD_ERROR_MSG));
        }
    }

    if new_password.is_empty() {
        return Err(invalid(NEW_PASSWORD_REQUIRED_ERROR_MSG));
    }

    if new_password != confirm_password {
        return Err(invalid(NEW_PASSWORD_MISMATCH_ERROR_MSG));
    }

    let validated_password = match ValidatedPassword::new(new_password) {
        Ok(password) => password,
        Err(Error::PasswordTooShort) => return Err(invalid(NEW_PASSWORD_TOO_SHORT_ERROR_MSG)),
        Err(error) => return Err(SettingsError::Invalid(error.to_string())),
    };

    Ok(PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)?)
}

/// Validate the form and save the changes.
///
/// Nothing is written unless every field passes validation, and the profile
/// and password are saved together or not at all.
fn apply_settings(
    user_id: UserID,
    form: &SettingsForm,
    connection: &Connection,
) -> Result<(Username, Email), SettingsError> {
    let raw_username = form.username.as_deref().unwrap_or_default();
    let raw_email = form.email.as_deref().unwrap_or_default();

    if raw_username.trim().is_empty() || raw_email.trim().is_empty() {
        return Err(invalid(PROFILE_REQUIRED_ERROR_MSG));
    }

    let email = Email::new(raw_email).map_err(|error| SettingsError::Invalid(error.to_string()))?;
    let username =
        Username::new(raw_username).map_err(|error| SettingsError::Invalid(error.to_string()))?;

    if is_email_taken_by_other_user(&email, user_id, connection)? {
        return Err(invalid(EMAIL_IN_USE_ERROR_MSG));
    }

    let password_hash = if form.wants_password_change() {
        Some(new_password_hash(user_id, form, connection)?)
    } else {
        None
    };

    let transaction = connection.unchecked_transaction().map_err(Error::from)?;

    update_user_profile(user_id, &username, &email, &transaction)?;

    if let Some(password_hash) = &password_hash {
        update_password(user_id, password_hash, &transaction)?;
    }

    transaction.commit().map_err(Error::from)?;

    if password_hash.is_some() {
        tracing::info!("Changed password for user {user_id}");
    }

    Ok((username, email))
}

/// Handle settings form submissions.
///
/// Both outcomes re-render the form: with the first problem found, or with a
/// confirmation once the changes are saved.
pub async fn update_settings_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SettingsForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match apply_settings(user_id, &form, &connection) {
        Ok((username, email)) => settings_form(
            username.as_ref(),
            email.as_ref(),
            Some(FormMessage::Success(PROFILE_UPDATED_MSG)),
        )
        .into_response(),
        Err(SettingsError::Invalid(message)) => settings_form(
            form.username.as_deref().unwrap_or_default(),
            form.email.as_deref().unwrap_or_default(),
            Some(FormMessage::Error(&message)),
        )
        .into_response(),
        Err(SettingsError::Internal(Error::HashingError(error))) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            get_internal_server_error_redirect()
        }
        Err(SettingsError::Internal(error)) => {
            tracing::error!("could not update settings for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
