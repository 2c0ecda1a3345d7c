//! The log-in page and the handler for the log-in form.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
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
    auth::{
        Email, UserID, get_user_by_email, invalidate_auth_cookie, normalize_redirect_url,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        auth_form_footer, base, loading_spinner, log_in_register, password_input,
    },
    timezone::get_local_offset,
};

/// Shown when either log-in field is left blank.
pub const MISSING_CREDENTIALS_ERROR_MSG: &str = "Please enter both email and password";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// How long a session lasts when "remember me" is ticked.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to log a user in.
#[derive(Debug, Clone)]
pub struct LogInState {
    pub cookie_key: Key,
    /// How long a session lasts without "remember me".
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The fields of the log-in form, as typed by the user.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LogInData {
    pub email: Option<String>,
    pub password: Option<String>,
    /// A checkbox, so any value means it was ticked.
    pub remember_me: Option<String>,
    /// Where to go after logging in. Only local pages are honoured.
    pub redirect_url: Option<String>,
}

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }
                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    placeholder="you@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    autofocus
                    required;
            }

            (password_input("password", "Password", 0, true))

            div class="flex items-center gap-x-3" {
                input type="checkbox" name="remember_me" id="remember_me" class="rounded-xs";
                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE) {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Log in"
            }

            (auth_form_footer("Don't have an account?", endpoints::REGISTER_VIEW, "Register here"))
        }
    }
}

/// Keep `raw_url` only if it is a local page, logging anything dropped.
fn safe_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Dropping unsafe redirect URL {raw_url}");
    }

    redirect_url
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = safe_redirect_url(query.redirect_url.as_deref());
    let form = log_in_form("", None, redirect_url.as_deref());

    base("Log In", &[], &log_in_register("Log in to your account", &form)).into_response()
}

/// Why a log-in attempt was turned away.
#[derive(Debug, PartialEq)]
enum LogInFailure {
    MissingCredentials,
    /// Covers unknown emails as well as wrong passwords, so the form does not
    /// reveal which emails are registered.
    InvalidCredentials,
    Internal,
}

impl LogInFailure {
    fn message(&self) -> String {
        match self {
            LogInFailure::MissingCredentials => MISSING_CREDENTIALS_ERROR_MSG.to_owned(),
            LogInFailure::InvalidCredentials => Error::InvalidCredentials.to_string(),
            LogInFailure::Internal => INTERNAL_ERROR_MSG.to_owned(),
        }
    }
}

/// Find the user with `raw_email` and check their password.
fn authenticate(
    raw_email: &str,
    password: &str,
    db_connection: &Mutex<Connection>,
) -> Result<UserID, LogInFailure> {
    if raw_email.trim().is_empty() || password.is_empty() {
        return Err(LogInFailure::MissingCredentials);
    }

    let email = Email::new(raw_email).map_err(|_| LogInFailure::InvalidCredentials)?;

    let user = {
        let connection = db_connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            LogInFailure::Internal
        })?;

        get_user_by_email(&email, &connection).map_err(|error| match error {
            Error::NotFound => LogInFailure::InvalidCredentials,
            error => {
                tracing::error!("Could not look up user {email}: {error}");
                LogInFailure::Internal
            }
        })?
    };

    match user.password_hash.verify(password) {
        Ok(true) => Ok(user.id),
        Ok(false) => Err(LogInFailure::InvalidCredentials),
        Err(error) => {
            tracing::error!("Could not verify password for user {}: {error}", user.id);
            Err(LogInFailure::Internal)
        }
    }
}

/// Handle the log-in form.
///
/// On success the session cookie is set and the client is sent to the page it
/// asked for, or the dashboard. Otherwise the form comes back with a message.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInData>,
) -> Response {
    let redirect_url = safe_redirect_url(form.redirect_url.as_deref());
    let raw_email = form.email.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    let user_id = match authenticate(&raw_email, &password, &state.db_connection) {
        Ok(user_id) => user_id,
        Err(failure) => {
            return log_in_form(&raw_email, Some(&failure.message()), redirect_url.as_deref())
                .into_response();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let cookie_duration = match form.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    match set_auth_cookie(jar.clone(), user_id, cookie_duration, local_offset) {
        Ok(jar) => {
            tracing::info!("User {user_id} logged in");
            let destination = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());
            (StatusCode::SEE_OTHER, HxRedirect(destination), jar).into_response()
        }
        Err(error) => {
            tracing::error!("Could not set auth cookie for user {user_id}: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}


#[cfg(test)]
mod log_in_tests {
    use std::{
        collections::HashSet,
        sync::{Arc, Mutex},
    };

    use axum::{
        Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{Form, PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Email, PasswordHash, Username, ValidatedPassword, create_user,
            create_user_table,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, must_get_form, parse_html_fragment,
        },
    };

    use super::{
        LogInData, LogInFailure, LogInState, MISSING_CREDENTIALS_ERROR_MSG,
        REMEMBER_ME_COOKIE_DURATION, authenticate, post_log_in,
    };

    const TEST_EMAIL: &str = "jane@example.com";
    const TEST_PASSWORD: &str = "averysecurepassword!";

    fn log_in_data(email: &str, password: &str) -> LogInData {
        LogInData {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn authenticate_returns_user_id() {
        let state = get_test_app_config(true);

        let user_id = authenticate(TEST_EMAIL, TEST_PASSWORD, &state.db_connection);

        assert!(user_id.is_ok());
    }

    #[test]
    fn authenticate_rejects_malformed_email_as_invalid_credentials() {
        let state = get_test_app_config(true);

        let result = authenticate("jane", TEST_PASSWORD, &state.db_connection);

        assert_eq!(result, Err(LogInFailure::InvalidCredentials));
    }

    #[test]
    fn authenticate_treats_whitespace_email_as_missing() {
        let state = get_test_app_config(true);

        let result = authenticate("   ", TEST_PASSWORD, &state.db_connection);

        assert_eq!(result, Err(LogInFailure::MissingCredentials));
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_app_config(true);

        let response = new_log_in_request(state, log_in_data(TEST_EMAIL, TEST_PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert_set_cookie(&response);
    }

    #[tokio::test]
    async fn log_in_email_is_case_insensitive() {
        let state = get_test_app_config(true);

        let response =
            new_log_in_request(state, log_in_data("  Jane@Example.com ", TEST_PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_redirects_to_requested_url() {
        let state = get_test_app_config(true);
        let redirect_url = "/expenses?page=2";

        let response = new_log_in_request(
            state,
            LogInData {
                redirect_url: Some(redirect_url.to_string()),
                ..log_in_data(TEST_EMAIL, TEST_PASSWORD)
            },
        )
        .await;

        assert_hx_redirect(&response, redirect_url);
    }

    #[tokio::test]
    async fn log_in_falls_back_on_invalid_redirect_url() {
        let state = get_test_app_config(true);

        let response = new_log_in_request(
            state,
            LogInData {
                redirect_url: Some("https://example.com".to_string()),
                ..log_in_data(TEST_EMAIL, TEST_PASSWORD)
            },
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        for form in [
            log_in_data("", TEST_PASSWORD),
            log_in_data(TEST_EMAIL, ""),
            LogInData::default(),
        ] {
            let state = get_test_app_config(true);

            let response = new_log_in_request(state, form).await;

            assert_eq!(response.status(), StatusCode::OK);
            let html = parse_html_fragment(response).await;
            assert_form_error_message(&must_get_form(&html), MISSING_CREDENTIALS_ERROR_MSG);
        }
    }

    #[tokio::test]
    async fn log_in_fails_with_incorrect_password() {
        let state = get_test_app_config(true);

        let response = new_log_in_request(state, log_in_data(TEST_EMAIL, "wrongpassword")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(
            &must_get_form(&html),
            &Error::InvalidCredentials.to_string(),
        );
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let state = get_test_app_config(true);

        let response =
            new_log_in_request(state, log_in_data("john@example.com", TEST_PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(
            &must_get_form(&html),
            &Error::InvalidCredentials.to_string(),
        );
    }

    #[tokio::test]
    async fn remember_me_extends_auth_cookie_through_form() {
        let state = get_test_app_config(true);
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [
            ("email", TEST_EMAIL),
            ("password", TEST_PASSWORD),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

        let token_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            token_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION,
        );
    }

    #[tokio::test]
    async fn form_deserialises_without_remember_me() {
        let state = get_test_app_config(false);
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");
        let form = [("email", TEST_EMAIL), ("password", "test")];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(2),
            "got date time {left:?}, want {right:?}"
        );
    }

    fn get_test_app_config(with_user: bool) -> LogInState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        if with_user {
            create_user(
                Username::new("Jane").unwrap(),
                Email::new(TEST_EMAIL).unwrap(),
                PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap(),
                &connection,
            )
            .expect("Could not create test user");
        }

        LogInState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn new_log_in_request(state: LogInState, log_in_form: LogInData) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(log_in_form)).await
    }

    #[track_caller]
    fn assert_set_cookie(response: &Response<Body>) {
        let mut found_cookies = HashSet::new();

        for cookie_headers in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_headers.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            match cookie.name() {
                COOKIE_TOKEN => {
                    assert!(cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));
                    found_cookies.insert(cookie.name().to_string());
                }
                _ => panic!("Unexpected cookie found: {}", cookie.name()),
            }
        }

        assert!(
            found_cookies.contains(COOKIE_TOKEN),
            "could not find cookie '{}' in {:?}",
            COOKIE_TOKEN,
            found_cookies
        );
    }
}
