//! Middleware that only lets requests with a valid session cookie through.
//!
//! The authenticated [UserID](crate::auth::UserID) is added to the request
//! extensions, and every accepted request pushes the session expiry forward.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState,
    auth::{
        DEFAULT_COOKIE_DURATION,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// Decrypts the session cookie.
    pub cookie_key: Key,
    /// How long a fresh session lasts.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a request without a valid session is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A plain `303 See Other` for full page loads.
    Location,
    /// An `HX-Redirect` header, which htmx follows for fragment requests.
    Htmx,
}

impl LogInRedirect {
    fn to(self, log_in_url: &str) -> Response {
        match self {
            LogInRedirect::Location => Redirect::to(log_in_url).into_response(),
            LogInRedirect::Htmx => {
                (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
            }
        }
    }
}

/// The log-in page URL that sends the user back to where they were afterwards.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!(
            "No usable redirect target for {}, falling back to the dashboard",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

async fn require_session(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: LogInRedirect,
) -> Response {
    let log_in_url = log_in_url_for(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Invalid timezone {}, sending request to log in",
            state.local_timezone
        );
        return redirect.to(&log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read cookies: {error:?}");
            return redirect.to(&log_in_url);
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected request without a valid session: {error}");
            return redirect.to(&log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    with_extended_session(response, jar, local_offset)
}

/// Copy a cookie with a pushed back expiry onto `response`.
///
/// The cookie is left as is if the new expiry cannot be computed.
fn with_extended_session(
    response: Response,
    jar: PrivateCookieJar,
    local_offset: UtcOffset,
) -> Response {
    let jar = extend_auth_cookie_duration_if_needed(
        jar.clone(),
        DEFAULT_COOKIE_DURATION,
        local_offset,
    )
    .unwrap_or_else(|error| {
        tracing::error!("Could not extend session: {error}");
        jar
    });

    let (mut parts, body) = response.into_parts();
    let cookie_response = jar.into_response();
    for cookie in cookie_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.clone());
    }

    Response::from_parts(parts, body)
}

/// Guard page routes, redirecting to the log-in page when there is no valid session.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    require_session(state, request, next, LogInRedirect::Location).await
}

/// Guard htmx API routes, answering with `HX-Redirect` to the log-in page
/// when there is no valid session.
///
/// The redirect target after logging in is taken from the `HX-Current-URL`
/// header. Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    require_session(state, request, next, LogInRedirect::Htmx).await
}
