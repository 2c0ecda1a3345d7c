//! Where to send a user after they log in.
//!
//! Only same-site paths are accepted as targets, so the log-in page cannot be
//! used to bounce users to another site.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// The path and query of `uri` if it is a local page other than the log-in page.
fn local_target(uri: &Uri) -> Option<String> {
    let target = uri.path_and_query()?.as_str();

    let is_local = target.starts_with('/') && !target.starts_with("//");
    let is_log_in = uri.path() == endpoints::LOG_IN_VIEW;

    (is_local && !is_log_in).then(|| target.to_owned())
}

/// Parse a `redirect_url` sent by the client, keeping it only if it points at
/// a page on this site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri: Uri = raw_url.parse().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_target(&uri)
}

/// The page an htmx request was made from, taken from the `HX-Current-URL`
/// header. The header holds an absolute URL so only the path and query are kept.
fn htmx_origin(request: &Request) -> Option<String> {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
    };

    if !header("hx-request").is_some_and(|value| value.eq_ignore_ascii_case("true")) {
        tracing::warn!("API request to {} is not from htmx", request.uri().path());
        return None;
    }

    let Some(current_url) = header("hx-current-url") else {
        tracing::warn!("htmx request to {} has no HX-Current-URL", request.uri().path());
        return None;
    };

    let target = current_url.parse::<Uri>().ok().as_ref().and_then(local_target);
    if target.is_none() {
        tracing::warn!("Ignoring unusable HX-Current-URL {current_url}");
    }

    target
}

/// The log-in page URL that returns the user to the page behind `request`.
///
/// Page requests return to the requested page. API requests return to the
/// page that made them. Returns `None` if there is no usable page.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        htmx_origin(request)?
    } else {
        local_target(request.uri())?
    };

    build_log_in_redirect_url_from_target(&target)
}

/// The log-in page URL with `target` as its `redirect_url` query parameter.
pub(super) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .inspect_err(|error| tracing::error!("Could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}
