//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element rendered
//! by [crate::html::base], so any htmx response can carry one regardless of
//! its target.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::html::ALERT_CONTAINER_POSITION;

/// A message shown in the floating alert container.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with instructions on how to fix the problem.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (message, details, is_error) = match self {
            Alert::SuccessSimple { message } => (message, String::new(), false),
            Alert::Error { message, details } => (message, details, true),
        };

        let colour_style = if is_error {
            "text-red-800 bg-red-50 border-red-300 dark:bg-gray-800 \
            dark:text-red-400 dark:border-red-800"
        } else {
            "text-green-800 bg-green-50 border-green-300 dark:bg-gray-800 \
            dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style=(ALERT_CONTAINER_POSITION)
            {
                div
                    role="alert"
                    class={"flex items-start justify-between gap-4 p-4 border rounded-lg shadow " (colour_style)}
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.into_html()).into_response()
    }
}
