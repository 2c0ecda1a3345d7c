//! Page shells, shared styles and small view helpers used across all pages.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use numfmt::{Formatter, Precision};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use unicode_segmentation::UnicodeSegmentation;

use crate::endpoints;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "w-full py-2.5 px-5 mb-2 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";
pub const FORM_RADIO_GROUP_STYLE: &str = "flex flex-col gap-2";
pub const FORM_RADIO_INPUT_STYLE: &str = "peer h-4 w-4 shrink-0 cursor-pointer \
    text-blue-600 border-gray-300 dark:border-gray-600 focus-visible:ring-2 \
    focus-visible:ring-blue-500 focus-visible:ring-offset-2 \
    focus-visible:ring-offset-white focus-visible:dark:ring-offset-gray-900";
pub const FORM_RADIO_LABEL_STYLE: &str = "flex-1 rounded border border-gray-300 \
    dark:border-gray-600 bg-white dark:bg-gray-700 px-3 py-2 text-sm font-medium \
    text-gray-700 dark:text-white cursor-pointer transition \
    hover:border-gray-400 hover:bg-gray-50 hover:text-gray-900 \
    hover:dark:border-gray-500 hover:dark:bg-gray-600 active:scale-[0.99] \
    peer-checked:border-blue-600 peer-checked:bg-blue-50 peer-checked:text-blue-700 \
    peer-checked:shadow-sm peer-checked:dark:border-blue-500 \
    peer-checked:dark:bg-blue-600/20 peer-checked:dark:text-blue-200";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Category badge style
pub const CATEGORY_BADGE_STYLE: &str = "inline-flex items-center px-2.5 py-0.5 \
    text-xs font-semibold text-blue-800 bg-blue-100 rounded-full \
    dark:bg-blue-900 dark:text-blue-300";

// Card style
pub const CARD_STYLE: &str = "rounded-lg border border-gray-200 bg-white p-4 shadow-md \
    dark:border-gray-700 dark:bg-gray-800";

// Form error message
pub const FORM_ERROR_STYLE: &str = "text-red-600 dark:text-red-400";

// Form success message
pub const FORM_SUCCESS_STYLE: &str = "text-green-700 dark:text-green-400";

const AUTH_CARD_STYLE: &str = "w-full sm:max-w-md p-6 sm:p-8 space-y-4 md:space-y-6 \
    rounded-lg shadow bg-white dark:bg-gray-800 dark:border dark:border-gray-700";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// Extra elements a page can add to the `<head>` of [base].
pub enum HeadElement {
    /// The file path or URL to a JavaScript script.
    ScriptLink(String),
    /// JavaScript source code.
    ScriptSource(PreEscaped<String>),
    /// CSS source code.
    Style(PreEscaped<String>),
}

/// Styles every page needs before `main.css` has loaded.
///
/// Chart tooltips sit under the mobile nav bar but above the page.
const BASE_CSS: &str = "
#indicator.htmx-indicator { display: none; }
#indicator.htmx-request .htmx-indicator,
#indicator.htmx-request.htmx-indicator { display: inline; }
.echarts-tooltip { z-index: 30 !important; }
";

/// Pins the alert container to the bottom centre of the viewport, above everything else.
pub const ALERT_CONTAINER_POSITION: &str =
    "position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;";

/// Wrap `content` in a full HTML document titled "`title` - FinanceTrack".
///
/// Every page loads htmx, the response-targets extension and `app.js`, and
/// has an `#alert-container` that alert fragments are swapped into.
pub fn base(title: &str, head_elements: &[HeadElement], content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - FinanceTrack" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link rel="icon" type="image/png" href="/static/favicon-128x128.png" sizes="128x128";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style { (PreEscaped(BASE_CSS)) }

                @for element in head_elements
                {
                    @match element
                    {
                        HeadElement::ScriptSource(text) => script { (text) }
                        HeadElement::ScriptLink(path) => script src=(path) {}
                        HeadElement::Style(text) => style { (text) }
                    }
                }

                script src="/static/app.js" defer {}
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style=(ALERT_CONTAINER_POSITION)
                {}
            }
        }
    }
}

/// A full page for an HTTP error, e.g. `header` "404", with a link back home.
///
/// `description` says what went wrong and `fix` what the user can do about it.
pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    let content = html! {
        main class="mx-auto max-w-screen-sm px-4 py-8 lg:py-16 text-center text-gray-900 dark:text-white" {
            h1 class="mb-4 text-7xl lg:text-9xl font-extrabold tracking-tight text-blue-600 dark:text-blue-500" {
                (header)
            }
            p class="mb-4 text-3xl md:text-4xl font-bold tracking-tight" { (description) }
            p class="mb-4 text-xl md:text-2xl tracking-tight" { (fix) }
            a href=(endpoints::ROOT) class=(ERROR_HOME_BUTTON_STYLE) { "Back to Homepage" }
        }
    };

    base(title, &[], &content)
}

const ERROR_HOME_BUTTON_STYLE: &str = "inline-flex my-4 px-5 py-2.5 rounded text-sm \
    font-medium text-white bg-blue-600 hover:bg-blue-800 focus:ring-4 \
    focus:ring-blue-300 dark:focus:ring-blue-900";

/// The card that holds the log-in and registration forms, under the app name.
pub fn log_in_register(form_title: &str, form: &Markup) -> Markup {
    html! {
        main class="flex flex-col items-center justify-center gap-6 px-6 py-8 mx-auto" {
            p class="flex items-center gap-2 text-2xl font-semibold text-gray-900 dark:text-white" {
                img class="w-8 h-8" src="/static/favicon-128x128.png" alt="";
                "FinanceTrack"
            }

            section class=(AUTH_CARD_STYLE) {
                h1 class="text-xl md:text-2xl font-bold tracking-tight text-gray-900 dark:text-white" {
                    (form_title)
                }

                (form)
            }
        }
    }
}

/// A password input with a label.
///
/// `name` is used for both the input's name and ID.
pub fn password_input(name: &str, label: &str, min_length: u8, is_required: bool) -> Markup {
    html! {
        div
        {
            label
                for=(name)
                class=(FORM_LABEL_STYLE)
            {
                (label)
            }

            input
                type="password"
                name=(name)
                id=(name)
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required[is_required]
                minlength=(min_length);
        }
    }
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// Returns the CSS styles for adding a dollar sign prefix to number inputs.
/// Used for currency input fields across multiple forms.
pub fn dollar_input_styles() -> HeadElement {
    HeadElement::Style(PreEscaped(
        r#"
        .input-wrapper {
            position: relative;
            display: inline-block;
        }
        .input-wrapper input[type="number"] {
            padding-left: 1.4rem;
        }
        .input-wrapper::before {
            content: '$';
            position: absolute;
            left: 0.6rem;
            top: 50%;
            transform: translateY(-50%);
            pointer-events: none;
        }
        "#
        .to_owned(),
    ))
}

/// Format a dollar amount with thousands separators and two decimal places,
/// e.g. "$1,234.50" or "-$4.50".
pub fn format_currency(amount: f64) -> String {
    static FORMATTER: OnceLock<Option<Formatter>> = OnceLock::new();

    let formatter = FORMATTER.get_or_init(|| {
        Formatter::currency("$")
            .inspect_err(|error| tracing::error!("could not create currency formatter: {error:?}"))
            .ok()
            .map(|formatter| formatter.precision(Precision::Decimals(2)))
    });

    let magnitude = amount.abs();
    let mut formatted = match formatter {
        // Zero is formatted as "0" without the prefix.
        Some(formatter) if magnitude > 0.0 => formatter.fmt_string(magnitude),
        _ => format!("${magnitude:.2}"),
    };

    // Trailing zeros are dropped, e.g. "$12.3" for 12.30.
    match formatted.rfind('.') {
        None => formatted.push_str(".00"),
        Some(point) if formatted.len() - point == 2 => formatted.push('0'),
        Some(_) => {}
    }

    if amount < 0.0 && magnitude > 0.0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// An inline link, e.g. inside a sentence of an empty state.
pub fn link(url: &str, text: &str) -> Markup {
    html! { a href=(url) class=(LINK_STYLE) { (text) } }
}

/// Edit link and delete button for a row in a table or a card.
///
/// The delete button asks for confirmation with `confirm_message`, then sends
/// a DELETE request to `delete_url` and swaps `hx_target` with `hx_swap`.
pub fn edit_delete_action_links(
    edit_url: &str,
    delete_url: &str,
    confirm_message: &str,
    hx_target: &str,
    hx_swap: &str,
) -> Markup {
    html! {
        a href=(edit_url) class=(LINK_STYLE) { "Edit" }

        button
            type="button"
            hx-delete=(delete_url)
            hx-confirm=(confirm_message)
            hx-target=(hx_target)
            hx-target-error="#alert-container"
            hx-swap=(hx_swap)
            class=(BUTTON_DELETE_STYLE)
        {
            "Delete"
        }
    }
}

/// The path to the ECharts library, for pages that render charts.
pub fn echarts_script() -> HeadElement {
    HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned())
}

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day padding:zero], [year]");

/// Format a date for display, e.g. "Mar 05, 2025".
pub fn format_date(date: Date) -> String {
    date.format(DISPLAY_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// The max number of graphemes to display in table cells before truncating.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// Shorten `description` to at most [MAX_DESCRIPTION_GRAPHEMES] graphemes,
/// appending an ellipsis when it was cut.
pub fn truncate_description(description: &str) -> String {
    let graphemes = description.graphemes(true).collect::<Vec<_>>();

    if graphemes.len() <= MAX_DESCRIPTION_GRAPHEMES {
        return description.to_owned();
    }

    format!("{}…", graphemes[..MAX_DESCRIPTION_GRAPHEMES - 1].concat())
}

/// The "Don't have an account?" style line under the log-in and registration forms.
pub fn auth_form_footer(prompt: &str, url: &str, link_text: &str) -> Markup {
    html! {
        p class="text-sm font-light text-gray-500 dark:text-gray-400" {
            (prompt) " " a href=(url) class={ "font-semibold " (LINK_STYLE) } { (link_text) }
        }
    }
}

/// Body of the page shown when a user has nothing to display yet.
pub fn empty_state(title: &str, message: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold" { (title) }
            p { (message) }
        }
    }
}
