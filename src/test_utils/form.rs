use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|error| panic!("Bad selector {css:?}: {error}"))
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form"))
        .next()
        .expect("No form found")
}

/// Check that `form` submits to `endpoint` with the htmx `attribute`, e.g. "hx-put".
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form.value().attr(attribute);

    assert_eq!(
        got,
        Some(endpoint),
        "want form with {attribute}=\"{endpoint}\", got {got:?}"
    );
}

/// Find the input called `name`, and check its type and whether it is required.
#[track_caller]
fn must_get_input<'a>(
    form: &ElementRef<'a>,
    name: &str,
    type_: &str,
    required: bool,
) -> ElementRef<'a> {
    let input = form
        .select(&selector("input"))
        .find(|input| input.value().attr("name") == Some(name))
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""));

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, type_,
        "want input {name} with type \"{type_}\", got {got_type:?}"
    );

    let is_required = input.value().attr("required").is_some();
    if required {
        assert!(is_required, "want input {name} to be required");
    } else {
        assert!(!is_required, "want input {name} to be optional");
    }

    input
}

#[track_caller]
fn assert_input_value(input: ElementRef<'_>, name: &str, value: &str) {
    let got_value = input.value().attr("value").unwrap_or_default();

    assert_eq!(
        got_value, value,
        "want input {name} with value \"{value}\", got {got_value:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_input(form, name, type_, true);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_input_value(must_get_input(form, name, type_, true), name, value);
}

/// Like [assert_form_input], for inputs that may be left blank.
#[track_caller]
pub(crate) fn assert_optional_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_input(form, name, type_, false);
}

#[track_caller]
pub(crate) fn assert_optional_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    assert_input_value(must_get_input(form, name, type_, false), name, value);
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let button = form
        .select(&selector("button[type=submit]"))
        .next()
        .expect("No submit button found");

    assert_eq!(trimmed_text(button), text);
}

/// Check the first paragraph in `form`, which is where validation messages go.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let message = form
        .select(&selector("p"))
        .next()
        .expect("No error message found");

    assert_eq!(trimmed_text(message), want_error_message);
}
