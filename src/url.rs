//! Cleans URLs pasted by users before they are handed to the extractor.

use crate::error::ExtractionError;
use reqwest::Url;

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

/// Drops zero-width characters, trims, and collapses whitespace runs to one space.
pub fn clean_url_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !is_zero_width(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns user input into an absolute http(s) URL.
///
/// A missing scheme defaults to `https://`, protocol-relative `//host` input
/// is expanded, and spaces are percent-encoded. Any other scheme is rejected.
pub fn normalize_recipe_url(input: &str) -> Result<String, ExtractionError> {
    let cleaned = clean_url_input(input);
    if cleaned.is_empty() {
        return Err(ExtractionError::InvalidUrl("URL is empty".to_string()));
    }

    let candidate = if let Some(rest) = cleaned.strip_prefix("//") {
        format!("https://{rest}")
    } else if has_scheme(&cleaned) {
        cleaned
    } else {
        format!("https://{cleaned}")
    };

    let url = Url::parse(&candidate.replace(' ', "%20"))
        .map_err(|e| ExtractionError::InvalidUrl(format!("{candidate}: {e}")))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url.to_string()),
        "http" | "https" => Err(ExtractionError::InvalidUrl(format!(
            "{candidate} has no host"
        ))),
        scheme => Err(ExtractionError::InvalidUrl(format!(
            "unsupported scheme '{scheme}', only http:// and https:// links can be imported"
        ))),
    }
}

/// `scheme:` prefix per RFC 3986, so `example.com:8080/x` is not mistaken for one.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid && !rest.starts_with(|c: char| c.is_ascii_digit())
}
