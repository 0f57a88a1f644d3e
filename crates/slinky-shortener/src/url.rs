use slinky_core::ShortenerError;

/// Checks that `url` looks like `http(s)://host...` and returns it trimmed.
pub(crate) fn validate(url: &str) -> Result<&str, ShortenerError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ShortenerError::InvalidInput(
            "URL cannot be empty".to_string(),
        ));
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ShortenerError::InvalidInput(format!(
            "URL must have a valid scheme and host: {url}"
        )));
    };

    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return Err(ShortenerError::InvalidInput(format!(
            "URL scheme must be http or https: {scheme}"
        )));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(ShortenerError::InvalidInput(format!(
            "URL must have a valid scheme and host: {url}"
        )));
    }

    Ok(url)
}
