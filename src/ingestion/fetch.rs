//! Page fetching.
//!
//! Each fetch builds its own HTTP client: sessions are isolated per call so
//! a page that wedges or corrupts connection state cannot affect later
//! fetches. Throughput is not a concern here — ingestion is one page at a
//! time, driven by the user.

use reqwest::Client;
use url::Url;

use crate::types::FetchError;

const USER_AGENT: &str = concat!("zerobot-crawler/", env!("CARGO_PKG_VERSION"));

/// Validates a user-supplied URL string.
///
/// Only absolute http/https URLs are crawlable; anything else is rejected
/// before a request is attempted.
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FetchError::EmptyUrl);
    }
    let url = Url::parse(trimmed).map_err(|err| FetchError::InvalidUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{other}', only http and https can be crawled"),
        }),
    }
}

/// Fetches the raw markup behind `url`.
///
/// Non-2xx statuses and all transport failures surface as [`FetchError`];
/// nothing here panics or unwinds past the caller.
pub async fn fetch_page(url: &Url) -> Result<String, FetchError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .use_rustls_tls()
        .build()?;
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_url_is_rejected() {
        assert!(matches!(parse_url(""), Err(FetchError::EmptyUrl)));
        assert!(matches!(parse_url("   "), Err(FetchError::EmptyUrl)));
    }

    #[test]
    fn relative_url_is_rejected() {
        assert!(matches!(
            parse_url("docs/chapter1.html"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = parse_url("ftp://example.com/file").unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn valid_url_is_normalized() {
        let url = parse_url("  https://example.com/page  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page");
    }
}
