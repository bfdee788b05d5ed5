#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! HTTP access to the snapshot archive and the build-report service
//!
//! Both services publish plain HTML, so the only primitive the pipeline
//! needs is "fetch this page as text".

mod client;

pub use client::{NetClient, NetConfig, RetryPolicy};

use repro_errors::{Error, NetworkError};
use repro_events::EventEmitter;
use url::Url;

/// Download the page at `url` and return its body.
///
/// # Errors
///
/// Returns an error if the URL is malformed, the request fails, the server
/// answers with a non-success status, or the body cannot be decoded.
pub async fn fetch_text(
    client: &NetClient,
    url: &str,
    events: &impl EventEmitter,
) -> Result<String, Error> {
    let url = parse_url(url)?;
    events.emit_debug(format!("GET {url}"));

    let response = client.get(url.as_str()).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::HttpError {
            status: status.as_u16(),
            url: url.into(),
        }
        .into());
    }

    let body = response
        .text()
        .await
        .map_err(|e| NetworkError::RequestFailed(format!("{url}: {e}")))?;
    Ok(body)
}

/// # Errors
///
/// Returns an error if the URL string is malformed or not http(s).
pub fn parse_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(NetworkError::InvalidUrl(format!("{url}: unsupported scheme {other}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("http://snapshot.debian.org/archive/debian/").is_ok());
        assert!(parse_url("https://reproducible.debian.net/rb-pkg/").is_ok());
        assert!(parse_url("not a url").is_err());
        assert!(parse_url("ftp://ftp.debian.org/debian/").is_err());
    }
}
