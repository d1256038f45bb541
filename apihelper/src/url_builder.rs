//! Request URL composition and percent-encoding.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::Error;

/// Characters escaped in a URL query: everything outside the RFC 3986 query set.
const QUERY_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Joins `base_url`, the API `version` segment and `path`.
///
/// A `path` that already carries an http(s) scheme is returned untouched.
pub fn build_url(base_url: &str, version: &str, path: &str) -> String {
    if has_http_scheme(path) {
        return path.to_string();
    }
    let mut url = base_url.trim_end_matches('/').to_string();
    let version = version.trim_matches('/');
    if !version.is_empty() {
        url.push('/');
        url.push_str(version);
    }
    url.push('/');
    url.push_str(path.trim_start_matches('/'));
    url
}

/// Percent-encodes `raw` for use as a request target and parses the result.
///
/// Control characters have no faithful encoding here and are rejected, as is
/// anything that does not end up as an absolute http(s) URL.
pub fn encode_url(raw: &str) -> Result<Url, Error> {
    if raw.chars().any(|c| c.is_ascii_control()) {
        tracing::warn!("Refusing to encode URL containing control characters: {:?}", raw);
        return Err(Error::InvalidUrl(raw.to_string()));
    }
    let encoded = utf8_percent_encode(raw, QUERY_UNSAFE).to_string();
    let url = Url::parse(&encoded).map_err(|e| {
        tracing::error!("Invalid URL constructed from {:?}: {}", raw, e);
        Error::InvalidUrl(raw.to_string())
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => {
            tracing::error!("Unsupported URL scheme {:?} in {:?}", other, raw);
            Err(Error::InvalidUrl(raw.to_string()))
        }
    }
}

fn has_http_scheme(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
