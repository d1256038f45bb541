//! Header construction shared by every request.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::ClientConfig;

/// Content-type values used by the client.
pub mod content_type {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
    pub const IMAGE_JPG: &str = "image/jpg";
}

const DEVICE: &str = "device";
const PLATFORM: &str = "platform";
const TOKEN_PREFIX: &str = "Token ";

/// Builds the headers for one request.
///
/// Always sets `content-type`, `device`, `platform` and `Authorization`.
/// Entries in `overrides` replace colliding keys (case-insensitively) and
/// add new ones; an override that is not a valid header is skipped.
pub fn build_headers(
    config: &ClientConfig,
    content_type: &str,
    overrides: Option<&HashMap<String, String>>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, CONTENT_TYPE, content_type);
    insert(&mut headers, HeaderName::from_static(DEVICE), config.device_id());
    insert(&mut headers, HeaderName::from_static(PLATFORM), config.platform());
    insert(
        &mut headers,
        AUTHORIZATION,
        &format!("{}{}", TOKEN_PREFIX, config.token()),
    );

    for (key, value) in overrides.into_iter().flatten() {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Skipping header override with invalid name {:?}: {}", key, e);
                continue;
            }
        };
        insert(&mut headers, name, value);
    }
    headers
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => tracing::warn!("Skipping header {} with invalid value: {}", name, e),
    }
}
