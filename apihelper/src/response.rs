//! The response envelope shared by every endpoint and the parser that maps
//! raw transport responses onto it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Outcome flag delivered to completion callbacks alongside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

/// Standard wrapper returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<bool>,
}

impl<T> ApiResponse<T> {
    /// A failure envelope carrying only a message.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            result: false,
            msg: msg.into(),
            data: None,
            next_link: None,
        }
    }

    pub fn status(&self) -> Status {
        if self.result {
            Status::Success
        } else {
            Status::Failure
        }
    }

    /// Whether the server indicated another page is available.
    pub fn has_next(&self) -> bool {
        self.next_link.unwrap_or(false)
    }
}

/// What the transport handed back: a status and body, either of which may be
/// missing when the call never completed.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: Option<u16>,
    pub body: Option<Vec<u8>>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
        }
    }

    /// The transport failed before a response arrived.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Maps a raw transport response onto a typed envelope.
///
/// - 200/201: the envelope is decoded; `result: false` becomes `Error::Rejected`.
/// - 500/504: `Error::ServerUnavailable`, body ignored.
/// - 401: `Error::Unauthorized`, body ignored.
/// - anything else: the envelope is decoded and always reported as `Error::Rejected`.
///
/// Bodies that do not decode as `ApiResponse<T>`, including `data` of the
/// wrong shape, become `Error::Decode`; the decoder's message is logged only.
pub fn parse_response<T>(raw: RawResponse) -> Result<ApiResponse<T>, Error>
where
    T: DeserializeOwned,
{
    let (status, body) = match (raw.status, raw.body) {
        (Some(status), Some(body)) => (status, body),
        _ => {
            tracing::warn!("No response received from server");
            return Err(Error::NoResponse);
        }
    };
    tracing::debug!("Response status {} ({} bytes)", status, body.len());

    match status {
        200 | 201 => {
            let envelope = decode_envelope::<T>(status, &body)?;
            if envelope.result {
                Ok(envelope)
            } else {
                Err(reject(status, envelope, &body))
            }
        }
        500 | 504 => Err(Error::ServerUnavailable { status }),
        401 => Err(Error::Unauthorized),
        _ => {
            let envelope = decode_envelope::<T>(status, &body)?;
            Err(reject(status, envelope, &body))
        }
    }
}

fn decode_envelope<T>(status: u16, body: &[u8]) -> Result<ApiResponse<T>, Error>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(
            "Failed to decode response envelope (status {}): {} | body: {}",
            status,
            e,
            truncate_body(body)
        );
        Error::Decode {
            status,
            reason: e.to_string(),
        }
    })
}

/// `Error` is not generic, so the already-validated `data` is kept in its raw form.
fn reject<T>(status: u16, envelope: ApiResponse<T>, body: &[u8]) -> Error {
    let data = serde_json::from_slice::<ApiResponse<serde_json::Value>>(body)
        .ok()
        .and_then(|raw| raw.data);
    Error::Rejected {
        status,
        msg: envelope.msg,
        data,
        next_link: envelope.next_link,
    }
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 500;
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX {
        text.into_owned()
    } else {
        let mut end = MAX;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &text[..end])
    }
}
