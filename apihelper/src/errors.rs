//! Error types for the API helper.

use crate::response::ApiResponse;

/// Message shown when reachability reports the device offline.
pub const CHECK_CONNECTION: &str = "Please check your internet connection!";
/// Message shown for server errors and undecodable bodies.
pub const CANT_CONNECT: &str = "Oops! Can't connect to server";
/// Message shown for HTTP 401.
pub const UNAUTHORIZED: &str = "Authorization Failed!";
/// Message shown when the transport produced neither status nor body.
pub const NO_RESPONSE: &str = "No Response from server";
/// Message shown when the request URL cannot be encoded.
pub const URL_NOT_ENCODABLE: &str = "Url can't be encoded";

/// Every way a request can fail.
///
/// The `Display` text of each variant is the message placed in the failure
/// envelope handed to callers; underlying causes are only logged.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Reachability reported no network path. No request was sent.
    #[error("{}", CHECK_CONNECTION)]
    Unreachable,
    /// The target URL could not be percent-encoded into a valid URL. No request was sent.
    #[error("{}", URL_NOT_ENCODABLE)]
    InvalidUrl(String),
    /// The transport returned neither a status code nor a body.
    #[error("{}", NO_RESPONSE)]
    NoResponse,
    /// The server answered 500 or 504.
    #[error("{}", CANT_CONNECT)]
    ServerUnavailable { status: u16 },
    /// The server answered 401. Callers should tear down the session here.
    #[error("{}", UNAUTHORIZED)]
    Unauthorized,
    /// The body could not be decoded as the expected envelope.
    #[error("{}", CANT_CONNECT)]
    Decode { status: u16, reason: String },
    /// The envelope decoded but the server reported a failure.
    #[error("{msg}")]
    Rejected {
        status: u16,
        msg: String,
        data: Option<serde_json::Value>,
        next_link: Option<bool>,
    },
}

impl Error {
    /// HTTP status attached to this failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerUnavailable { status }
            | Self::Decode { status, .. }
            | Self::Rejected { status, .. } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Unreachable | Self::InvalidUrl(_) | Self::NoResponse => None,
        }
    }

    /// True for the 401 case, where the caller is expected to invalidate its session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// True when the failure was detected before anything was sent.
    pub fn is_client_side(&self) -> bool {
        matches!(self, Self::Unreachable | Self::InvalidUrl(_))
    }

    /// Converts the failure into the envelope delivered to callbacks.
    ///
    /// Rejected envelopes keep their server payload when it fits `T`.
    pub fn into_response<T>(self) -> ApiResponse<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match self {
            Self::Rejected {
                msg,
                data,
                next_link,
                ..
            } => ApiResponse {
                result: false,
                msg,
                data: data.and_then(|value| serde_json::from_value(value).ok()),
                next_link,
            },
            other => ApiResponse::failure(other.to_string()),
        }
    }
}
