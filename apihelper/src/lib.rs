mod client;
pub mod config;
mod errors;
mod headers;
mod payload;
pub mod reachability;
mod request;
mod response;
mod url_builder;
pub use self::client::Client;
pub use self::config::{ClientConfig, ConfigError, Environment, Region};
pub use self::errors::Error;
pub use self::headers::{build_headers, content_type};
pub use self::payload::{multipart_fields, Payload};
pub use self::reachability::{AlwaysReachable, Connectivity, Reachability};
pub use self::request::{Body, ImageAttachment, Method, Request};
pub use self::response::{parse_response, ApiResponse, RawResponse, Status};
pub use self::url_builder::{build_url, encode_url};
