//! HTTP client facade: GET/POST/PUT/DELETE/multipart helpers over `reqwest`.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;

use crate::{
    build_headers, build_url, encode_url, multipart_fields, parse_response, AlwaysReachable,
    ApiResponse, Body, ClientConfig, ConfigError, Error, ImageAttachment, Method, Payload,
    RawResponse, Reachability, Request, Status,
};

/// Client for the app's JSON API.
///
/// Every call runs the same pipeline: reachability check, header build, URL
/// encoding, one HTTP round-trip, envelope parsing. Failures before the
/// round-trip never touch the network. Retries, TLS and connection reuse are
/// left to `reqwest`.
///
/// Cloning is cheap; clones share the connection pool and configuration.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    reachability: Arc<dyn Reachability>,
}

impl Client {
    /// Creates a client for `config`. Reachability defaults to [`AlwaysReachable`].
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            ConfigError::HttpClient(e.to_string())
        })?;
        Ok(Self {
            http,
            config: Arc::new(config),
            reachability: Arc::new(AlwaysReachable),
        })
    }

    /// Replaces the reachability source consulted before each request.
    pub fn with_reachability(mut self, reachability: impl Reachability + 'static) -> Self {
        self.reachability = Arc::new(reachability);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a GET request.
    pub async fn get<T>(
        &self,
        path: &str,
        headers: Option<HashMap<String, String>>,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.execute(Request::new(Method::Get, path).with_headers(headers))
            .await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post<T, P>(
        &self,
        path: &str,
        headers: Option<HashMap<String, String>>,
        payload: Payload<P>,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.execute(json_request(Method::Post, path, headers, payload))
            .await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn put<T, P>(
        &self,
        path: &str,
        headers: Option<HashMap<String, String>>,
        payload: Payload<P>,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.execute(json_request(Method::Put, path, headers, payload))
            .await
    }

    /// Sends a DELETE request with a JSON body.
    pub async fn delete<T, P>(
        &self,
        path: &str,
        headers: Option<HashMap<String, String>>,
        payload: Payload<P>,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        self.execute(json_request(Method::Delete, path, headers, payload))
            .await
    }

    /// Sends a multipart form with string fields and at most one image.
    ///
    /// Payload values that are not strings are left out of the form. Use
    /// [`Payload::empty`] to send only the image.
    pub async fn multipart<T, P>(
        &self,
        path: &str,
        headers: Option<HashMap<String, String>>,
        method: Method,
        payload: Payload<P>,
        image: Option<ImageAttachment>,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let request = Request::new(method, path)
            .with_headers(headers)
            .with_body(Body::Multipart {
                fields: payload.into_map(),
                image,
            });
        self.execute(request).await
    }

    /// Runs `request` on the Tokio runtime and hands the outcome to
    /// `completion` exactly once.
    ///
    /// Aborting the returned handle before the response arrives cancels the
    /// call; `completion` is then never invoked. Must be called from within a
    /// Tokio runtime.
    pub fn dispatch<T, F>(&self, request: Request, completion: F) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Status, ApiResponse<T>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let response = match client.execute::<T>(request).await {
                Ok(response) => response,
                Err(err) => err.into_response(),
            };
            completion(response.status(), response);
        })
    }

    /// Runs one request through the full pipeline.
    pub async fn execute<T>(&self, request: Request) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
    {
        let Request {
            method,
            path,
            headers: overrides,
            body,
        } = request;

        if !self.reachability.is_reachable() {
            tracing::warn!("Network unreachable, not sending {} {}", method, path);
            return Err(Error::Unreachable);
        }

        let mut headers = build_headers(&self.config, body.content_type(), overrides.as_ref());
        let url = encode_url(&build_url(
            self.config.base_url(),
            self.config.version(),
            &path,
        ))?;
        tracing::debug!("{} {}", method, url);

        let builder = self.http.request(method.into(), url);
        let builder = match body {
            Body::Empty => builder.headers(headers),
            Body::Json(map) => {
                tracing::debug!("JSON payload: {:?}", map);
                builder.headers(headers).json(&map)
            }
            Body::Multipart { fields, image } => {
                // reqwest supplies the content type, including the boundary.
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(build_form(fields, image))
            }
        };

        let raw = match builder.send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                match resp.bytes().await {
                    Ok(body) => RawResponse::new(status, body.to_vec()),
                    Err(e) => {
                        tracing::error!("Failed to read response body: {}", e);
                        RawResponse {
                            status: Some(status),
                            body: None,
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to send {} request: {}", method, e);
                RawResponse::empty()
            }
        };
        parse_response(raw)
    }
}

fn json_request<P: Serialize>(
    method: Method,
    path: &str,
    headers: Option<HashMap<String, String>>,
    payload: Payload<P>,
) -> Request {
    Request::new(method, path)
        .with_headers(headers)
        .with_body(Body::Json(payload.into_map()))
}

fn build_form(fields: Map<String, Value>, image: Option<ImageAttachment>) -> Form {
    let mut form = Form::new();
    if let Some(attachment) = image {
        match attachment.to_jpeg() {
            Ok(bytes) => {
                match Part::bytes(bytes)
                    .file_name(attachment.file_name())
                    .mime_str(attachment.mime_type())
                {
                    Ok(part) => form = form.part(attachment.field, part),
                    Err(e) => tracing::warn!("Skipping image {}: {}", attachment.field, e),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to encode image {} as JPEG, skipping: {}",
                    attachment.field,
                    e
                )
            }
        }
    }
    for (key, value) in multipart_fields(fields) {
        form = form.text(key, value);
    }
    form
}
