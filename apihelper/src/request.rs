//! Per-call request descriptor.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde_json::{Map, Value};

use crate::headers::content_type;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single image sent as a multipart file part.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    /// Form field name; the file name sent is `<field>.jpg`.
    pub field: String,
    pub image: DynamicImage,
}

impl ImageAttachment {
    pub fn new(field: &str, image: DynamicImage) -> Self {
        Self {
            field: field.to_string(),
            image,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.jpg", self.field)
    }

    pub fn mime_type(&self) -> &'static str {
        content_type::IMAGE_JPG
    }

    /// Encodes the image as a maximum-quality JPEG.
    pub fn to_jpeg(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Cursor::new(Vec::new());
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(self.image.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, 100))?;
        Ok(bytes.into_inner())
    }
}

/// How the payload travels on the wire.
#[derive(Debug, Clone)]
pub enum Body {
    /// No body at all.
    Empty,
    /// The map serialized as a JSON object.
    Json(Map<String, Value>),
    /// String fields plus at most one image.
    Multipart {
        fields: Map<String, Value>,
        image: Option<ImageAttachment>,
    },
}

impl Body {
    pub fn content_type(&self) -> &'static str {
        match self {
            Body::Multipart { .. } => content_type::MULTIPART_FORM_DATA,
            Body::Empty | Body::Json(_) => content_type::APPLICATION_JSON,
        }
    }
}

/// Everything needed to issue one call. Built per call and consumed by
/// [`crate::Client::execute`].
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path relative to the configured base URL and version, or an absolute URL.
    pub path: String,
    pub headers: Option<HashMap<String, String>>,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: None,
            body: Body::Empty,
        }
    }

    pub fn with_headers(mut self, headers: Option<HashMap<String, String>>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}
