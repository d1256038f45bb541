//! The `upload` subcommand: multipart form with an optional image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use apihelper::{Client, ImageAttachment, Method, Payload};
use clap::{Args, ValueEnum};
use serde_json::{Map, Value};

use super::header_overrides;
use crate::output::{parse_key_val, print_outcome};

#[derive(Clone, Copy, ValueEnum)]
pub enum UploadMethod {
    Post,
    Put,
}

impl From<UploadMethod> for Method {
    fn from(method: UploadMethod) -> Self {
        match method {
            UploadMethod::Post => Method::Post,
            UploadMethod::Put => Method::Put,
        }
    }
}

#[derive(Args)]
pub struct UploadArgs {
    /// Path relative to the API version (e.g. users/me/avatar/) or a full URL
    pub path: String,

    /// HTTP method used for the upload
    #[arg(long, value_enum, default_value = "post")]
    pub method: UploadMethod,

    /// Form field, KEY=VALUE (repeatable)
    #[arg(short = 'F', long = "field", value_parser = parse_key_val)]
    pub fields: Vec<(String, String)>,

    /// Image to attach, FIELD=PATH (e.g. profile_pic=./me.png)
    #[arg(long, value_parser = parse_key_val)]
    pub image: Option<(String, String)>,

    /// Extra or replacement header, KEY=VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,
}

pub async fn run(args: &UploadArgs, client: &Client) -> Result<()> {
    let fields: Map<String, Value> = args
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let image = match &args.image {
        Some((field, path)) => Some(load_image(field, PathBuf::from(path))?),
        None => None,
    };

    let outcome = client
        .multipart::<Value, _>(
            &args.path,
            header_overrides(&args.headers),
            args.method.into(),
            Payload::raw(fields),
            image,
        )
        .await;
    print_outcome(outcome)
}

fn load_image(field: &str, path: PathBuf) -> Result<ImageAttachment> {
    let image = image::open(&path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(ImageAttachment::new(field, image))
}
