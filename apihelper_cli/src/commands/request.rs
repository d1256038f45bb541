//! The `get`, `post`, `put` and `delete` subcommands.

use anyhow::{Context, Result};
use apihelper::{Client, Payload};
use clap::Args;
use serde_json::{Map, Value};

use super::header_overrides;
use crate::output::{parse_key_val, print_outcome};

#[derive(Args)]
pub struct GetArgs {
    /// Path relative to the API version (e.g. users/me/) or a full URL
    pub path: String,

    /// Extra or replacement header, KEY=VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,
}

#[derive(Args)]
pub struct BodyArgs {
    /// Path relative to the API version (e.g. users/me/) or a full URL
    pub path: String,

    /// JSON object sent as the request body
    #[arg(short, long, default_value = "{}")]
    pub data: String,

    /// Extra or replacement header, KEY=VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,
}

impl BodyArgs {
    fn payload(&self) -> Result<Payload> {
        let map: Map<String, Value> = serde_json::from_str(&self.data)
            .with_context(|| format!("--data must be a JSON object, got {:?}", self.data))?;
        Ok(Payload::raw(map))
    }
}

pub async fn get(args: &GetArgs, client: &Client) -> Result<()> {
    let outcome = client
        .get::<Value>(&args.path, header_overrides(&args.headers))
        .await;
    print_outcome(outcome)
}

pub async fn post(args: &BodyArgs, client: &Client) -> Result<()> {
    let outcome = client
        .post::<Value, _>(&args.path, header_overrides(&args.headers), args.payload()?)
        .await;
    print_outcome(outcome)
}

pub async fn put(args: &BodyArgs, client: &Client) -> Result<()> {
    let outcome = client
        .put::<Value, _>(&args.path, header_overrides(&args.headers), args.payload()?)
        .await;
    print_outcome(outcome)
}

pub async fn delete(args: &BodyArgs, client: &Client) -> Result<()> {
    let outcome = client
        .delete::<Value, _>(&args.path, header_overrides(&args.headers), args.payload()?)
        .await;
    print_outcome(outcome)
}
