mod commands;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use apihelper::{Client, ClientConfig, Connectivity, Environment, Region};
use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser)]
#[command(name = "apihelper")]
#[command(about = "Send requests to the app API and print the response envelope")]
struct Cli {
    /// Target environment: development, staging or production.
    /// Overrides APIHELPER_BASE_URL / APIHELPER_ENV.
    #[arg(long, global = true)]
    env: Option<Environment>,

    /// Probe the API host before sending and fail fast when it is unreachable
    #[arg(long, global = true)]
    probe: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(commands::request::GetArgs),
    /// Send a POST request with a JSON body
    Post(commands::request::BodyArgs),
    /// Send a PUT request with a JSON body
    Put(commands::request::BodyArgs),
    /// Send a DELETE request with a JSON body
    Delete(commands::request::BodyArgs),
    /// Send a multipart form with string fields and an optional image
    Upload(commands::upload::UploadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("apihelper=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.env {
        Some(environment) => {
            let token = std::env::var("APIHELPER_TOKEN").unwrap_or_default();
            ClientConfig::for_environment(environment, Region::current(), &token)
        }
        None => ClientConfig::from_env()?,
    };
    tracing::debug!("Using base URL {}", config.base_url());

    let connectivity = Connectivity::default();
    if cli.probe {
        probe(&connectivity, config.base_url()).await?;
    }
    let client = Client::new(config)?.with_reachability(connectivity);

    match &cli.command {
        Commands::Get(args) => commands::request::get(args, &client).await?,
        Commands::Post(args) => commands::request::post(args, &client).await?,
        Commands::Put(args) => commands::request::put(args, &client).await?,
        Commands::Delete(args) => commands::request::delete(args, &client).await?,
        Commands::Upload(args) => commands::upload::run(args, &client).await?,
    }

    Ok(())
}

async fn probe(connectivity: &Connectivity, base_url: &str) -> Result<()> {
    let url = Url::parse(base_url).with_context(|| format!("Invalid base URL {}", base_url))?;
    let host = url.host_str().context("Base URL has no host")?;
    let port = url.port_or_known_default().unwrap_or(443);
    if !connectivity.probe(host, port, Duration::from_secs(5)).await {
        tracing::warn!("{}:{} is not reachable", host, port);
    }
    Ok(())
}
