//! CLI entry point for wikiclient.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use tracing::{debug, info};
use wikiclient_core::{ApiClient, ClientConfig, Params};

mod app_config;
mod cli;

use app_config::{FileConfig, load_default_file_config};
use cli::{CallArgs, Cli, Command, LoginArgs};

/// Environment variable the login password is read from.
const PASSWORD_ENV: &str = "WIKICLIENT_PASSWORD";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?cli, "CLI arguments parsed");

    let file_config = load_default_file_config()?.unwrap_or_default();
    let client = build_client(cli.api_url.as_deref(), &file_config)?;

    match cli.command {
        Command::Call(args) => run_call(&client, args).await,
        Command::Login(args) => run_login(&client, args, &file_config).await,
    }
}

fn build_client(api_url_flag: Option<&str>, file_config: &FileConfig) -> Result<ApiClient> {
    let api_url = api_url_flag
        .or(file_config.api_url.as_deref())
        .ok_or_else(|| anyhow!("No API URL given. Pass --api-url or set `api_url` in the config file."))?;

    let mut config = ClientConfig::new(api_url)?;
    if let Some(user_agent) = &file_config.user_agent {
        config = config.with_user_agent(user_agent.as_str());
    }
    let connect = file_config
        .connect_timeout_secs
        .map_or(config.connect_timeout, Duration::from_secs);
    let read = file_config
        .read_timeout_secs
        .map_or(config.read_timeout, Duration::from_secs);
    config = config.with_timeouts(connect, read);

    Ok(ApiClient::new(config)?)
}

async fn run_call(client: &ApiClient, args: CallArgs) -> Result<()> {
    let params: Params = args.params.into_iter().collect();
    let reply = if args.post {
        client.post(params).await?
    } else {
        client.get(params).await?
    };

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn run_login(client: &ApiClient, args: LoginArgs, file_config: &FileConfig) -> Result<()> {
    let Some(username) = args.username.or_else(|| file_config.username.clone()) else {
        bail!("No username given. Pass --username or set `username` in the config file.");
    };
    let password = std::env::var(PASSWORD_ENV)
        .with_context(|| format!("Set {PASSWORD_ENV} to the account password"))?;

    let identity = client.login(&username, &password).await?;
    println!("{} (id {})", identity.user_name, identity.user_id);

    client.logout().await?;
    info!("Session closed");
    Ok(())
}
