//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// Talk to a wiki's JSON API from the command line.
#[derive(Parser, Debug)]
#[command(name = "wikiclient")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API endpoint, e.g. https://en.wikipedia.org/w/api.php (overrides config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one API call and print the JSON reply
    Call(CallArgs),
    /// Log in with WIKICLIENT_PASSWORD, print the account, then log out
    Login(LoginArgs),
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Send as a form-encoded POST instead of GET
    #[arg(long)]
    pub post: bool,

    /// Parameters as KEY=VALUE pairs
    #[arg(value_parser = parse_key_value, required = true)]
    pub params: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account name (overrides config file)
    #[arg(short, long)]
    pub username: Option<String>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
