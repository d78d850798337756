//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// File configuration for wikiclient defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// API endpoint URL.
    pub api_url: Option<String>,
    /// Account name used by `login`.
    pub username: Option<String>,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if let Some(api_url) = &self.api_url
            && api_url.trim().is_empty()
        {
            bail!("Invalid config value for `api_url`: must not be empty");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/wikiclient/config.toml`
/// 2. `$HOME/.config/wikiclient/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("wikiclient")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("wikiclient")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path; `None` when no file exists.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "api_url" => {
                cfg.api_url = Some(parse_string_literal(value).with_context(|| {
                    format!("Invalid `api_url` value on line {line_number}")
                })?);
            }
            "username" => {
                cfg.username = Some(parse_string_literal(value).with_context(|| {
                    format!("Invalid `username` value on line {line_number}")
                })?);
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).with_context(|| {
                    format!("Invalid `user_agent` value on line {line_number}")
                })?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(value.parse::<u64>().with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_number}")
                })?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(value.parse::<u64>().with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_number}")
                })?);
            }
            other => bail!("Unknown config key `{other}` on line {line_number}"),
        }
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Strips a `#` comment that is not inside a double-quoted string.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' if !escaped => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
        escaped = ch == '\\' && !escaped;
    }
    line
}

fn parse_string_literal(value: &str) -> Result<String> {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        bail!("expected a double-quoted string, got `{value}`");
    };
    Ok(inner.replace("\\\"", "\"").replace("\\\\", "\\"))
}
