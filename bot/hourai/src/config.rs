use serde::Deserialize;
use std::{
    env,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

const DEFAULT_ENV: &str = "dev";
const DEFAULT_PREFIX: &str = "!";
const TOKEN_ENV_VAR: &str = "HOURAI_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct HouraiConfig {
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cloner: ClonerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    pub proxy: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MetricsConfig {
    pub port: Option<u16>,
}

/// Tunables for a single cloning run.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClonerConfig {
    pub role_delay_ms: u64,
    pub emoji_delay_ms: u64,
    pub icon_size: u16,
    pub confirmation_timeout_secs: u64,
    pub audit_reason: String,
}

impl ClonerConfig {
    pub fn role_delay(&self) -> Duration {
        Duration::from_millis(self.role_delay_ms)
    }

    pub fn emoji_delay(&self) -> Duration {
        Duration::from_millis(self.emoji_delay_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

impl Default for ClonerConfig {
    fn default() -> Self {
        Self {
            role_delay_ms: 200,
            emoji_delay_ms: 2000,
            icon_size: 1024,
            confirmation_timeout_secs: 60,
            audit_reason: String::from("Server clone"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open JSON config at {:?}: {}", .0, .1)]
    Open(PathBuf, std::io::Error),
    #[error("Failed to parse JSON config: {}", .0)]
    Parse(#[from] simd_json::Error),
    #[error("No bot token configured. Set discord.bot_token or {}", TOKEN_ENV_VAR)]
    MissingToken,
}

fn default_prefix() -> String {
    String::from(DEFAULT_PREFIX)
}

/// Loads the config for the bot from the given path. The bot token may be
/// overridden by the `HOURAI_TOKEN` environment variable.
pub fn load_config(path: &Path) -> Result<HouraiConfig, ConfigError> {
    let file = File::open(path).map_err(|err| ConfigError::Open(path.to_owned(), err))?;
    let reader = BufReader::new(file);
    let mut config: HouraiConfig = simd_json::serde::from_reader(reader)?;

    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        config.discord.bot_token = token;
    }
    if config.discord.bot_token.trim().is_empty() {
        return Err(ConfigError::MissingToken);
    }
    Ok(config)
}

/// Resolves the config path: `HOURAI_CONFIG` if set, otherwise
/// `/etc/hourai/<HOURAI_ENV>`.
pub fn get_config_path() -> Box<Path> {
    if let Ok(path) = env::var("HOURAI_CONFIG") {
        return PathBuf::from(path).into_boxed_path();
    }
    let mut buffer: PathBuf = ["/etc", "hourai"].iter().collect();
    buffer.push(get_environment());
    buffer.into_boxed_path()
}

fn get_environment() -> String {
    env::var("HOURAI_ENV")
        .unwrap_or_else(|_| String::from(DEFAULT_ENV))
        .to_lowercase()
}
