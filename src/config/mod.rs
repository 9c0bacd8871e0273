pub mod agents;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{FeederError, FeederResult};
use crate::sources::browser::DEFAULT_WEBDRIVER_URL;

pub use agents::{AgentConfig, SourceConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_api_url: String,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub data_dir: PathBuf,
    pub interval: Duration,
    pub send_delay: Duration,
    pub http_timeout: Duration,
    pub agents_file: Option<PathBuf>,
    pub webdriver_url: String,
}

/// Bot token and destination chat, both needed to actually send
#[derive(Debug, Clone)]
pub struct TelegramCredentials {
    pub token: String,
    pub chat_id: String,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn from_env() -> FeederResult<Self> {
        let exe_dir = Self::exe_dir();

        // Try to load .env from executable's directory first
        if let Some(ref dir) = exe_dir {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();

        // State files live next to the executable unless told otherwise
        let data_dir = std::env::var("NEWSWATCH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| exe_dir.unwrap_or_else(|| PathBuf::from(".")));

        Ok(Self {
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| channels::DEFAULT_API_URL.to_string()),
            telegram_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
            data_dir,
            interval: Duration::from_secs(parse_var("NEWSWATCH_INTERVAL_SECS", 300)?),
            send_delay: Duration::from_secs(parse_var("NEWSWATCH_SEND_DELAY_SECS", 5)?),
            http_timeout: Duration::from_secs(parse_var("NEWSWATCH_HTTP_TIMEOUT_SECS", 30)?),
            agents_file: non_empty_var("NEWSWATCH_AGENTS_FILE").map(PathBuf::from),
            webdriver_url: std::env::var("WEBDRIVER_URL")
                .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string()),
        })
    }

    pub fn telegram_credentials(&self) -> FeederResult<TelegramCredentials> {
        let token = self
            .telegram_token
            .clone()
            .ok_or_else(|| FeederError::MissingEnvVar("TELEGRAM_BOT_TOKEN".to_string()))?;
        let chat_id = self
            .telegram_chat_id
            .clone()
            .ok_or_else(|| FeederError::MissingEnvVar("TELEGRAM_CHAT_ID".to_string()))?;

        Ok(TelegramCredentials { token, chat_id })
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.data_dir.join("logs.json")
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &str, default: T) -> FeederResult<T> {
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| FeederError::Config(format!("{} must be a number, got {:?}", name, raw))),
        None => Ok(default),
    }
}
