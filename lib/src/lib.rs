//! Telegram Bot API bindings for Rust
//! Provides a blocking client that pushes text messages to a chat

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid bot token")]
    InvalidToken,
    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("Telegram API error {code}: {description}")]
    Api { code: u16, description: String },
}

/// Markup dialect Telegram uses to render the message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: ParseMode,
    disable_web_page_preview: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

pub struct ChannelClient {
    url: String,
    client: Client,
}

impl ChannelClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, ChannelError> {
        let token = token.trim();
        if token.is_empty() || token.contains('/') || token.contains(char::is_whitespace) {
            return Err(ChannelError::InvalidToken);
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            client,
        })
    }

    /// Send a text message to a chat
    pub fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: ParseMode,
    ) -> Result<Message, ChannelError> {
        let payload = SendMessagePayload {
            chat_id,
            text,
            parse_mode,
            disable_web_page_preview: false,
        };

        let response = self
            .client
            .post(format!("{}/sendMessage", self.url))
            .json(&payload)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        parse_response(status, &body)
    }
}

/// Interpret a Bot API reply; anything but a 2xx with `"ok": true` is an error
fn parse_response<T: for<'de> Deserialize<'de>>(
    status: StatusCode,
    body: &str,
) -> Result<T, ChannelError> {
    let parsed: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return Err(ChannelError::Api {
                code: status.as_u16(),
                description: body.chars().take(200).collect(),
            })
        }
    };

    if status.is_success() && parsed.ok {
        if let Some(result) = parsed.result {
            return Ok(result);
        }
    }

    let code = parsed.error_code.unwrap_or(status.as_u16());
    if code == StatusCode::TOO_MANY_REQUESTS.as_u16() {
        let retry_after = parsed
            .parameters
            .and_then(|p| p.retry_after)
            .unwrap_or_default();
        return Err(ChannelError::RateLimited { retry_after });
    }

    Err(ChannelError::Api {
        code,
        description: parsed
            .description
            .unwrap_or_else(|| "missing result".to_string()),
    })
}
