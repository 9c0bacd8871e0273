use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeederError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Item errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid news item: {0}")]
    InvalidItem(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    // Headless browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    // Storage errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Channel errors from the Telegram library
    #[error("Channel error: {0}")]
    Channel(String),
}

impl From<channels::ChannelError> for FeederError {
    fn from(err: channels::ChannelError) -> Self {
        FeederError::Channel(err.to_string())
    }
}

pub type FeederResult<T> = Result<T, FeederError>;
