use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The discovery page could not be retrieved; nothing can be harvested.
    #[error("Could not fetch discovery page: {0}")]
    Discovery(String),

    /// A category page could not be retrieved after exhausting retries.
    #[error("Could not fetch {slug}: {reason}")]
    Fetch { slug: String, reason: String },
}

impl ScraperError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ScraperError::Fetch { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
