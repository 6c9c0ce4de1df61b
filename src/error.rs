use thiserror::Error;

/// Everything that can go wrong talking to the search API.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search API returned an error: {0}")]
    Api(String),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Short label used in the inline notice.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "network",
            GatewayError::Api(_) => "api",
            GatewayError::Decode(_) => "decode",
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
