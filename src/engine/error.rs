use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeedTestError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no app script reference found in the page at {0}")]
    ScriptNotFound(String),

    #[error("no API token found in the script at {0}")]
    TokenNotFound(String),

    #[error("failed to parse the URL list response: {0}")]
    UrlList(#[from] serde_json::Error),
}
