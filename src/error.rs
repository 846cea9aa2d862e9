use thiserror::Error;

/// Everything that can go wrong inside the controller.
///
/// None of these reach the page: the controller's page-level operations log
/// them and leave the UI as it was.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("hash does not name a known tab: {0}")]
    MalformedHash(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NavError>;
