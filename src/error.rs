use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Network failure, timeout or non-success status reaching the API.
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body was neither a bare array nor a known wrapper object.
    #[error("failed to parse as array or object - first 500 chars of response: {snippet}")]
    Parse { snippet: String },

    /// Well-formed response with no qualifying records.
    #[error("no active markets in response")]
    EmptyResult,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Short label shown in the error view title.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Transport(e) if e.is_timeout() => "timeout",
            AppError::Transport(_) => "transport",
            AppError::Parse { .. } => "parse",
            AppError::EmptyResult => "empty",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}
