use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("no README found in {}", .0.display())]
    ReadmeNotFound(PathBuf),

    #[error("AI CLI not found: '{0}' is not on PATH (install it or pass --cli-path)")]
    AiCliNotFound(String),

    #[error("lost connection to the AI CLI: {0}")]
    ConnectionLost(String),

    #[error("failed to generate metadata: the AI response contained no JSON object")]
    MetadataFailed,

    #[error("invalid theme '{0}': expected one of {1}")]
    InvalidTheme(String, String),

    #[error("invalid issue URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SubmitError>;
