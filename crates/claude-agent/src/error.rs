use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaudeAgentError {
    #[error("failed to start '{exe}': {source}")]
    Spawn {
        exe: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error talking to the AI CLI: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable stream-json line: {source}\n  line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The process ended without a result message.
    #[error("AI CLI exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },
}
