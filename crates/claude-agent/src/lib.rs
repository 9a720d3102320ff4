//! `claude-agent`: drive the Claude CLI over its stream-json protocol.
//!
//! Each [`query`] is one exchange: a subprocess is started, the prompt is
//! written to its stdin as a user message, and the JSONL it prints is
//! decoded into [`Message`] values until the terminal `result` line.
//!
//! ```text
//! ClaudeOptions ─▶ ClaudeProcess ─▶ QueryStream ─▶ Message
//!                  (subprocess)     (mpsc-backed    (system / assistant /
//!                                    Stream)         result / stream_event)
//! ```
//!
//! ```rust,ignore
//! use claude_agent::{query, ClaudeOptions, Message};
//! use futures::StreamExt;
//!
//! let mut stream = query("Describe this README.", ClaudeOptions::default());
//! while let Some(msg) = stream.next().await {
//!     if let Message::Result(r) = msg? {
//!         println!("{}", r.text().unwrap_or_default());
//!     }
//! }
//! ```

pub mod error;
pub mod types;

pub(crate) mod process;
pub mod stream;


pub use error::ClaudeAgentError;
pub use stream::QueryStream;
pub use types::{
    AssistantBody, AssistantMessage, ClaudeOptions, ContentBlock, Message, PartialDelta,
    PartialEvent, ResultMessage, ResultSubtype, StreamEvent, SystemMessage,
};

pub type Result<T> = std::result::Result<T, ClaudeAgentError>;

/// Start one exchange with the CLI. Must be called inside a Tokio runtime.
pub fn query(prompt: impl Into<String>, opts: ClaudeOptions) -> QueryStream {
    QueryStream::spawn(prompt.into(), opts)
}
