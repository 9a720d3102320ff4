use serde::Deserialize;
use std::path::PathBuf;

// ─── Messages ─────────────────────────────────────────────────────────────

/// One line of `claude --output-format stream-json`, keyed on `"type"`.
///
/// Only the four types a single prompt/answer exchange needs are modelled.
/// Lines of any other type never reach this enum; the reader drops them.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    System(SystemMessage),
    Assistant(AssistantMessage),
    Result(ResultMessage),
    StreamEvent(StreamEvent),
}

/// The `"type"` values [`Message`] understands.
pub(crate) const MODELLED_TYPES: &[&str] = &["system", "assistant", "result", "stream_event"];

impl Message {
    pub fn session_id(&self) -> &str {
        match self {
            Message::System(m) => &m.session_id,
            Message::Assistant(m) => &m.session_id,
            Message::Result(m) => &m.session_id,
            Message::StreamEvent(m) => &m.session_id,
        }
    }

    /// Text carried by a partial `content_block_delta`.
    pub fn text_delta(&self) -> Option<&str> {
        match self {
            Message::StreamEvent(StreamEvent {
                event:
                    Some(PartialEvent::ContentBlockDelta {
                        delta: PartialDelta::TextDelta { text },
                        ..
                    }),
                ..
            }) => Some(text),
            _ => None,
        }
    }
}

// ─── system ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SystemMessage {
    pub subtype: String,
    pub session_id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Vec<String>,
    /// The CLI has emitted both spellings.
    #[serde(default, alias = "permissionMode")]
    pub permission_mode: Option<String>,
}

impl SystemMessage {
    pub fn is_init(&self) -> bool {
        self.subtype == "init"
    }
}

// ─── assistant ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    pub session_id: String,
    pub message: AssistantBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantBody {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    /// Tool use, thinking and anything newer.
    #[serde(other)]
    Other,
}

impl AssistantMessage {
    /// All text blocks joined, or `None` when there are none.
    pub fn text(&self) -> Option<String> {
        let mut out: Option<String> = None;
        for block in &self.message.content {
            if let ContentBlock::Text { text } = block {
                out.get_or_insert_with(String::new).push_str(text);
            }
        }
        out
    }
}

// ─── result ───────────────────────────────────────────────────────────────

/// The terminal line of every exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultMessage {
    pub subtype: ResultSubtype,
    pub session_id: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub num_turns: u32,
    #[serde(default)]
    pub total_cost_usd: f64,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSubtype {
    Success,
    ErrorDuringExecution,
    ErrorMaxTurns,
    ErrorMaxBudgetUsd,
    #[serde(other)]
    OtherError,
}

impl ResultMessage {
    pub fn is_error(&self) -> bool {
        self.is_error || self.subtype != ResultSubtype::Success
    }

    /// The answer text of a successful exchange.
    pub fn text(&self) -> Option<&str> {
        if self.is_error() {
            None
        } else {
            Some(self.result.as_deref().unwrap_or(""))
        }
    }

    pub fn error_summary(&self) -> Option<String> {
        if !self.is_error() {
            return None;
        }
        let kind = match self.subtype {
            ResultSubtype::Success => "failed",
            ResultSubtype::ErrorDuringExecution => "error during execution",
            ResultSubtype::ErrorMaxTurns => "reached max turns",
            ResultSubtype::ErrorMaxBudgetUsd => "reached max budget",
            ResultSubtype::OtherError => "error",
        };
        Some(if self.errors.is_empty() {
            kind.to_string()
        } else {
            format!("{kind}: {}", self.errors.join("; "))
        })
    }
}

// ─── stream_event ─────────────────────────────────────────────────────────

/// Only sent with `--include-partial-messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    pub session_id: String,
    #[serde(default)]
    pub event: Option<PartialEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartialEvent {
    ContentBlockDelta {
        #[serde(default)]
        index: u32,
        delta: PartialDelta,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartialDelta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

// ─── ClaudeOptions ────────────────────────────────────────────────────────

/// How to launch the CLI for one exchange.
#[derive(Debug, Clone)]
pub struct ClaudeOptions {
    /// Program to run; `claude` on `PATH` by default.
    pub executable: String,
    pub model: Option<String>,
    pub max_turns: Option<u32>,
    pub disallowed_tools: Vec<String>,
    pub system_prompt: Option<String>,
    /// Session to continue.
    pub resume: Option<String>,
    pub cwd: Option<PathBuf>,
    pub debug: bool,
    pub partial_messages: bool,
}

impl Default for ClaudeOptions {
    fn default() -> Self {
        Self {
            executable: "claude".to_string(),
            model: None,
            max_turns: None,
            disallowed_tools: Vec::new(),
            system_prompt: None,
            resume: None,
            cwd: None,
            debug: false,
            partial_messages: false,
        }
    }
}
