use std::pin::Pin;
use std::sync::{Arc, Mutex};

use claude_agent::{ClaudeOptions, Message};
use futures::{Stream, StreamExt};
use toolsubmit_core::{Channel, ChannelEvent};

/// Built-in Claude tools. Metadata generation only needs the prompt text, so
/// every one of them is denied.
const DENIED_TOOLS: &[&str] = &[
    "Bash",
    "Edit",
    "Write",
    "Read",
    "Glob",
    "Grep",
    "NotebookEdit",
    "WebFetch",
    "WebSearch",
    "Task",
    "TodoWrite",
];

const SYSTEM_PROMPT: &str = "You write concise, accurate catalogue entries for open-source \
developer tools. You answer with a single JSON object and nothing else.";

// ---------------------------------------------------------------------------
// ClaudeChannel
// ---------------------------------------------------------------------------

/// A [`Channel`] backed by the Claude CLI.
///
/// Each `send` runs one `claude` subprocess. The session id from the first
/// exchange is resumed by later ones, so a repair request sees the
/// conversation that produced the answer being repaired.
pub struct ClaudeChannel {
    opts: ClaudeOptions,
    session_id: Arc<Mutex<Option<String>>>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl ClaudeChannel {
    pub fn new(opts: ClaudeOptions) -> Self {
        Self {
            opts,
            session_id: Arc::new(Mutex::new(None)),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Single-turn, tool-less options for the given executable and model.
    pub fn options(
        exe: String,
        model: Option<String>,
        cwd: std::path::PathBuf,
        debug: bool,
    ) -> ClaudeOptions {
        ClaudeOptions {
            executable: exe,
            model,
            max_turns: Some(1),
            disallowed_tools: DENIED_TOOLS.iter().map(|t| t.to_string()).collect(),
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            cwd: Some(cwd),
            partial_messages: true,
            debug,
            ..Default::default()
        }
    }

    /// The most recent transport failure (spawn, I/O, parse or exit), if any.
    /// Error results reported by the model are not recorded here.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }
}

impl Channel for ClaudeChannel {
    type Events = Pin<Box<dyn Stream<Item = ChannelEvent> + Send>>;

    fn send(&mut self, prompt: &str) -> Self::Events {
        let mut opts = self.opts.clone();
        opts.resume = self.session_id.lock().ok().and_then(|s| s.clone());

        let session_id = Arc::clone(&self.session_id);
        let last_error = Arc::clone(&self.last_error);

        let events = claude_agent::query(prompt, opts).flat_map(move |msg| {
            match &msg {
                Ok(m) => {
                    if let Ok(mut sid) = session_id.lock() {
                        if sid.is_none() && !m.session_id().is_empty() {
                            *sid = Some(m.session_id().to_string());
                        }
                    }
                }
                // Only transport failures count; an error result is the model's answer.
                Err(e) => {
                    if let Ok(mut last) = last_error.lock() {
                        *last = Some(e.to_string());
                    }
                }
            }
            futures::stream::iter(translate(msg))
        });

        Box::pin(events)
    }
}

/// Map one stream-json message onto channel events.
fn translate(msg: claude_agent::Result<Message>) -> Vec<ChannelEvent> {
    match msg {
        Err(e) => vec![ChannelEvent::Error(e.to_string())],
        Ok(Message::System(sys)) => {
            if sys.is_init() {
                tracing::debug!(
                    model = sys.model.as_deref().unwrap_or("-"),
                    session = %sys.session_id,
                    tools = sys.tools.len(),
                    permission_mode = sys.permission_mode.as_deref().unwrap_or("-"),
                    "claude session started"
                );
            }
            vec![]
        }
        Ok(m @ Message::StreamEvent(_)) => match m.text_delta() {
            Some(text) => vec![ChannelEvent::Delta(text.to_string())],
            None => vec![],
        },
        Ok(Message::Assistant(asst)) => match asst.text() {
            Some(text) => vec![ChannelEvent::Message(text)],
            None => vec![],
        },
        Ok(Message::Result(r)) => {
            tracing::debug!(
                subtype = ?r.subtype,
                turns = r.num_turns,
                cost_usd = r.total_cost_usd,
                "claude exchange finished"
            );
            match r.text() {
                Some(text) => vec![ChannelEvent::Message(text.to_string()), ChannelEvent::Idle],
                None => vec![ChannelEvent::Error(
                    r.error_summary()
                        .unwrap_or_else(|| "claude returned an error".into()),
                )],
            }
        }
    }
}
