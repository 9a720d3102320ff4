use futures::{Stream, StreamExt};

// ---------------------------------------------------------------------------
// ChannelEvent / Channel
// ---------------------------------------------------------------------------

/// One signal from an AI session while it answers a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A streamed fragment to append to the reply.
    Delta(String),
    /// The complete reply text; supersedes any fragments seen so far.
    Message(String),
    /// The session finished answering.
    Idle,
    /// The session failed. The attempt yields no text.
    Error(String),
}

/// A request/response handle onto an AI session.
///
/// Implementations own the session; callers borrow it for the duration of a
/// call and never close it.
pub trait Channel {
    type Events: Stream<Item = ChannelEvent> + Unpin;

    fn send(&mut self, prompt: &str) -> Self::Events;
}

/// Send `prompt` and wait for the complete reply.
///
/// Returns an empty string if the channel reports an error.
pub async fn ask<C: Channel>(channel: &mut C, prompt: &str) -> String {
    let mut events = channel.send(prompt);
    let mut reply = String::new();

    while let Some(event) = events.next().await {
        match event {
            ChannelEvent::Delta(text) => reply.push_str(&text),
            ChannelEvent::Message(text) => reply = text,
            ChannelEvent::Idle => break,
            ChannelEvent::Error(e) => {
                tracing::warn!(error = %e, partial_chars = reply.len(), "AI channel error");
                return String::new();
            }
        }
    }

    tracing::debug!(reply_chars = reply.chars().count(), "AI reply complete");
    reply
}

// ---------------------------------------------------------------------------
// Scripted channel (tests)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod scripted {
    use super::{Channel, ChannelEvent};
    use std::collections::VecDeque;

    /// Replays one pre-recorded event sequence per `send`, and records the
    /// prompts it was given. Sends past the end of the script get an error.
    #[derive(Default)]
    pub struct ScriptedChannel {
        script: VecDeque<Vec<ChannelEvent>>,
        pub prompts: Vec<String>,
    }

    impl ScriptedChannel {
        pub fn new(script: Vec<Vec<ChannelEvent>>) -> Self {
            Self {
                script: script.into(),
                prompts: Vec::new(),
            }
        }

        /// One exchange per reply, each delivered as a full message then idle.
        pub fn replying(replies: &[&str]) -> Self {
            Self::new(
                replies
                    .iter()
                    .map(|r| vec![ChannelEvent::Message(r.to_string()), ChannelEvent::Idle])
                    .collect(),
            )
        }
    }

    impl Channel for ScriptedChannel {
        type Events = futures::stream::Iter<std::vec::IntoIter<ChannelEvent>>;

        fn send(&mut self, prompt: &str) -> Self::Events {
            self.prompts.push(prompt.to_string());
            let events = self
                .script
                .pop_front()
                .unwrap_or_else(|| vec![ChannelEvent::Error("script exhausted".into())]);
            futures::stream::iter(events)
        }
    }
}
