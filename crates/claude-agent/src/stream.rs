use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::process::ClaudeProcess;
use crate::types::{ClaudeOptions, Message};
use crate::Result;

const BUFFER: usize = 32;

// ─── QueryStream ──────────────────────────────────────────────────────────

/// Messages from one CLI exchange, in arrival order.
///
/// A background task owns the subprocess and forwards each message through
/// an mpsc channel. The stream ends after the `result` message. If the
/// process exits without one, the last item is the exit error. Dropping the
/// stream stops the forwarding task and kills the child.
pub struct QueryStream {
    rx: mpsc::Receiver<Result<Message>>,
}

impl QueryStream {
    pub(crate) fn spawn(prompt: String, opts: ClaudeOptions) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER);
        tokio::spawn(async move {
            match ClaudeProcess::start(&prompt, &opts).await {
                Ok(process) => pump(process, tx).await,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                }
            }
        });
        Self { rx }
    }
}

/// Forward messages until the result arrives, the output ends, or nobody is
/// listening any more.
async fn pump(mut process: ClaudeProcess, tx: mpsc::Sender<Result<Message>>) {
    let ended_cleanly = loop {
        match process.next_message().await {
            Ok(Some(msg)) => {
                let terminal = matches!(msg, Message::Result(_));
                if tx.send(Ok(msg)).await.is_err() || terminal {
                    break true;
                }
            }
            Ok(None) => break false,
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break true;
            }
        }
    };

    if !ended_cleanly {
        if let Err(e) = process.finish().await {
            let _ = tx.send(Err(e)).await;
        }
    }
    process.kill().await;
}

impl Stream for QueryStream {
    type Item = Result<Message>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
