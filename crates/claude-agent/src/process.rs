use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::types::{ClaudeOptions, Message, MODELLED_TYPES};
use crate::{ClaudeAgentError, Result};

/// How long to wait for stderr to drain once the child has exited.
const STDERR_GRACE: Duration = Duration::from_secs(2);

// ─── ClaudeProcess ────────────────────────────────────────────────────────

/// One running CLI exchange: the prompt goes in on stdin as a single
/// stream-json user message, JSONL comes back on stdout.
pub(crate) struct ClaudeProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr: Option<JoinHandle<String>>,
}

impl ClaudeProcess {
    /// Launch the CLI and hand it `prompt`. Stdin is closed afterwards, which
    /// tells the CLI no further turns are coming.
    pub(crate) async fn start(prompt: &str, opts: &ClaudeOptions) -> Result<Self> {
        let mut cmd = Command::new(&opts.executable);
        cmd.args(command_args(opts))
            // Lets a nested run work from inside another CLI session.
            .env_remove("CLAUDECODE");
        if let Some(cwd) = &opts.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!(
            exe = %opts.executable,
            resume = opts.resume.as_deref().unwrap_or("-"),
            prompt_chars = prompt.chars().count(),
            "starting AI CLI"
        );

        let mut process = Self::from_command(cmd).map_err(|source| ClaudeAgentError::Spawn {
            exe: opts.executable.clone(),
            source,
        })?;
        process.write_prompt(prompt).await?;
        Ok(process)
    }

    pub(crate) fn from_command(mut cmd: Command) -> std::io::Result<Self> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout not captured")
        })?;
        let stderr = child.stderr.take().map(|pipe| {
            tokio::spawn(async move {
                let mut collected = Vec::new();
                let mut lines = BufReader::new(pipe).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    collected.push(line);
                }
                collected.join("\n")
            })
        });

        Ok(Self {
            stdin: child.stdin.take(),
            stdout: BufReader::new(stdout).lines(),
            stderr,
            child,
        })
    }

    async fn write_prompt(&mut self, prompt: &str) -> Result<()> {
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };
        let user = serde_json::json!({
            "type": "user",
            "message": {
                "role": "user",
                "content": [{ "type": "text", "text": prompt }],
            },
        });
        let mut line = user.to_string().into_bytes();
        line.push(b'\n');
        stdin.write_all(&line).await?;
        stdin.flush().await?;
        Ok(())
    }

    /// The next modelled message, or `None` at end of output.
    pub(crate) async fn next_message(&mut self) -> Result<Option<Message>> {
        while let Some(line) = self.stdout.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parse_err = |source| ClaudeAgentError::Parse {
                line: line.to_string(),
                source,
            };
            let value: serde_json::Value = serde_json::from_str(line).map_err(parse_err)?;
            let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or_default();
            if !MODELLED_TYPES.contains(&kind) {
                tracing::trace!(kind, "skipping stream-json line");
                continue;
            }
            return serde_json::from_value(value).map(Some).map_err(parse_err);
        }
        Ok(None)
    }

    /// Reap the child. A non-zero exit becomes [`ClaudeAgentError::Exited`]
    /// carrying whatever the CLI wrote to stderr.
    pub(crate) async fn finish(&mut self) -> Result<()> {
        let status = self.child.wait().await?;
        if status.success() {
            return Ok(());
        }

        let stderr = match self.stderr.take() {
            Some(task) => match tokio::time::timeout(STDERR_GRACE, task).await {
                Ok(Ok(text)) => text,
                _ => String::new(),
            },
            None => String::new(),
        };
        let status = match status.code() {
            Some(code) => format!("code {code}"),
            None => "a signal".to_string(),
        };
        Err(ClaudeAgentError::Exited {
            status,
            stderr: if stderr.trim().is_empty() {
                "no error output".to_string()
            } else {
                stderr.trim().to_string()
            },
        })
    }

    pub(crate) async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}

// ─── Command line ─────────────────────────────────────────────────────────

/// CLI flags for `opts`. The prompt itself travels over stdin.
fn command_args(opts: &ClaudeOptions) -> Vec<String> {
    let mut args: Vec<String> = [
        "--print",
        "--output-format",
        "stream-json",
        "--input-format",
        "stream-json",
        "--verbose",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let mut flag = |name: &str, value: &str| {
        args.push(name.to_string());
        args.push(value.to_string());
    };
    if let Some(model) = &opts.model {
        flag("--model", model);
    }
    if let Some(turns) = opts.max_turns {
        flag("--max-turns", &turns.to_string());
    }
    if let Some(prompt) = &opts.system_prompt {
        flag("--system-prompt", prompt);
    }
    if let Some(session) = &opts.resume {
        flag("--resume", session);
    }

    if !opts.disallowed_tools.is_empty() {
        args.push("--disallowed-tools".to_string());
        args.extend(opts.disallowed_tools.iter().cloned());
    }
    if opts.partial_messages {
        args.push("--include-partial-messages".to_string());
    }
    if opts.debug {
        args.push("--debug".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_args_speak_stream_json_both_ways() {
        let args = command_args(&ClaudeOptions::default());
        assert_eq!(args[0], "--print");
        assert_eq!(args.iter().filter(|a| *a == "stream-json").count(), 2);
        assert!(!args.contains(&"--resume".to_string()));
        assert!(!args.contains(&"--disallowed-tools".to_string()));
    }

    #[test]
    fn options_become_flags() {
        let opts = ClaudeOptions {
            model: Some("claude-haiku-4-5".into()),
            max_turns: Some(1),
            disallowed_tools: vec!["Bash".into(), "Edit".into()],
            resume: Some("sess-1".into()),
            partial_messages: true,
            ..Default::default()
        };
        let args = command_args(&opts);
        let after = |f: &str| &args[args.iter().position(|a| a == f).unwrap() + 1];
        assert_eq!(after("--model"), "claude-haiku-4-5");
        assert_eq!(after("--max-turns"), "1");
        assert_eq!(after("--resume"), "sess-1");
        assert_eq!(after("--disallowed-tools"), "Bash");
        assert!(args.ends_with(&[
            "Bash".to_string(),
            "Edit".to_string(),
            "--include-partial-messages".to_string()
        ]));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let opts = ClaudeOptions {
            executable: "/nonexistent/claude-for-tests".into(),
            ..Default::default()
        };
        let err = ClaudeProcess::start("hi", &opts).await.err().unwrap();
        assert!(matches!(err, ClaudeAgentError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/claude-for-tests"));
    }
}
