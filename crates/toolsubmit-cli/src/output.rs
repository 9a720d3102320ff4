use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;
use toolsubmit_core::ToolMetadata;

/// Values longer than this wrap onto continuation lines.
const VALUE_WIDTH: usize = 72;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Label and display value for every field of `meta`, in form order.
pub fn metadata_rows(meta: &ToolMetadata) -> Vec<(&'static str, String)> {
    fn shown(v: &str) -> String {
        if v.is_empty() {
            "-".to_string()
        } else {
            v.to_string()
        }
    }
    let opt = |v: &Option<String>| shown(v.as_deref().unwrap_or(""));
    let theme = meta.theme.map(|t| t.to_string()).unwrap_or_default();

    vec![
        ("name", shown(&meta.name)),
        ("tagline", shown(&meta.tagline)),
        ("description", shown(&meta.description)),
        ("github", shown(&meta.github_url)),
        ("website", opt(&meta.website_url)),
        ("author", shown(&meta.author_name)),
        ("handle", shown(&meta.author_handle)),
        ("tags", shown(&meta.tags)),
        ("language", opt(&meta.language)),
        ("license", opt(&meta.license)),
        ("theme", shown(&theme)),
    ]
}

/// Aligned `label  value` lines; long values wrap at word boundaries and
/// continue under the value column.
pub fn render_fields(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        for (i, line) in wrap(value, VALUE_WIDTH).iter().enumerate() {
            let head = if i == 0 { *label } else { "" };
            out.push_str(format!("{head:width$}  {line}").trim_end());
            out.push('\n');
        }
    }
    out
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = vec![String::new()];
    for word in text.split_whitespace() {
        let Some(current) = lines.last_mut() else {
            break;
        };
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(word.to_string());
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    lines
}

pub fn print_metadata(meta: &ToolMetadata) {
    print!("{}", render_fields(&metadata_rows(meta)));
}

/// A steady-ticking spinner on stderr.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
