//! Turn README text into a validated [`ToolMetadata`] by asking an AI session.
//!
//! The AI's reply is treated as untrusted text: the JSON object is cut out of
//! whatever prose surrounds it, projected onto the four fields we care about,
//! normalized and validated. An invalid record gets exactly one repair
//! round-trip, and anything still missing or out of bounds afterwards is
//! replaced by a deterministic default derived from the repository name.

use serde_json::{Map, Value};

use crate::channel::{ask, Channel};
use crate::metadata::{
    ToolMetadata, Violation, DEFAULT_TAGS, MAX_TAGLINE_CHARS, MAX_TAGS, MIN_TAGS,
};

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// Ask `channel` for metadata describing the repository.
///
/// Returns `None` only when the first reply contains no recoverable JSON
/// object. Every other failure (a bad repair, missing fields, an oversized
/// tagline) is absorbed by the fallbacks, so a `Some` is always usable.
pub async fn extract_metadata<C: Channel>(
    channel: &mut C,
    readme: &str,
    repo_name: &str,
) -> Option<ToolMetadata> {
    let prompt = build_prompt(readme, repo_name);
    tracing::debug!(repo = repo_name, prompt_chars = prompt.len(), "requesting metadata");
    let reply = ask(channel, &prompt).await;

    let Some(mut meta) = parse_reply(&reply) else {
        tracing::warn!(reply_chars = reply.len(), "no JSON object in AI reply");
        return None;
    };
    meta.normalize();

    let violations = meta.violations();
    if !violations.is_empty() {
        tracing::info!(count = violations.len(), "metadata failed validation, requesting repair");
        let repair = build_repair_prompt(&meta, &violations);
        let reply = ask(channel, &repair).await;

        match parse_reply(&reply) {
            Some(mut repaired) => {
                repaired.normalize();
                let remaining = repaired.violations();
                if remaining.is_empty() {
                    meta = repaired;
                } else {
                    tracing::warn!(
                        violations = %join_violations(&remaining),
                        "repaired metadata still invalid; keeping original"
                    );
                }
            }
            None => tracing::warn!("repair reply contained no JSON object; keeping original"),
        }
    }

    apply_fallbacks(&mut meta, repo_name);
    meta.normalize();
    Some(meta)
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

pub fn build_prompt(readme: &str, repo_name: &str) -> String {
    // Braces in the JSON schema must be doubled to escape Rust's format! macro.
    format!(
        r#"You are cataloguing open-source developer tools. Read the README below and describe the project.

Output ONLY a raw JSON object with exactly this shape:
{{
  "name": "string",
  "tagline": "string",
  "description": "string",
  "tags": ["string", "string", "string"]
}}

RULES:
- name: the project's own name exactly as the README states it. Do not invent or embellish a name.
- tagline: one line, at most {MAX_TAGLINE_CHARS} characters.
- description: 2 to 4 sentences explaining what the tool does and who it is for.
- tags: {MIN_TAGS} to {MAX_TAGS} relevant tags, all lowercase, no duplicates.

Repository name: {repo_name}

README:
---
{readme}
---
"#
    )
}

pub fn build_repair_prompt(meta: &ToolMetadata, violations: &[Violation]) -> String {
    let problems: String = violations.iter().map(|v| format!("- {v}\n")).collect();
    let current = serde_json::to_string_pretty(&meta.snapshot_json())
        .unwrap_or_else(|_| meta.snapshot_json().to_string());

    format!(
        r#"The JSON you returned does not meet the requirements:
{problems}
Your previous answer:
{current}

Return ONLY the corrected JSON object with the same fields (name, tagline, description, tags).
The tagline must be at most {MAX_TAGLINE_CHARS} characters, the description 2 to 4 sentences, and there must be {MIN_TAGS} to {MAX_TAGS} distinct lowercase tags.
"#
    )
}

// ---------------------------------------------------------------------------
// Reply parsing
// ---------------------------------------------------------------------------

/// Cut the outermost `{ ... }` out of `raw` and project it onto the
/// AI-derived fields. Falls back to parsing the whole text when there is no
/// such pair. The result is not normalized.
pub fn parse_reply(raw: &str) -> Option<ToolMetadata> {
    let candidate = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => raw,
    };
    let value: Value = serde_json::from_str(candidate).ok()?;
    let obj = value.as_object()?;

    Some(ToolMetadata {
        name: text_field(obj, "name"),
        tagline: text_field(obj, "tagline"),
        description: text_field(obj, "description"),
        tags: tags_field(obj),
        ..Default::default()
    })
}

/// Look up `key`, preferring an exact match, then any ASCII case-insensitive one.
pub fn get_ci<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).or_else(|| {
        obj.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    get_ci(obj, key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn tags_field(obj: &Map<String, Value>) -> String {
    match get_ci(obj, "tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// Replace each missing or out-of-bounds AI-derived field with a default
/// built from `repo_name`. Fields are handled independently.
pub fn apply_fallbacks(meta: &mut ToolMetadata, repo_name: &str) {
    if meta.name.trim().is_empty() {
        meta.name = repo_name.to_string();
    }

    if meta.tagline.trim().is_empty() {
        meta.tagline = format!("{repo_name} helps developers get more done from the command line.");
    }
    if meta.tagline.chars().count() > MAX_TAGLINE_CHARS {
        let cut: String = meta.tagline.chars().take(MAX_TAGLINE_CHARS).collect();
        meta.tagline = cut.trim_end().to_string();
    }

    if meta.description.trim().is_empty() {
        meta.description = format!(
            "{repo_name} is an open-source developer tool. \
             See the project README for installation and usage details."
        );
    }

    let count = meta.tag_list().len();
    if !(MIN_TAGS..=MAX_TAGS).contains(&count) {
        meta.tags = DEFAULT_TAGS.to_string();
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
