use serde::Serialize;
use std::fmt;

use crate::theme::Theme;

pub const MAX_TAGLINE_CHARS: usize = 100;
pub const MIN_TAGS: usize = 3;
pub const MAX_TAGS: usize = 6;
pub const DEFAULT_TAGS: &str = "cli, developer-tools, productivity";

// ---------------------------------------------------------------------------
// ToolMetadata
// ---------------------------------------------------------------------------

/// Everything the submission form needs to know about one tool.
///
/// `name`, `tagline`, `description` and `tags` come from the AI; the rest is
/// filled in from the local repository or by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolMetadata {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub github_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    pub author_name: String,
    pub author_handle: String,
    /// Comma-joined, e.g. `"cli, git, productivity"`.
    pub tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl ToolMetadata {
    /// Trim the text fields and canonicalize `tags`: lowercase, no blanks, no
    /// duplicates, first occurrence wins, joined with `", "`.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.tagline = self.tagline.trim().to_string();
        self.description = self.description.trim().to_string();
        self.tags = normalize_tags(&self.tags);
    }

    /// The individual tag entries, trimmed, blanks dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        split_tags(&self.tags).collect()
    }

    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        if self.name.trim().is_empty() {
            out.push(Violation::MissingName);
        }

        let tagline = self.tagline.trim();
        if tagline.is_empty() {
            out.push(Violation::MissingTagline);
        } else {
            let len = tagline.chars().count();
            if len > MAX_TAGLINE_CHARS {
                out.push(Violation::TaglineTooLong(len));
            }
        }

        if self.description.trim().is_empty() {
            out.push(Violation::MissingDescription);
        }

        let distinct = normalize_tags(&self.tags);
        let count = split_tags(&distinct).count();
        if !(MIN_TAGS..=MAX_TAGS).contains(&count) {
            out.push(Violation::TagCount(count));
        }

        for tag in self.tag_list() {
            if tag != tag.to_lowercase() {
                out.push(Violation::TagNotLowercase(tag.to_string()));
            }
        }

        out
    }

    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }

    /// The AI-derived fields as JSON, in the same shape the AI is asked to
    /// return.
    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "tagline": self.tagline,
            "description": self.description,
            "tags": self.tag_list(),
        })
    }
}

fn split_tags(tags: &str) -> impl Iterator<Item = &str> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn normalize_tags(tags: &str) -> String {
    let mut seen: Vec<String> = Vec::new();
    for tag in split_tags(tags) {
        let lower = tag.to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
        }
    }
    seen.join(", ")
}

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingName,
    MissingTagline,
    /// Carries the actual length in characters.
    TaglineTooLong(usize),
    MissingDescription,
    /// Carries the distinct tag count.
    TagCount(usize),
    TagNotLowercase(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingName => f.write_str("name is missing"),
            Violation::MissingTagline => f.write_str("tagline is missing"),
            Violation::TaglineTooLong(n) => write!(
                f,
                "tagline is {n} characters long; it must be at most {MAX_TAGLINE_CHARS}"
            ),
            Violation::MissingDescription => f.write_str("description is missing"),
            Violation::TagCount(n) => write!(
                f,
                "tags has {n} distinct entries; it must have between {MIN_TAGS} and {MAX_TAGS}"
            ),
            Violation::TagNotLowercase(tag) => write!(f, "tag '{tag}' is not lowercase"),
        }
    }
}
