use anyhow::Result;
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, InquireError, Select, Text};
use std::fmt;
use std::path::{Path, PathBuf};
use toolsubmit_core::metadata::MAX_TAGLINE_CHARS;
use toolsubmit_core::{Theme, ToolMetadata};

use crate::output;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// The user backed out of a prompt (Esc or Ctrl-C). Not a failure.
#[derive(Debug)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cancelled")
    }
}

impl std::error::Error for Cancelled {}

fn answered<T>(r: std::result::Result<T, InquireError>) -> Result<T> {
    match r {
        Ok(v) => Ok(v),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            Err(Cancelled.into())
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Setup prompts
// ---------------------------------------------------------------------------

pub fn ask_directory() -> Result<PathBuf> {
    let dir = answered(
        Text::new("Repository directory:")
            .with_default(".")
            .prompt(),
    )?;
    Ok(PathBuf::from(dir.trim()))
}

pub fn ask_readme(dir: &Path) -> Result<Option<PathBuf>> {
    let msg = format!("No README found in {}. Path to README:", dir.display());
    let answer = answered(
        Text::new(&msg)
            .with_help_message("leave empty to give up")
            .prompt(),
    )?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(None);
    }
    let p = PathBuf::from(answer);
    Ok(Some(if p.is_absolute() { p } else { dir.join(p) }))
}

const NO_THEME: &str = "none";

pub fn choose_theme() -> Result<Option<Theme>> {
    let mut choices = vec![NO_THEME.to_string()];
    choices.extend(Theme::all().iter().map(|t| t.to_string()));
    let picked = answered(Select::new("Page theme:", choices).prompt())?;
    if picked == NO_THEME {
        return Ok(None);
    }
    Ok(picked.parse().ok())
}

pub fn confirm_open() -> Result<bool> {
    answered(
        Confirm::new("Open the submission form in your browser?")
            .with_default(true)
            .prompt(),
    )
}

// ---------------------------------------------------------------------------
// Field editing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Tagline,
    Description,
    GithubUrl,
    WebsiteUrl,
    AuthorName,
    AuthorHandle,
    Tags,
    Language,
    License,
    Theme,
}

impl Field {
    const ALL: [Field; 11] = [
        Field::Name,
        Field::Tagline,
        Field::Description,
        Field::GithubUrl,
        Field::WebsiteUrl,
        Field::AuthorName,
        Field::AuthorHandle,
        Field::Tags,
        Field::Language,
        Field::License,
        Field::Theme,
    ];

    fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Tagline => "Tagline",
            Field::Description => "Description",
            Field::GithubUrl => "GitHub URL",
            Field::WebsiteUrl => "Website URL",
            Field::AuthorName => "Author name",
            Field::AuthorHandle => "Author GitHub handle",
            Field::Tags => "Tags",
            Field::Language => "Language",
            Field::License => "License",
            Field::Theme => "Theme",
        }
    }

    fn required(self) -> bool {
        matches!(self, Field::Name | Field::Tagline | Field::Description | Field::Tags)
    }
}

type Check = std::result::Result<Validation, CustomUserError>;

const DONE: &str = "✔ done";

/// Loop over field edits until the user picks "done".
pub fn edit_loop(meta: &mut ToolMetadata) -> Result<()> {
    loop {
        let rows = output::metadata_rows(meta);
        let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        let mut labels: Vec<String> = vec![DONE.to_string()];
        labels.extend(
            rows.iter()
                .map(|(l, v)| format!("{l:width$}  {}", truncate(v, 60))),
        );

        let picked = answered(
            Select::new("Edit a field, or accept:", labels)
                .with_page_size(12)
                .raw_prompt(),
        )?;
        if picked.index == 0 {
            break;
        }
        edit_field(meta, Field::ALL[picked.index - 1])?;
    }

    for v in meta.violations() {
        eprintln!("warning: {v}");
    }
    Ok(())
}

fn edit_field(meta: &mut ToolMetadata, field: Field) -> Result<()> {
    if field == Field::Theme {
        meta.theme = choose_theme()?;
        return Ok(());
    }

    let current = current_value(meta, field);
    let label = format!("{}:", field.label());
    let mut prompt = Text::new(&label).with_initial_value(&current);

    if field.required() {
        prompt = prompt.with_validator(|s: &str| -> Check {
            if s.trim().is_empty() {
                Ok(Validation::Invalid("this field is required".into()))
            } else {
                Ok(Validation::Valid)
            }
        });
    }
    if field == Field::Tagline {
        prompt = prompt.with_validator(|s: &str| -> Check {
            if s.trim().chars().count() > MAX_TAGLINE_CHARS {
                Ok(Validation::Invalid(
                    format!("at most {MAX_TAGLINE_CHARS} characters").into(),
                ))
            } else {
                Ok(Validation::Valid)
            }
        });
    }
    if field == Field::Tags {
        prompt = prompt.with_help_message("comma-separated, 3 to 6 tags");
    }

    let value = answered(prompt.prompt())?;
    set_value(meta, field, value);
    Ok(())
}

fn current_value(meta: &ToolMetadata, field: Field) -> String {
    match field {
        Field::Name => meta.name.clone(),
        Field::Tagline => meta.tagline.clone(),
        Field::Description => meta.description.clone(),
        Field::GithubUrl => meta.github_url.clone(),
        Field::WebsiteUrl => meta.website_url.clone().unwrap_or_default(),
        Field::AuthorName => meta.author_name.clone(),
        Field::AuthorHandle => meta.author_handle.clone(),
        Field::Tags => meta.tags.clone(),
        Field::Language => meta.language.clone().unwrap_or_default(),
        Field::License => meta.license.clone().unwrap_or_default(),
        Field::Theme => meta.theme.map(|t| t.to_string()).unwrap_or_default(),
    }
}

fn set_value(meta: &mut ToolMetadata, field: Field, value: String) {
    let value = value.trim().to_string();
    let optional = |v: String| if v.is_empty() { None } else { Some(v) };
    match field {
        Field::Name => meta.name = value,
        Field::Tagline => meta.tagline = value,
        Field::Description => meta.description = value,
        Field::GithubUrl => meta.github_url = value,
        Field::WebsiteUrl => meta.website_url = optional(value),
        Field::AuthorName => meta.author_name = value,
        Field::AuthorHandle => meta.author_handle = value,
        Field::Tags => {
            meta.tags = value;
            meta.normalize();
        }
        Field::Language => meta.language = optional(value),
        Field::License => meta.license = optional(value),
        Field::Theme => meta.theme = value.parse().ok(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
