use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use toolsubmit_core::config::Config;
use toolsubmit_core::{detect, issue_url, SubmitError, ToolMetadata};

use crate::channel::ClaudeChannel;
use crate::{output, prompt, Cli};

const DEFAULT_CLI: &str = "claude";

#[derive(Serialize)]
struct Submission<'a> {
    metadata: &'a ToolMetadata,
    url: &'a str,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    let interactive = !cli.headless;

    // ---------------------------------------------------------------------------
    // Setup
    // ---------------------------------------------------------------------------

    let dir = match cli.path.clone() {
        Some(p) => p,
        None if interactive => prompt::ask_directory()?,
        None => PathBuf::from("."),
    };
    if !dir.is_dir() {
        return Err(SubmitError::DirectoryNotFound(dir).into());
    }
    let dir = dir.canonicalize()?;
    let repo_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tool".to_string());

    let readme = resolve_readme(&dir, cli.readme.as_deref(), interactive)?;
    tracing::debug!(readme = %readme.display(), "using README");

    let exe = cli
        .cli_path
        .clone()
        .or_else(|| config.cli_path.clone())
        .unwrap_or_else(|| DEFAULT_CLI.to_string());
    let exe_path = which::which(&exe).map_err(|_| SubmitError::AiCliNotFound(exe.clone()))?;
    tracing::debug!(cli = %exe_path.display(), "resolved AI CLI");

    let text = detect::read_readme(&readme, config.readme_max_chars)
        .with_context(|| format!("failed to read {}", readme.display()))?;

    // ---------------------------------------------------------------------------
    // Extraction
    // ---------------------------------------------------------------------------

    let model = cli.model.clone().or_else(|| config.model.clone());
    let opts = ClaudeChannel::options(
        exe_path.to_string_lossy().into_owned(),
        model,
        dir.clone(),
        cli.verbose,
    );
    let mut channel = ClaudeChannel::new(opts);

    let rt = tokio::runtime::Runtime::new()?;
    let spinner = interactive.then(|| output::spinner("Generating metadata from README"));
    let extracted = rt.block_on(toolsubmit_core::extract_metadata(
        &mut channel,
        &text,
        &repo_name,
    ));
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let mut meta = match extracted {
        Some(m) => m,
        None => {
            return Err(match channel.last_error() {
                Some(e) => SubmitError::ConnectionLost(e),
                None => SubmitError::MetadataFailed,
            }
            .into())
        }
    };

    enrich(&mut meta, &dir);

    meta.theme = match cli.theme.or(config.theme) {
        Some(t) => Some(t),
        None if interactive => prompt::choose_theme()?,
        None => None,
    };

    // ---------------------------------------------------------------------------
    // Review and submit
    // ---------------------------------------------------------------------------

    if interactive {
        output::print_metadata(&meta);
        println!();
        prompt::edit_loop(&mut meta)?;
    }

    let url = issue_url::build_issue_url(&config.issue_url, &config.issue_template, &meta)?;

    if cli.json {
        output::print_json(&Submission {
            metadata: &meta,
            url: &url,
        })?;
    } else {
        println!("{url}");
    }

    if interactive && !cli.no_open && prompt::confirm_open()? {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
            eprintln!("Could not open a browser; copy the URL above.");
        }
    }
    Ok(())
}

fn resolve_readme(dir: &Path, explicit: Option<&Path>, interactive: bool) -> Result<PathBuf> {
    if let Some(p) = explicit {
        let p = if p.is_absolute() { p.to_path_buf() } else { dir.join(p) };
        if !p.is_file() {
            return Err(SubmitError::ReadmeNotFound(p).into());
        }
        return Ok(p);
    }
    if let Some(found) = detect::find_readme(dir) {
        return Ok(found);
    }
    if !interactive {
        return Err(SubmitError::ReadmeNotFound(dir.to_path_buf()).into());
    }
    match prompt::ask_readme(dir)? {
        Some(p) if p.is_file() => Ok(p),
        Some(p) => Err(SubmitError::ReadmeNotFound(p).into()),
        None => Err(SubmitError::ReadmeNotFound(dir.to_path_buf()).into()),
    }
}

/// Fill in the fields the AI is not asked about from the local checkout.
fn enrich(meta: &mut ToolMetadata, dir: &Path) {
    if meta.github_url.is_empty() {
        meta.github_url = detect::detect_github_url(dir).unwrap_or_default();
    }
    if meta.language.is_none() {
        meta.language = detect::detect_language(dir);
    }
    if meta.license.is_none() {
        meta.license = detect::detect_license(dir);
    }
    if meta.website_url.is_none() {
        meta.website_url = detect::detect_website(dir);
    }

    let handle = detect::github_username(Some(meta.github_url.as_str()).filter(|u| !u.is_empty()));
    if meta.author_handle.is_empty() {
        meta.author_handle = handle.clone().unwrap_or_default();
    }
    if meta.author_name.is_empty() {
        meta.author_name = detect::detect_git_user_name(dir)
            .or(handle)
            .unwrap_or_default();
    }
    tracing::debug!(
        github = %meta.github_url,
        language = ?meta.language,
        license = ?meta.license,
        "enriched metadata from repository"
    );
}
