//! Best-effort facts about a local repository.
//!
//! Every detector returns `None` when it cannot tell; none of them fail.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use walkdir::WalkDir;

use crate::error::Result;

pub const TRUNCATION_MARKER: &str = "\n\n[README truncated]";

/// Maximum directory depth searched by [`detect_language`].
const LANGUAGE_SCAN_DEPTH: usize = 6;

const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "vendor",
    "dist",
    "build",
    "__pycache__",
];

// ---------------------------------------------------------------------------
// README
// ---------------------------------------------------------------------------

const README_NAMES: &[&str] = &[
    "README.md",
    "README.markdown",
    "README.rst",
    "README.txt",
    "README",
];

pub fn find_readme(dir: &Path) -> Option<PathBuf> {
    for name in README_NAMES {
        let p = dir.join(name);
        if p.is_file() {
            return Some(p);
        }
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_ascii_lowercase().starts_with("readme"))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

/// Read a README, cutting it to `max_chars` characters and appending
/// [`TRUNCATION_MARKER`] when anything was dropped. Bytes that are not
/// UTF-8 become U+FFFD.
pub fn read_readme(path: &Path, max_chars: usize) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(truncate_readme(text, max_chars))
}

fn truncate_readme(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut out = text[..cut].to_string();
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

pub fn detect_github_url(dir: &Path) -> Option<String> {
    let remote = git(dir, &["remote", "get-url", "origin"])?;
    normalize_github_remote(&remote)
}

static GITHUB_REMOTE_RE: OnceLock<Regex> = OnceLock::new();

fn github_remote_re() -> &'static Regex {
    GITHUB_REMOTE_RE.get_or_init(|| {
        Regex::new(
            r"^(?:https?://(?:[^@/]+@)?|ssh://git@|git@)(?:www\.)?github\.com[:/]([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$",
        )
        .unwrap()
    })
}

/// `git@github.com:o/r.git`, `ssh://git@github.com/o/r` and
/// `https://user@github.com/o/r.git` all become `https://github.com/o/r`.
pub fn normalize_github_remote(remote: &str) -> Option<String> {
    let caps = github_remote_re().captures(remote.trim())?;
    Some(format!("https://github.com/{}/{}", &caps[1], &caps[2]))
}

pub fn detect_git_user_name(dir: &Path) -> Option<String> {
    git(dir, &["config", "user.name"])
}

/// The owner segment of a GitHub repository URL.
pub fn github_username(url: Option<&str>) -> Option<String> {
    let normalized = normalize_github_remote(url?)?;
    normalized
        .trim_start_matches("https://github.com/")
        .split('/')
        .next()
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// License
// ---------------------------------------------------------------------------

const LICENSE_NAMES: &[&str] = &[
    "LICENSE",
    "LICENSE.md",
    "LICENSE.txt",
    "LICENCE",
    "LICENCE.md",
    "COPYING",
];

pub fn detect_license(dir: &Path) -> Option<String> {
    let text = LICENSE_NAMES
        .iter()
        .map(|n| dir.join(n))
        .find(|p| p.is_file())
        .and_then(|p| std::fs::read_to_string(p).ok())?;
    identify_license(&text).map(str::to_string)
}

/// Map license text to an SPDX identifier by its tell-tale phrases.
pub fn identify_license(text: &str) -> Option<&'static str> {
    let t = text.to_lowercase();
    let has = |needle: &str| t.contains(needle);

    if has("gnu affero general public license") {
        Some("AGPL-3.0")
    } else if has("gnu lesser general public license") {
        Some("LGPL-3.0")
    } else if has("gnu general public license") {
        if has("version 2") && !has("version 3") {
            Some("GPL-2.0")
        } else {
            Some("GPL-3.0")
        }
    } else if has("apache license") {
        Some("Apache-2.0")
    } else if has("mozilla public license") {
        Some("MPL-2.0")
    } else if has("this is free and unencumbered software") {
        Some("Unlicense")
    } else if has("mit license") || has("permission is hereby granted, free of charge") {
        Some("MIT")
    } else if has("permission to use, copy, modify, and/or distribute this software") {
        Some("ISC")
    } else if has("redistribution and use in source and binary forms") {
        if has("neither the name") {
            Some("BSD-3-Clause")
        } else {
            Some("BSD-2-Clause")
        }
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

fn language_for_extension(ext: &str) -> Option<&'static str> {
    let lang = match ext {
        "rs" => "Rust",
        "go" => "Go",
        "py" => "Python",
        "js" | "mjs" | "cjs" | "jsx" => "JavaScript",
        "ts" | "tsx" | "mts" => "TypeScript",
        "rb" => "Ruby",
        "java" => "Java",
        "kt" | "kts" => "Kotlin",
        "swift" => "Swift",
        "c" | "h" => "C",
        "cc" | "cpp" | "cxx" | "hpp" => "C++",
        "cs" => "C#",
        "php" => "PHP",
        "sh" | "bash" | "zsh" => "Shell",
        "lua" => "Lua",
        "zig" => "Zig",
        "ex" | "exs" => "Elixir",
        "hs" => "Haskell",
        "scala" => "Scala",
        "dart" => "Dart",
        _ => return None,
    };
    Some(lang)
}

fn is_skipped(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRS.contains(&&*name))
}

/// The language with the most source files under `dir`.
pub fn detect_language(dir: &Path) -> Option<String> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    for entry in WalkDir::new(dir)
        .max_depth(LANGUAGE_SCAN_DEPTH)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_skipped(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let lang = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| language_for_extension(&e.to_ascii_lowercase()));
        if let Some(lang) = lang {
            *counts.entry(lang).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then_with(|| lb.cmp(la)))
        .map(|(lang, _)| lang.to_string())
}

// ---------------------------------------------------------------------------
// Website
// ---------------------------------------------------------------------------

/// `homepage` from `package.json`, unless it just points back at GitHub.
pub fn detect_website(dir: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(dir.join("package.json")).ok()?;
    let pkg: serde_json::Value = serde_json::from_str(&raw).ok()?;
    let homepage = pkg.get("homepage")?.as_str()?.trim();
    if !(homepage.starts_with("https://") || homepage.starts_with("http://")) {
        return None;
    }
    if normalize_github_remote(homepage.split('#').next().unwrap_or(homepage)).is_some() {
        return None;
    }
    Some(homepage.to_string())
}
