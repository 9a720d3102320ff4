use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SubmitError;

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// Visual theme for the generated listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Midnight,
    Daylight,
    Terminal,
    Ocean,
    Forest,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[
            Theme::Midnight,
            Theme::Daylight,
            Theme::Terminal,
            Theme::Ocean,
            Theme::Forest,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Midnight => "midnight",
            Theme::Daylight => "daylight",
            Theme::Terminal => "terminal",
            Theme::Ocean => "ocean",
            Theme::Forest => "forest",
        }
    }

    fn names() -> String {
        Theme::all()
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = SubmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Theme::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SubmitError::InvalidTheme(s.to_string(), Theme::names()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Ocean".parse::<Theme>().unwrap(), Theme::Ocean);
        assert_eq!(" terminal ".parse::<Theme>().unwrap(), Theme::Terminal);
    }

    #[test]
    fn unknown_theme_lists_choices() {
        let err = "neon".parse::<Theme>().unwrap_err().to_string();
        assert!(err.contains("neon"));
        assert!(err.contains("midnight, daylight, terminal, ocean, forest"));
    }

    #[test]
    fn display_matches_as_str() {
        for t in Theme::all() {
            assert_eq!(t.to_string(), t.as_str());
        }
    }
}
