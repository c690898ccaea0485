//! Positional extraction of (league, home, away) from an alert body.
//!
//! The upstream producer writes a fixed layout and nothing here tries to
//! infer anything else:
//!
//! ```text
//! <line 0>
//! <line 1>
//! 🏆 <league>
//! ⚽ <home> vs <away>
//! ...
//! ```
//!
//! Lines 2 and 3 may start with a decorative marker (emoji, bullets,
//! punctuation) which is dropped.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const LEAGUE_LINE: usize = 2;
const TEAMS_LINE: usize = 3;
const TEAMS_DELIMITER: &str = " vs ";

/// Leading run of characters that are neither letters nor digits
static MARKER_RE: OnceLock<Regex> = OnceLock::new();

fn marker_re() -> &'static Regex {
    MARKER_RE.get_or_init(|| Regex::new(r"^[^\p{L}\p{N}]+").expect("marker pattern is valid"))
}

/// Fields pulled out of one alert message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAlert {
    pub league: String,
    pub home: String,
    pub away: String,
}

/// Remove a leading decorative marker and surrounding whitespace.
pub fn strip_marker(line: &str) -> &str {
    let trimmed = line.trim();
    match marker_re().find(trimmed) {
        Some(m) => trimmed[m.end()..].trim(),
        None => trimmed,
    }
}

/// Extract the league and teams, or `None` if the message does not fit the layout.
pub fn extract(message: &str) -> Option<ExtractedAlert> {
    let lines: Vec<&str> = message.lines().collect();
    if lines.len() <= TEAMS_LINE {
        return None;
    }

    let league = strip_marker(lines[LEAGUE_LINE]);
    let (home, away) = strip_marker(lines[TEAMS_LINE]).split_once(TEAMS_DELIMITER)?;
    let (home, away) = (home.trim(), away.trim());

    if league.is_empty() || home.is_empty() || away.is_empty() {
        return None;
    }

    Some(ExtractedAlert {
        league: league.to_string(),
        home: home.to_string(),
        away: away.to_string(),
    })
}
