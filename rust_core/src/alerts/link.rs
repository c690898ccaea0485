//! Analysis-page links for resolved fixtures.

use crate::utils::normalize;
use regex::Regex;
use std::sync::OnceLock;

static NON_SLUG_RE: OnceLock<Regex> = OnceLock::new();

/// Lower-case, accent-free, `-`-separated form of a team name.
pub fn slugify(name: &str) -> String {
    let re = NON_SLUG_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));
    re.replace_all(&normalize(name), "-")
        .trim_matches('-')
        .to_string()
}

/// `{base}/{home-slug}-vs-{away-slug}/{id}`
pub fn analysis_url(base: &str, home: &str, away: &str, fixture_id: &str) -> String {
    format!(
        "{}/{}-vs-{}/{}",
        base.trim_end_matches('/'),
        slugify(home),
        slugify(away),
        fixture_id
    )
}
