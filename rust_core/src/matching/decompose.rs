//! Team-name decompositions, strictness checks and the shared fixture search.

use super::{Decomposition, Strictness};
use crate::dataset::{FixtureRecord, LeagueFixtures};
use crate::utils::{normalize, tokens};
use std::collections::HashSet;

/// Names shorter than this never match flexibly
pub const MIN_FLEXIBLE_LEN: usize = 3;

/// One normalized (home, away) pair to compare against stored names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePair {
    pub decomposition: Decomposition,
    pub home: String,
    pub away: String,
}

/// The usable decompositions of a message-side (home, away), in try order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePairs {
    pairs: Vec<CandidatePair>,
}

impl CandidatePairs {
    /// Build from raw names. Decompositions that need a missing word are skipped.
    pub fn new(home: &str, away: &str) -> Self {
        let home_full = normalize(home);
        let away_full = normalize(away);
        if home_full.is_empty() || away_full.is_empty() {
            return Self::default();
        }

        let home_words = tokens(home);
        let away_words = tokens(away);

        let pairs = Decomposition::ALL
            .iter()
            .filter_map(|&decomposition| {
                let (h, a) = match decomposition {
                    Decomposition::Full => (Some(&home_full), Some(&away_full)),
                    Decomposition::FirstFirst => (home_words.first(), away_words.first()),
                    Decomposition::FirstSecond => (home_words.first(), away_words.get(1)),
                    Decomposition::SecondSecond => (home_words.get(1), away_words.get(1)),
                    Decomposition::SecondFirst => (home_words.get(1), away_words.first()),
                };
                Some(CandidatePair {
                    decomposition,
                    home: h?.clone(),
                    away: a?.clone(),
                })
            })
            .collect();

        Self { pairs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidatePair> {
        self.pairs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Both candidate names equal the stored ones.
pub fn exact_match(pair: &CandidatePair, stored_home: &str, stored_away: &str) -> bool {
    pair.home == stored_home && pair.away == stored_away
}

/// Both candidate names are substrings of, or contain, the stored ones.
pub fn flexible_match(pair: &CandidatePair, stored_home: &str, stored_away: &str) -> bool {
    flexible_name_match(&pair.home, stored_home) && flexible_name_match(&pair.away, stored_away)
}

fn flexible_name_match(candidate: &str, stored: &str) -> bool {
    if candidate.chars().count() < MIN_FLEXIBLE_LEN || stored.is_empty() {
        return false;
    }
    stored.contains(candidate) || candidate.contains(stored)
}

/// Distinct characters shared by the two normalized names over the longer length.
///
/// Multiplicity and order are ignored on purpose; this is a coarse gate, not
/// an edit distance.
pub fn char_overlap_ratio(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    let longer = a.chars().count().max(b.chars().count());
    if longer == 0 {
        return 0.0;
    }

    let a_chars: HashSet<char> = a.chars().collect();
    let b_chars: HashSet<char> = b.chars().collect();
    let shared = a_chars.intersection(&b_chars).count();

    shared as f64 / longer as f64
}

/// A fixture matched by one candidate pair.
#[derive(Debug, Clone, Copy)]
pub struct FixtureHit<'a> {
    pub league: &'a LeagueFixtures,
    pub fixture: &'a FixtureRecord,
    pub decomposition: Decomposition,
    pub strictness: Strictness,
}

/// Search `candidates` in order, all Exact comparisons before any Flexible one.
///
/// The Exact pass covers every candidate fixture before the Flexible pass
/// starts, so an exact hit on a later fixture beats a flexible hit on an
/// earlier one. Within a pass, fixture order and then decomposition order
/// decide.
///
/// `accept` can veto a hit (the global stage uses it for its similarity and
/// country gates); a vetoed hit does not stop the search.
pub fn search<'a, F>(
    candidates: &[(&'a LeagueFixtures, &'a FixtureRecord)],
    pairs: &CandidatePairs,
    accept: F,
) -> Option<FixtureHit<'a>>
where
    F: Fn(&FixtureHit<'a>, &CandidatePair) -> bool,
{
    if pairs.is_empty() || candidates.is_empty() {
        return None;
    }

    let stored: Vec<(String, String)> = candidates
        .iter()
        .map(|(_, f)| (normalize(&f.home_name), normalize(&f.away_name)))
        .collect();

    for strictness in [Strictness::Exact, Strictness::Flexible] {
        for (&(league, fixture), (home, away)) in candidates.iter().zip(&stored) {
            for pair in pairs.iter() {
                let matched = match strictness {
                    Strictness::Exact => exact_match(pair, home, away),
                    Strictness::Flexible => flexible_match(pair, home, away),
                };
                if !matched {
                    continue;
                }

                let hit = FixtureHit {
                    league,
                    fixture,
                    decomposition: pair.decomposition,
                    strictness,
                };
                if accept(&hit, pair) {
                    return Some(hit);
                }
            }
        }
    }

    None
}

/// Flatten leagues into the (league, fixture) list `search` expects.
pub fn fixtures_of<'a, I>(leagues: I) -> Vec<(&'a LeagueFixtures, &'a FixtureRecord)>
where
    I: IntoIterator<Item = &'a LeagueFixtures>,
{
    leagues
        .into_iter()
        .flat_map(|league| league.games.iter().map(move |game| (league, game)))
        .collect()
}
