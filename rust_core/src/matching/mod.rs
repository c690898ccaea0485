//! Fixture Matching Cascade
//!
//! Defines the `CascadeStrategy` trait and the tagged results the
//! `MatchingEngine` passes around. Each strategy is one cascade stage; the
//! engine runs them in order and stops at the first match.

use crate::alerts::ExtractedAlert;
use crate::dataset::{FixtureIndex, FixtureRecord, LeagueFixtures};
use crate::equivalence_cache::EquivalenceCache;
use crate::league_config::AliasTables;
use serde::{Deserialize, Serialize};

pub mod decompose;
pub mod engine;
pub mod stages;

pub use decompose::{char_overlap_ratio, CandidatePair, CandidatePairs, FixtureHit};
pub use engine::MatchingEngine;
pub use stages::default_cascade;

/// Cascade stage that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    Cache,
    DirectLeague,
    CountryFallback,
    Global,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Cache => "cache",
            MatchStage::DirectLeague => "direct_league",
            MatchStage::CountryFallback => "country_fallback",
            MatchStage::Global => "global",
        }
    }
}

/// Match strictness level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    Flexible = 1, // Substring either way, min 3 chars
    Exact = 2,    // Normalized equality
}

/// Which words of the message-side team names were compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decomposition {
    Full,
    FirstFirst,
    FirstSecond,
    SecondSecond,
    SecondFirst,
}

impl Decomposition {
    /// Order in which decompositions are tried.
    pub const ALL: [Decomposition; 5] = [
        Decomposition::Full,
        Decomposition::FirstFirst,
        Decomposition::FirstSecond,
        Decomposition::SecondSecond,
        Decomposition::SecondFirst,
    ];
}

/// How one resolution was reached. Only used for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAttempt {
    pub league: String,
    pub home: String,
    pub away: String,
    pub stage: MatchStage,
    /// `None` for an exact hit on cached canonical names
    pub decomposition: Option<Decomposition>,
    pub strictness: Strictness,
}

/// A resolved fixture: canonical names and id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub league: String,
    pub home: String,
    pub away: String,
    pub fixture_id: String,
    pub attempt: MatchAttempt,
}

impl Resolution {
    /// `(canonical_home, canonical_away, fixture_id)`
    pub fn as_tuple(&self) -> (&str, &str, &str) {
        (&self.home, &self.away, &self.fixture_id)
    }
}

/// Outcome of running one alert message through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlertOutcome {
    /// Message did not follow the positional layout
    NotExtractable,
    /// League is listed as unsupported
    InvalidLeague { alert: ExtractedAlert },
    /// Every cascade stage came up empty
    NotFound { alert: ExtractedAlert },
    Resolved { resolution: Resolution },
}

/// Everything a stage may look at for one resolution.
pub struct StageContext<'a> {
    pub index: &'a FixtureIndex,
    /// Message-side names as passed to the engine
    pub league: &'a str,
    pub home: &'a str,
    pub away: &'a str,
    pub pairs: &'a CandidatePairs,
    pub tables: &'a AliasTables,
    pub league_cache: &'a EquivalenceCache,
    pub team_cache: &'a EquivalenceCache,
}

/// Tagged result of a successful stage.
#[derive(Debug, Clone, Copy)]
pub struct StageMatch<'a> {
    pub league: &'a LeagueFixtures,
    pub fixture: &'a FixtureRecord,
    pub decomposition: Option<Decomposition>,
    pub strictness: Strictness,
    /// Whether the engine should record new equivalences for this match
    pub learn: bool,
}

impl<'a> From<FixtureHit<'a>> for StageMatch<'a> {
    fn from(hit: FixtureHit<'a>) -> Self {
        Self {
            league: hit.league,
            fixture: hit.fixture,
            decomposition: Some(hit.decomposition),
            strictness: hit.strictness,
            learn: true,
        }
    }
}

/// One cascade stage.
pub trait CascadeStrategy: Send + Sync {
    fn stage(&self) -> MatchStage;

    /// Return the first qualifying fixture, or `None` to fall through.
    fn attempt<'a>(&self, ctx: &StageContext<'a>) -> Option<StageMatch<'a>>;

    /// Strategy name for logging and debugging
    fn strategy_name(&self) -> &str {
        self.stage().as_str()
    }
}
