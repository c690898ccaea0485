//! Fixture Match Core - resolves free-text fixture alerts to dataset fixtures.
//!
//! This module provides:
//! - Text normalization (accents, case, whitespace)
//! - Positional extraction of league and teams from alert messages
//! - League name conversion (nationality -> country) and validity checks
//! - A typed fixture index over the newest dataset snapshot
//! - The matching cascade (cache, direct league, country fallback, global)
//! - Persistent equivalence caches that turn fuzzy matches into exact lookups
//! - Dataset retention and analysis-link helpers

pub mod alerts;
pub mod dataset;
pub mod equivalence_cache;
pub mod error;
pub mod league_config;
pub mod matching;
pub mod utils;

pub use alerts::{analysis_url, extract, slugify, ExtractedAlert};
pub use dataset::{FixtureIndex, FixtureRecord, LeagueFixtures, TimeSlot};
pub use equivalence_cache::EquivalenceCache;
pub use error::{ResolveError, Result};
pub use league_config::{AliasTables, ConvertedLeague, LeagueNameConverter};
pub use matching::{
    AlertOutcome, CascadeStrategy, Decomposition, MatchAttempt, MatchStage, MatchingEngine,
    Resolution, Strictness,
};
pub use utils::normalize;
