//! Matching engine: runs the cascade and records what it learns.

use super::stages::default_cascade;
use super::{
    AlertOutcome, CandidatePairs, CascadeStrategy, MatchAttempt, Resolution, StageContext,
    StageMatch,
};
use crate::alerts::{extract, ExtractedAlert};
use crate::dataset::FixtureIndex;
use crate::equivalence_cache::EquivalenceCache;
use crate::error::Result;
use crate::league_config::{AliasTables, LeagueNameConverter};
use log::{debug, info, warn};
use std::path::Path;

/// Resolves message-side (league, home, away) to a dataset fixture.
///
/// Caches are injected so callers (and tests) decide where, or whether,
/// equivalences are persisted.
pub struct MatchingEngine {
    tables: AliasTables,
    converter: LeagueNameConverter,
    league_cache: EquivalenceCache,
    team_cache: EquivalenceCache,
    strategies: Vec<Box<dyn CascadeStrategy>>,
}

impl MatchingEngine {
    /// Create an engine with the default four-stage cascade.
    pub fn new(
        tables: AliasTables,
        league_cache: EquivalenceCache,
        team_cache: EquivalenceCache,
    ) -> Self {
        Self {
            converter: LeagueNameConverter::new(tables.clone()),
            tables,
            league_cache,
            team_cache,
            strategies: default_cascade(),
        }
    }

    /// Replace the cascade.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn CascadeStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Append a strategy after the existing ones.
    pub fn register_strategy(&mut self, strategy: Box<dyn CascadeStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn league_cache(&self) -> &EquivalenceCache {
        &self.league_cache
    }

    pub fn team_cache(&self) -> &EquivalenceCache {
        &self.team_cache
    }

    /// Run the cascade against `index`. `None` when every stage comes up empty.
    pub fn resolve(
        &self,
        index: &FixtureIndex,
        league: &str,
        home: &str,
        away: &str,
    ) -> Option<Resolution> {
        if index.is_empty() {
            debug!("Fixture index has no fixtures");
            return None;
        }

        let pairs = CandidatePairs::new(home, away);
        if pairs.is_empty() {
            debug!("Nothing to match for {:?} vs {:?}", home, away);
            return None;
        }

        let ctx = StageContext {
            index,
            league,
            home,
            away,
            pairs: &pairs,
            tables: &self.tables,
            league_cache: &self.league_cache,
            team_cache: &self.team_cache,
        };

        for strategy in &self.strategies {
            let Some(found) = strategy.attempt(&ctx) else {
                debug!(
                    "Stage {} found nothing for {} | {} vs {}",
                    strategy.strategy_name(),
                    league,
                    home,
                    away
                );
                continue;
            };

            let attempt = MatchAttempt {
                league: league.to_string(),
                home: home.to_string(),
                away: away.to_string(),
                stage: strategy.stage(),
                decomposition: found.decomposition,
                strictness: found.strictness,
            };
            info!(
                "Resolved {} | {} vs {} -> {} vs {} (id {}) via {} ({:?}, {:?})",
                league,
                home,
                away,
                found.fixture.home_name,
                found.fixture.away_name,
                found.fixture.id,
                strategy.strategy_name(),
                found.decomposition,
                found.strictness
            );

            if found.learn {
                self.learn(&ctx, &found);
            }

            return Some(Resolution {
                league: found.league.name.clone(),
                home: found.fixture.home_name.clone(),
                away: found.fixture.away_name.clone(),
                fixture_id: found.fixture.id.clone(),
                attempt,
            });
        }

        info!("No fixture found for {} | {} vs {}", league, home, away);
        None
    }

    /// Load the newest dataset in `dataset_dir`, then resolve.
    pub fn resolve_latest(
        &self,
        dataset_dir: &Path,
        league: &str,
        home: &str,
        away: &str,
    ) -> Result<Option<Resolution>> {
        let index = FixtureIndex::load_latest(dataset_dir)?;
        Ok(self.resolve(&index, league, home, away))
    }

    /// Convert the league, check validity, then resolve against `index`.
    pub fn resolve_extracted(&self, index: &FixtureIndex, alert: ExtractedAlert) -> AlertOutcome {
        let converted = self.converter.convert(&alert.league);
        if !converted.is_valid {
            info!("Skipping unsupported league {:?}", alert.league);
            return AlertOutcome::InvalidLeague { alert };
        }

        match self.resolve(index, &converted.name, &alert.home, &alert.away) {
            Some(resolution) => AlertOutcome::Resolved { resolution },
            None => AlertOutcome::NotFound { alert },
        }
    }

    /// Full pipeline for one raw alert message.
    ///
    /// The dataset is only read once the message has been extracted.
    pub fn resolve_alert(&self, dataset_dir: &Path, message: &str) -> Result<AlertOutcome> {
        let Some(alert) = extract(message) else {
            debug!("Message does not follow the alert layout");
            return Ok(AlertOutcome::NotExtractable);
        };
        let index = FixtureIndex::load_latest(dataset_dir)?;
        Ok(self.resolve_extracted(&index, alert))
    }

    /// Record league and team equivalences for a match.
    ///
    /// Persistence failures are logged; the resolution itself stands.
    fn learn(&self, ctx: &StageContext<'_>, found: &StageMatch<'_>) {
        let entries = [
            (&self.league_cache, "league", ctx.league, found.league.name.as_str()),
            (&self.team_cache, "team", ctx.home, found.fixture.home_name.as_str()),
            (&self.team_cache, "team", ctx.away, found.fixture.away_name.as_str()),
        ];

        for (cache, kind, message_name, canonical) in entries {
            match cache.put(message_name, canonical) {
                Ok(true) => info!("Learned {} equivalence {:?} -> {:?}", kind, message_name, canonical),
                Ok(false) => {}
                Err(e) => warn!("{}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{FixtureRecord, LeagueFixtures, TimeSlot};
    use crate::matching::{MatchStage, Strictness};

    fn engine() -> MatchingEngine {
        MatchingEngine::new(
            AliasTables::default(),
            EquivalenceCache::in_memory(),
            EquivalenceCache::in_memory(),
        )
    }

    fn index() -> FixtureIndex {
        FixtureIndex::new(vec![TimeSlot {
            label: "16:00".to_string(),
            leagues: vec![
                LeagueFixtures {
                    name: "Argentina Liga Profesional".to_string(),
                    games: vec![FixtureRecord::new("CA Boca Juniors", "River Plate", "77")],
                },
                LeagueFixtures {
                    name: "Brazil Serie A".to_string(),
                    games: vec![FixtureRecord::new("São Paulo", "Grêmio", "88")],
                },
            ],
        }])
    }

    #[test]
    fn test_direct_league_and_learning() {
        let engine = engine();
        let resolution = engine
            .resolve(&index(), "Brazil Serie A", "Sao Paulo", "Gremio")
            .unwrap();
        assert_eq!(resolution.as_tuple(), ("São Paulo", "Grêmio", "88"));
        assert_eq!(resolution.attempt.stage, MatchStage::DirectLeague);
        assert_eq!(resolution.attempt.strictness, Strictness::Exact);

        assert_eq!(
            engine.league_cache().get("brazil serie a"),
            Some("Brazil Serie A".to_string())
        );
        assert_eq!(engine.team_cache().get("sao paulo"), Some("São Paulo".to_string()));
        assert_eq!(engine.team_cache().get("gremio"), Some("Grêmio".to_string()));
    }

    #[test]
    fn test_second_call_hits_cache_stage() {
        let engine = engine();
        let idx = index();
        engine.resolve(&idx, "Brazil Serie A", "Sao Paulo", "Gremio").unwrap();
        let leagues = engine.league_cache().len();
        let teams = engine.team_cache().len();

        let again = engine.resolve(&idx, "Brazil Serie A", "Sao Paulo", "Gremio").unwrap();
        assert_eq!(again.attempt.stage, MatchStage::Cache);
        assert_eq!(again.attempt.decomposition, None);
        assert_eq!(again.fixture_id, "88");
        assert_eq!(engine.league_cache().len(), leagues);
        assert_eq!(engine.team_cache().len(), teams);
    }

    #[test]
    fn test_short_name_never_flexible() {
        let engine = engine();
        // "CA" is contained in "ca boca juniors" but is too short
        assert!(engine
            .resolve(&index(), "Argentina Liga Profesional", "CA", "River")
            .is_none());
        assert!(engine.team_cache().is_empty());
    }

    #[test]
    fn test_invalid_league_skipped() {
        let engine = engine();
        let alert = ExtractedAlert {
            league: "U21 Brazil Serie A".to_string(),
            home: "Sao Paulo".to_string(),
            away: "Gremio".to_string(),
        };
        let outcome = engine.resolve_extracted(&index(), alert.clone());
        assert_eq!(outcome, AlertOutcome::InvalidLeague { alert });
    }

    #[test]
    fn test_converted_league_used_for_resolution() {
        let engine = engine();
        let alert = ExtractedAlert {
            league: "Brazilian Serie A".to_string(),
            home: "São Paulo".to_string(),
            away: "Grêmio".to_string(),
        };
        match engine.resolve_extracted(&index(), alert) {
            AlertOutcome::Resolved { resolution } => {
                assert_eq!(resolution.attempt.league, "Brazil Serie A");
                assert_eq!(resolution.attempt.stage, MatchStage::DirectLeague);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_same_name_club_abroad_not_learned() {
        let engine = engine();
        assert!(engine
            .resolve(&index(), "English Championship", "CA Boca Juniors", "River Plate")
            .is_none());
        assert!(engine.league_cache().is_empty());
        assert!(engine.team_cache().is_empty());
    }

    /// Accepts the first fixture of the index, whatever the names.
    struct FirstFixtureStage;

    impl CascadeStrategy for FirstFixtureStage {
        fn stage(&self) -> MatchStage {
            MatchStage::Global
        }

        fn attempt<'a>(&self, ctx: &StageContext<'a>) -> Option<StageMatch<'a>> {
            let (league, fixture) = ctx.index.fixtures().next()?;
            Some(StageMatch {
                league,
                fixture,
                decomposition: None,
                strictness: Strictness::Flexible,
                learn: false,
            })
        }

        fn strategy_name(&self) -> &str {
            "first_fixture"
        }
    }

    #[test]
    fn test_registered_strategy_runs_after_defaults() {
        let mut engine = engine();
        assert!(engine.resolve(&index(), "Qwz", "Xyxyx", "Kukuk").is_none());

        engine.register_strategy(Box::new(FirstFixtureStage));
        let resolution = engine.resolve(&index(), "Qwz", "Xyxyx", "Kukuk").unwrap();
        assert_eq!(resolution.fixture_id, "77");
        assert!(engine.league_cache().is_empty());

        // Defaults still take precedence
        let direct = engine
            .resolve(&index(), "Brazil Serie A", "Sao Paulo", "Gremio")
            .unwrap();
        assert_eq!(direct.fixture_id, "88");
        assert_eq!(direct.attempt.stage, MatchStage::DirectLeague);
    }

    #[test]
    fn test_empty_index_finds_nothing() {
        let engine = engine();
        assert!(engine
            .resolve(&FixtureIndex::new(Vec::new()), "Brazil Serie A", "Sao Paulo", "Gremio")
            .is_none());
    }

    #[test]
    fn test_empty_cascade_finds_nothing() {
        let engine = engine().with_strategies(Vec::new());
        assert!(engine
            .resolve(&index(), "Brazil Serie A", "Sao Paulo", "Gremio")
            .is_none());
    }
}
