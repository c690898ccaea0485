//! The four cascade stages, in the order the engine runs them.

use super::decompose::{char_overlap_ratio, fixtures_of, search, CandidatePair, FixtureHit};
use super::{CascadeStrategy, MatchStage, StageContext, StageMatch, Strictness};
use crate::dataset::LeagueFixtures;
use crate::utils::{normalize, tokens};
use log::debug;

/// Both teams must reach this overlap for a flexible global match
pub const GLOBAL_MIN_OVERLAP: f64 = 0.5;

/// Default cascade: cache, direct league, country fallback, global.
pub fn default_cascade() -> Vec<Box<dyn CascadeStrategy>> {
    vec![
        Box::new(CacheStage),
        Box::new(DirectLeagueStage),
        Box::new(CountryFallbackStage),
        Box::new(GlobalStage::default()),
    ]
}

/// Learned equivalences.
///
/// With the league and both teams cached, looks for the cached canonical
/// names verbatim. With only the league cached (or no verbatim hit), runs
/// the decomposition search inside the cached league.
pub struct CacheStage;

impl CascadeStrategy for CacheStage {
    fn stage(&self) -> MatchStage {
        MatchStage::Cache
    }

    fn attempt<'a>(&self, ctx: &StageContext<'a>) -> Option<StageMatch<'a>> {
        let canonical_league = ctx.league_cache.get(ctx.league)?;
        let leagues: Vec<&'a LeagueFixtures> =
            ctx.index.leagues_named(&canonical_league).collect();

        if let (Some(home), Some(away)) = (ctx.team_cache.get(ctx.home), ctx.team_cache.get(ctx.away))
        {
            let (home, away) = (normalize(&home), normalize(&away));
            for &league in &leagues {
                let found = league.games.iter().find(|game| {
                    normalize(&game.home_name) == home && normalize(&game.away_name) == away
                });
                if let Some(fixture) = found {
                    return Some(StageMatch {
                        league,
                        fixture,
                        decomposition: None,
                        strictness: Strictness::Exact,
                        learn: false,
                    });
                }
            }
            debug!(
                "Cached teams {} / {} not found in cached league {}",
                home, away, canonical_league
            );
        }

        search(&fixtures_of(leagues), ctx.pairs, |_, _| true).map(StageMatch::from)
    }
}

/// Leagues whose normalized name equals the input league.
pub struct DirectLeagueStage;

impl CascadeStrategy for DirectLeagueStage {
    fn stage(&self) -> MatchStage {
        MatchStage::DirectLeague
    }

    fn attempt<'a>(&self, ctx: &StageContext<'a>) -> Option<StageMatch<'a>> {
        let candidates = fixtures_of(ctx.index.leagues_named(ctx.league));
        search(&candidates, ctx.pairs, |_, _| true).map(StageMatch::from)
    }
}

/// Leagues of the same country as the input league.
///
/// The country is the first word of the league, expanded through the
/// variant groups. A league qualifies when its normalized name starts with
/// a variant, or when it equals the input league minus its country word
/// once whitespace is removed ("Spanish LaLiga" -> "La Liga").
pub struct CountryFallbackStage;

impl CascadeStrategy for CountryFallbackStage {
    fn stage(&self) -> MatchStage {
        MatchStage::CountryFallback
    }

    fn attempt<'a>(&self, ctx: &StageContext<'a>) -> Option<StageMatch<'a>> {
        let words = tokens(ctx.league);
        let country = words.first()?;
        let variants = ctx.tables.country_variants(country);
        let remainder: String = words[1..].concat();

        let leagues = ctx.index.leagues().filter(|league| {
            let name = normalize(&league.name);
            variants.iter().any(|v| name.starts_with(v.as_str()))
                || (!remainder.is_empty() && compact(&name) == remainder)
        });

        search(&fixtures_of(leagues), ctx.pairs, |_, _| true).map(StageMatch::from)
    }
}

/// Every fixture in the index.
///
/// Flexible hits need enough character overlap on both teams. Any hit is
/// rejected when the input league names a country group the fixture's
/// league does not belong to.
pub struct GlobalStage {
    min_overlap: f64,
}

impl Default for GlobalStage {
    fn default() -> Self {
        Self {
            min_overlap: GLOBAL_MIN_OVERLAP,
        }
    }
}

impl GlobalStage {
    pub fn new(min_overlap: f64) -> Self {
        Self { min_overlap }
    }

    fn similar_enough(&self, hit: &FixtureHit<'_>, pair: &CandidatePair) -> bool {
        char_overlap_ratio(&pair.home, &hit.fixture.home_name) >= self.min_overlap
            && char_overlap_ratio(&pair.away, &hit.fixture.away_name) >= self.min_overlap
    }
}

impl CascadeStrategy for GlobalStage {
    fn stage(&self) -> MatchStage {
        MatchStage::Global
    }

    fn attempt<'a>(&self, ctx: &StageContext<'a>) -> Option<StageMatch<'a>> {
        let input_group = tokens(ctx.league)
            .first()
            .and_then(|word| ctx.tables.country_group(word));

        let candidates: Vec<_> = ctx.index.fixtures().collect();
        search(&candidates, ctx.pairs, |hit, pair| {
            // Similarity only gates flexible hits
            if hit.strictness == Strictness::Flexible && !self.similar_enough(hit, pair) {
                debug!(
                    "Global: rejected {} vs {} (low similarity)",
                    hit.fixture.home_name, hit.fixture.away_name
                );
                return false;
            }
            match input_group {
                Some(group) => {
                    let same_country = tokens(&hit.league.name)
                        .iter()
                        .any(|word| group.iter().any(|v| v == word));
                    if !same_country {
                        debug!(
                            "Global: rejected {} vs {} in {} (country mismatch)",
                            hit.fixture.home_name, hit.fixture.away_name, hit.league.name
                        );
                    }
                    same_country
                }
                None => true,
            }
        })
        .map(StageMatch::from)
    }
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{FixtureIndex, FixtureRecord, TimeSlot};
    use crate::equivalence_cache::EquivalenceCache;
    use crate::league_config::AliasTables;
    use crate::matching::{CandidatePairs, Decomposition};

    fn index(leagues: &[(&str, &[(&str, &str, &str)])]) -> FixtureIndex {
        FixtureIndex::new(vec![TimeSlot {
            label: "15:00".to_string(),
            leagues: leagues
                .iter()
                .map(|(name, games)| LeagueFixtures {
                    name: name.to_string(),
                    games: games
                        .iter()
                        .map(|(h, a, id)| FixtureRecord::new(h, a, id))
                        .collect(),
                })
                .collect(),
        }])
    }

    struct Fixture {
        index: FixtureIndex,
        tables: AliasTables,
        leagues: EquivalenceCache,
        teams: EquivalenceCache,
        pairs: CandidatePairs,
    }

    impl Fixture {
        fn new(index: FixtureIndex, home: &str, away: &str) -> Self {
            Self {
                index,
                tables: AliasTables::default(),
                leagues: EquivalenceCache::in_memory(),
                teams: EquivalenceCache::in_memory(),
                pairs: CandidatePairs::new(home, away),
            }
        }

        fn ctx<'a>(&'a self, league: &'a str, home: &'a str, away: &'a str) -> StageContext<'a> {
            StageContext {
                index: &self.index,
                league,
                home,
                away,
                pairs: &self.pairs,
                tables: &self.tables,
                league_cache: &self.leagues,
                team_cache: &self.teams,
            }
        }
    }

    #[test]
    fn test_direct_league_normalized_equality() {
        let f = Fixture::new(
            index(&[("Brasil Série A", &[("São Paulo", "Grêmio", "7")])]),
            "Sao Paulo",
            "Gremio",
        );
        let m = DirectLeagueStage
            .attempt(&f.ctx("brasil serie a", "Sao Paulo", "Gremio"))
            .unwrap();
        assert_eq!(m.fixture.id, "7");
        assert_eq!(m.strictness, Strictness::Exact);
        assert!(m.learn);
    }

    #[test]
    fn test_country_fallback_prefix() {
        let f = Fixture::new(
            index(&[
                ("Italy Serie A", &[("Napoli", "Roma", "1")]),
                ("Spain Segunda", &[("Racing Santander", "Eibar", "2")]),
            ]),
            "Racing",
            "Eibar",
        );
        let m = CountryFallbackStage
            .attempt(&f.ctx("Spanish Segunda Division", "Racing", "Eibar"))
            .unwrap();
        assert_eq!(m.fixture.id, "2");
        assert_eq!(m.strictness, Strictness::Flexible);
    }

    #[test]
    fn test_country_fallback_compacted_remainder() {
        let f = Fixture::new(
            index(&[("La Liga", &[("Real Madrid", "Barcelona", "123")])]),
            "Real Madrid",
            "Barcelona",
        );
        assert!(DirectLeagueStage
            .attempt(&f.ctx("Spanish LaLiga", "Real Madrid", "Barcelona"))
            .is_none());
        let m = CountryFallbackStage
            .attempt(&f.ctx("Spanish LaLiga", "Real Madrid", "Barcelona"))
            .unwrap();
        assert_eq!(m.fixture.id, "123");
    }

    #[test]
    fn test_cache_stage_full_hit() {
        let f = Fixture::new(
            index(&[("England Premier League", &[("Manchester United", "Chelsea", "9")])]),
            "Man Utd",
            "Chelsea",
        );
        f.leagues.put("EPL", "England Premier League").unwrap();
        f.teams.put("Man Utd", "Manchester United").unwrap();
        f.teams.put("Chelsea", "Chelsea").unwrap();

        let m = CacheStage.attempt(&f.ctx("EPL", "Man Utd", "Chelsea")).unwrap();
        assert_eq!(m.fixture.id, "9");
        assert_eq!(m.decomposition, None);
        assert!(!m.learn);
    }

    #[test]
    fn test_cache_stage_league_only() {
        let f = Fixture::new(
            index(&[("England Premier League", &[("Manchester United", "Chelsea", "9")])]),
            "Manchester",
            "Chelsea",
        );
        f.leagues.put("EPL", "England Premier League").unwrap();

        let m = CacheStage
            .attempt(&f.ctx("EPL", "Manchester", "Chelsea"))
            .unwrap();
        assert_eq!(m.fixture.id, "9");
        assert_eq!(m.decomposition, Some(Decomposition::Full));
        assert!(m.learn);

        assert!(CacheStage.attempt(&f.ctx("Other", "Manchester", "Chelsea")).is_none());
    }

    #[test]
    fn test_global_similarity_gate() {
        let f = Fixture::new(
            index(&[("Some Cup", &[("Arsenal de Sarandi Reserves", "Chelsea", "3")])]),
            "Arsenal",
            "Chelsea",
        );
        // "arsenal" is inside the stored name but overlaps too little
        assert!(GlobalStage::default()
            .attempt(&f.ctx("Friendly Cup", "Arsenal", "Chelsea"))
            .is_none());
    }

    #[test]
    fn test_global_overlap_boundary() {
        // {a,r,s,e,n,l} over len("arsenal city") = 6/12, exactly at the threshold
        let at = Fixture::new(
            index(&[("Some Cup", &[("Arsenal City", "Chelsea", "6")])]),
            "Arsenal",
            "Chelsea",
        );
        assert!((char_overlap_ratio("Arsenal", "Arsenal City") - 0.5).abs() < 1e-9);
        let m = GlobalStage::default()
            .attempt(&at.ctx("Friendly Cup", "Arsenal", "Chelsea"))
            .unwrap();
        assert_eq!(m.fixture.id, "6");
        assert_eq!(m.strictness, Strictness::Flexible);

        // A stricter gate turns the same hit down
        assert!(GlobalStage::new(0.6)
            .attempt(&at.ctx("Friendly Cup", "Arsenal", "Chelsea"))
            .is_none());

        // 6/13 is just below
        let below = Fixture::new(
            index(&[("Some Cup", &[("Arsenal Citys", "Chelsea", "7")])]),
            "Arsenal",
            "Chelsea",
        );
        assert!(char_overlap_ratio("Arsenal", "Arsenal Citys") < 0.5);
        assert!(GlobalStage::default()
            .attempt(&below.ctx("Friendly Cup", "Arsenal", "Chelsea"))
            .is_none());
    }

    #[test]
    fn test_global_rejects_exact_hit_from_other_country() {
        let f = Fixture::new(
            index(&[("Argentina Primera", &[("Racing", "Independiente", "1")])]),
            "Racing",
            "Independiente",
        );
        assert!(GlobalStage::default()
            .attempt(&f.ctx("English Championship", "Racing", "Independiente"))
            .is_none());

        let m = GlobalStage::default()
            .attempt(&f.ctx("Argentine Cup", "Racing", "Independiente"))
            .unwrap();
        assert_eq!(m.fixture.id, "1");
        assert_eq!(m.strictness, Strictness::Exact);
    }

    #[test]
    fn test_global_rejects_other_country() {
        let f = Fixture::new(
            index(&[("Argentina Primera", &[("Arsenal FC", "Chelsea FC", "4")])]),
            "Arsenal",
            "Chelsea",
        );
        assert!(GlobalStage::default()
            .attempt(&f.ctx("English Premier League", "Arsenal", "Chelsea"))
            .is_none());

        // Without a country-like first word the same hit is accepted
        let m = GlobalStage::default()
            .attempt(&f.ctx("Premier League", "Arsenal", "Chelsea"))
            .unwrap();
        assert_eq!(m.fixture.id, "4");
        assert_eq!(m.strictness, Strictness::Flexible);
    }

    #[test]
    fn test_global_accepts_same_country() {
        let f = Fixture::new(
            index(&[("England Championship", &[("Arsenal FC", "Chelsea FC", "5")])]),
            "Arsenal",
            "Chelsea",
        );
        let m = GlobalStage::default()
            .attempt(&f.ctx("English Premier League", "Arsenal", "Chelsea"))
            .unwrap();
        assert_eq!(m.fixture.id, "5");
    }
}
