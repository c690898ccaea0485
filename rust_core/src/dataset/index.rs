//! Typed fixture snapshot built from one dataset file.

use crate::error::{ResolveError, Result};
use crate::utils::normalize;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One fixture as published by the dataset source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRecord {
    pub home_name: String,
    pub away_name: String,
    pub id: String,
}

impl FixtureRecord {
    pub fn new(home_name: &str, away_name: &str, id: &str) -> Self {
        Self {
            home_name: home_name.to_string(),
            away_name: away_name.to_string(),
            id: id.to_string(),
        }
    }
}

/// Fixtures of one league within a time slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueFixtures {
    pub name: String,
    pub games: Vec<FixtureRecord>,
}

/// A time slot label and its leagues, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub label: String,
    pub leagues: Vec<LeagueFixtures>,
}

#[derive(Debug, Deserialize)]
struct RawLeague {
    games: Vec<RawGame>,
}

#[derive(Debug, Deserialize)]
struct RawGame {
    home_name: String,
    away_name: String,
    id: RawId,
}

/// Dataset ids arrive as strings or numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// The fixture dataset for the current period.
///
/// Iteration follows the insertion order of the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureIndex {
    slots: Vec<TimeSlot>,
    source: Option<PathBuf>,
}

impl FixtureIndex {
    pub fn new(slots: Vec<TimeSlot>) -> Self {
        Self {
            slots,
            source: None,
        }
    }

    /// Parse `{"data": {slot: {league: {"games": [...]}}}}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::parse(content, Path::new("<memory>"))
    }

    /// Load one dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ResolveError::io(path, e))?;
        let mut index = Self::parse(&content, path)?;
        index.source = Some(path.to_path_buf());
        debug!(
            "Loaded {} fixtures from {}",
            index.fixture_count(),
            path.display()
        );
        Ok(index)
    }

    /// Load the most recently modified file in `dir`.
    pub fn load_latest(dir: &Path) -> Result<Self> {
        let path = latest_dataset_file(dir)?;
        Self::load(&path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| ResolveError::malformed(path, e.to_string()))?;

        let data = root
            .get("data")
            .and_then(Value::as_object)
            .ok_or_else(|| ResolveError::malformed(path, "missing object key \"data\""))?;

        let mut slots = Vec::with_capacity(data.len());
        for (label, slot) in data {
            let leagues_raw: &Map<String, Value> = slot.as_object().ok_or_else(|| {
                ResolveError::malformed(path, format!("time slot {:?} is not an object", label))
            })?;

            let mut leagues = Vec::with_capacity(leagues_raw.len());
            for (name, league) in leagues_raw {
                let raw: RawLeague = RawLeague::deserialize(league).map_err(|e| {
                    ResolveError::malformed(path, format!("league {:?} in {:?}: {}", name, label, e))
                })?;
                leagues.push(LeagueFixtures {
                    name: name.clone(),
                    games: raw
                        .games
                        .into_iter()
                        .map(|g| FixtureRecord {
                            home_name: g.home_name,
                            away_name: g.away_name,
                            id: g.id.into_string(),
                        })
                        .collect(),
                });
            }

            slots.push(TimeSlot {
                label: label.clone(),
                leagues,
            });
        }

        Ok(Self {
            slots,
            source: None,
        })
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// All leagues across all time slots, in order. A league name may repeat.
    pub fn leagues(&self) -> impl Iterator<Item = &LeagueFixtures> + '_ {
        self.slots.iter().flat_map(|slot| slot.leagues.iter())
    }

    /// Every fixture paired with its league.
    pub fn fixtures(&self) -> impl Iterator<Item = (&LeagueFixtures, &FixtureRecord)> + '_ {
        self.leagues()
            .flat_map(|league| league.games.iter().map(move |game| (league, game)))
    }

    /// Leagues whose normalized name equals `league` once normalized.
    pub fn leagues_named<'a>(
        &'a self,
        league: &str,
    ) -> impl Iterator<Item = &'a LeagueFixtures> + 'a {
        let wanted = normalize(league);
        self.leagues()
            .filter(move |candidate| normalize(&candidate.name) == wanted)
    }

    pub fn fixture_count(&self) -> usize {
        self.leagues().map(|league| league.games.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fixture_count() == 0
    }

    /// File this snapshot was read from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Most recently modified regular file in `dir`.
pub fn latest_dataset_file(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ResolveError::DatasetUnavailable {
            dir: dir.to_path_buf(),
        },
        _ => ResolveError::io(dir, e),
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| ResolveError::io(dir, e))?;
        let meta = match entry.metadata() {
            Ok(meta) if meta.is_file() => meta,
            _ => continue,
        };
        let modified = meta.modified().map_err(|e| ResolveError::io(entry.path(), e))?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, entry.path()));
        }
    }

    newest
        .map(|(_, path)| path)
        .ok_or_else(|| ResolveError::DatasetUnavailable {
            dir: dir.to_path_buf(),
        })
}
