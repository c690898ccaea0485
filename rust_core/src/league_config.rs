//! League alias configuration.
//!
//! This module provides:
//! - Static nationality -> country substitutions for message-side league names
//! - The list of league names and leading tokens that are not supported
//! - Country-name variant groups used by the country fallback and global stages
//! - `LeagueNameConverter` which applies the first two to a league name

use crate::utils::normalize;
use std::collections::{HashMap, HashSet};

/// Nationality adjective -> country name, matched on the exact stored form.
pub static NATIONALITY_TO_COUNTRY: &[(&str, &str)] = &[
    ("Spanish", "Spain"),
    ("English", "England"),
    ("Brazilian", "Brazil"),
    ("Argentine", "Argentina"),
    ("Argentinian", "Argentina"),
    ("German", "Germany"),
    ("French", "France"),
    ("Italian", "Italy"),
    ("Portuguese", "Portugal"),
    ("Dutch", "Netherlands"),
    ("Belgian", "Belgium"),
    ("Scottish", "Scotland"),
    ("Turkish", "Turkey"),
    ("Mexican", "Mexico"),
    ("Japanese", "Japan"),
    ("Chilean", "Chile"),
    ("Colombian", "Colombia"),
    ("Uruguayan", "Uruguay"),
];

/// League names (whole) or leading tokens the statistics source does not cover.
pub static INVALID_LEAGUES: &[&str] = &[
    "Women",
    "Womens",
    "Women's",
    "U17",
    "U19",
    "U20",
    "U21",
    "U23",
    "Youth",
    "Reserve",
    "Reserves",
    "Friendlies",
    "Club Friendlies",
    "International Friendlies",
    "Esoccer",
];

/// Country-name variants, all in normalized form.
pub static COUNTRY_GROUPS: &[&[&str]] = &[
    &["spain", "spanish", "espana"],
    &["brazil", "brazilian", "brasil"],
    &["argentina", "argentine", "argentinian"],
    &["germany", "german", "deutschland"],
    &["france", "french"],
    &["italy", "italian", "italia"],
    &["england", "english"],
    &["portugal", "portuguese"],
    &["netherlands", "dutch", "holland"],
    &["mexico", "mexican"],
];

/// Alias data passed into the converter and the matching engine.
#[derive(Debug, Clone)]
pub struct AliasTables {
    /// "Spanish" -> "Spain"
    nationality_to_country: HashMap<String, String>,
    invalid_leagues: HashSet<String>,
    /// Each group holds normalized variants of one country
    country_groups: Vec<Vec<String>>,
}

impl AliasTables {
    /// Create empty tables.
    pub fn empty() -> Self {
        Self {
            nationality_to_country: HashMap::new(),
            invalid_leagues: HashSet::new(),
            country_groups: Vec::new(),
        }
    }

    pub fn with_nationality(mut self, nationality: &str, country: &str) -> Self {
        self.nationality_to_country
            .insert(nationality.to_string(), country.to_string());
        self
    }

    pub fn with_invalid_league(mut self, league: &str) -> Self {
        self.invalid_leagues.insert(league.to_string());
        self
    }

    /// Add a variant group. Variants are normalized on insert.
    pub fn with_country_group(mut self, variants: &[&str]) -> Self {
        self.country_groups
            .push(variants.iter().map(|v| normalize(v)).collect());
        self
    }

    pub fn country_for(&self, nationality: &str) -> Option<&str> {
        self.nationality_to_country
            .get(nationality)
            .map(|s| s.as_str())
    }

    pub fn is_invalid(&self, league: &str) -> bool {
        self.invalid_leagues.contains(league)
    }

    /// The variant group containing `word`, if any.
    pub fn country_group(&self, word: &str) -> Option<&[String]> {
        let word = normalize(word);
        self.country_groups
            .iter()
            .find(|group| group.iter().any(|v| *v == word))
            .map(|group| group.as_slice())
    }

    /// Variants to try for a country-like word: its group, or the word alone.
    pub fn country_variants(&self, word: &str) -> Vec<String> {
        match self.country_group(word) {
            Some(group) => group.to_vec(),
            None => vec![normalize(word)],
        }
    }
}

impl Default for AliasTables {
    fn default() -> Self {
        let mut tables = Self::empty();
        for (nationality, country) in NATIONALITY_TO_COUNTRY {
            tables = tables.with_nationality(nationality, country);
        }
        for league in INVALID_LEAGUES {
            tables = tables.with_invalid_league(league);
        }
        for group in COUNTRY_GROUPS {
            tables = tables.with_country_group(group);
        }
        tables
    }
}

/// Result of converting a message-side league name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedLeague {
    pub name: String,
    pub is_valid: bool,
}

/// Rewrites the leading nationality token of a league name and flags validity.
#[derive(Debug, Clone, Default)]
pub struct LeagueNameConverter {
    tables: AliasTables,
}

impl LeagueNameConverter {
    pub fn new(tables: AliasTables) -> Self {
        Self { tables }
    }

    /// Convert a league name.
    ///
    /// Validity always looks at the original name, never the converted one.
    pub fn convert(&self, league: &str) -> ConvertedLeague {
        let words: Vec<&str> = league.split_whitespace().collect();
        let Some(first) = words.first() else {
            return ConvertedLeague {
                name: String::new(),
                is_valid: !self.tables.is_invalid(league),
            };
        };

        let name = match self.tables.country_for(first) {
            Some(country) => std::iter::once(country)
                .chain(words[1..].iter().copied())
                .collect::<Vec<_>>()
                .join(" "),
            None => league.trim().to_string(),
        };

        let is_valid = !(self.tables.is_invalid(first) || self.tables.is_invalid(league.trim()));

        ConvertedLeague { name, is_valid }
    }
}

// ============================================================================
// Tests
// ============================================================================
