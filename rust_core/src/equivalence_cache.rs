//! Equivalence cache for learned message-side -> canonical name mappings.
//!
//! This module provides:
//! - Lookup keyed on the normalized message-side name
//! - First-write-wins inserts, entries are never overwritten or removed
//! - Synchronous JSON persistence of the full table on every new entry
//!
//! One instance holds league names, a separate one holds team names.

use crate::error::{ResolveError, Result};
use crate::utils::normalize;
use log::{info, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persistent normalized-name -> canonical-name table.
#[derive(Debug, Default)]
pub struct EquivalenceCache {
    /// Backing file, `None` for a memory-only cache
    path: Option<PathBuf>,
    /// "normalized message name" -> "canonical dataset name"
    entries: Mutex<BTreeMap<String, String>>,
}

impl EquivalenceCache {
    /// Create an empty cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from a JSON file. A missing or unreadable file gives an empty cache
    /// that will be written to `path` on the first new entry.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<serde_json::Map<String, Value>>(&content) {
                Ok(raw) => rebuild_entries(raw, &path),
                Err(e) => {
                    warn!("Ignoring unparsable equivalence cache {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read equivalence cache {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        info!(
            "Loaded {} equivalences from {}",
            entries.len(),
            path.display()
        );

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// Canonical name learned for a message-side name.
    pub fn get(&self, name: &str) -> Option<String> {
        self.entries.lock().get(&normalize(name)).cloned()
    }

    /// Record an equivalence.
    ///
    /// Returns `Ok(false)` when the normalized key already exists. On a new
    /// entry the whole table is written while the lock is held, so concurrent
    /// writers on one instance cannot lose each other's updates. If the write
    /// fails the entry stays in memory and `CachePersistFailure` is returned.
    pub fn put(&self, name: &str, canonical: &str) -> Result<bool> {
        let key = normalize(name);
        if key.is_empty() {
            return Ok(false);
        }

        let mut entries = self.entries.lock();
        if entries.contains_key(&key) {
            return Ok(false);
        }
        entries.insert(key, canonical.to_string());

        if let Some(path) = &self.path {
            write_table(path, &entries).map_err(|source| ResolveError::CachePersistFailure {
                path: path.clone(),
                source,
            })?;
        }
        Ok(true)
    }

    /// Get number of equivalences.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of all entries, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().clone()
    }
}

/// Re-key a stored table by normalized name, in file order.
///
/// Keys that collide after normalization keep the first entry.
fn rebuild_entries(
    raw: serde_json::Map<String, Value>,
    path: &Path,
) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for (name, canonical) in raw {
        let Value::String(canonical) = canonical else {
            warn!("Skipping non-string equivalence {:?} in {}", name, path.display());
            continue;
        };
        let key = normalize(&name);
        if key.is_empty() {
            continue;
        }
        entries.entry(key).or_insert(canonical);
    }
    entries
}

/// Write through a sibling temp file so a failed write never truncates the table.
fn write_table(path: &Path, entries: &BTreeMap<String, String>) -> io::Result<()> {
    let content = serde_json::to_string_pretty(entries)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}

// ============================================================================
// Tests
// ============================================================================
