//! Fixture dataset access.
//!
//! The dataset directory is filled by an external refresh job; this module
//! reads the newest snapshot and prunes old files.

pub mod index;
pub mod retention;

pub use index::{latest_dataset_file, FixtureIndex, FixtureRecord, LeagueFixtures, TimeSlot};
pub use retention::{dataset_file_date, dataset_file_name, prune_dataset_dir, PruneReport};
