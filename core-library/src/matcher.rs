//! Item correspondence rules between two libraries
//!
//! Each variant defines two relations:
//! - **exact state**: the two items agree on identity and watch state, so
//!   nothing needs to happen
//! - **identity**: the two items are the same title, regardless of progress
//!
//! Both are plain key equality; there is no fuzzy matching.

use crate::models::{Episode, MediaItem, Movie};

/// Comparator pair used by the reconciler for one variant
pub trait MatchRules<T: MediaItem>: Send + Sync {
    /// Items agree on identity keys and on watch state
    fn exact_state(&self, a: &T, b: &T) -> bool;

    /// Items denote the same title
    fn same_identity(&self, a: &T, b: &T) -> bool;
}

/// Movie rules.
///
/// Exact state compares the cross-reference number with the progress fields;
/// identity is label plus year.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieRules;

impl MatchRules<Movie> for MovieRules {
    fn exact_state(&self, a: &Movie, b: &Movie) -> bool {
        a.external_number == b.external_number && a.state.same_progress(&b.state)
    }

    fn same_identity(&self, a: &Movie, b: &Movie) -> bool {
        a.label() == b.label() && a.year == b.year
    }
}

/// Episode rules.
///
/// Episode ids are library-local, so exact state uses label and show title
/// with the progress fields; identity is label plus show title.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeRules;

impl MatchRules<Episode> for EpisodeRules {
    fn exact_state(&self, a: &Episode, b: &Episode) -> bool {
        self.same_identity(a, b) && a.state.same_progress(&b.state)
    }

    fn same_identity(&self, a: &Episode, b: &Episode) -> bool {
        a.label() == b.label() && a.show_title == b.show_title
    }
}
