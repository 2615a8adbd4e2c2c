//! Point-in-time catalogs of one library

use crate::models::{Episode, MediaItem, Movie};
use serde::{Deserialize, Serialize};

/// Items of one variant plus whether the source actually produced data.
///
/// An empty list with `has_data = true` is a legitimate empty library; a
/// failed fetch is represented by `has_data = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    #[serde(default)]
    pub items: Vec<T>,

    #[serde(default)]
    pub has_data: bool,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Snapshot<T> {
    /// Snapshot of a source that returned nothing usable
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_data: false,
        }
    }

    /// Snapshot of a successful fetch (possibly zero items)
    pub fn loaded(items: Vec<T>) -> Self {
        Self {
            items,
            has_data: true,
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: MediaItem> Snapshot<T> {
    pub fn count_watched(&self) -> usize {
        self.items.iter().filter(|i| i.state().is_watched()).count()
    }

    pub fn count_resumable(&self) -> usize {
        self.items.iter().filter(|i| i.state().is_resumable()).count()
    }

    pub fn outdated(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|i| i.is_outdated())
    }
}

/// Full state of one library: movies and episodes.
///
/// This is the unit persisted to the snapshot cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    #[serde(default)]
    pub movies: Snapshot<Movie>,

    #[serde(default)]
    pub episodes: Snapshot<Episode>,
}

impl LibrarySnapshot {
    pub fn new(movies: Snapshot<Movie>, episodes: Snapshot<Episode>) -> Self {
        Self { movies, episodes }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Both variants were obtained
    pub fn has_results(&self) -> bool {
        self.movies.has_data && self.episodes.has_data
    }

    pub fn outdated_count(&self) -> usize {
        self.movies.outdated().count() + self.episodes.outdated().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies() -> Snapshot<Movie> {
        Snapshot::loaded(vec![
            Movie::new(1, "Dune", "2021").with_play_count(1),
            Movie::new(2, "Arrival", "2016").with_resume(1200, 6960),
            Movie::new(3, "Heat", "1995").with_play_count(3).with_resume(50, 10200),
            Movie::new(4, "Alien", "1979"),
        ])
    }

    #[test]
    fn test_counts() {
        let snapshot = movies();
        assert_eq!(snapshot.count(), 4);
        assert_eq!(snapshot.count_watched(), 2);
        assert_eq!(snapshot.count_resumable(), 2);
    }

    #[test]
    fn test_counts_follow_items() {
        let mut snapshot = movies();
        snapshot.items[3].state.play_count = 1;
        snapshot.items.remove(0);
        assert_eq!(snapshot.count(), 3);
        assert_eq!(snapshot.count_watched(), 2);
    }

    #[test]
    fn test_empty_result_still_has_data() {
        let snapshot: Snapshot<Episode> = Snapshot::loaded(Vec::new());
        assert!(snapshot.has_data);
        assert!(snapshot.is_empty());

        let failed: Snapshot<Episode> = Snapshot::empty();
        assert!(!failed.has_data);
    }

    #[test]
    fn test_has_results_requires_both() {
        let mut library = LibrarySnapshot::new(movies(), Snapshot::empty());
        assert!(!library.has_results());

        library.episodes = Snapshot::loaded(Vec::new());
        assert!(library.has_results());
        assert!(!LibrarySnapshot::empty().has_results());
    }

    #[test]
    fn test_outdated_count() {
        let mut library = LibrarySnapshot::new(
            movies(),
            Snapshot::loaded(vec![Episode::new(9, "Show", "Pilot")]),
        );
        assert_eq!(library.outdated_count(), 0);

        library.movies.items[0].state.resume_outdated = true;
        library.episodes.items[0].state.watched_outdated = true;
        assert_eq!(library.outdated_count(), 2);
    }

    #[test]
    fn test_library_snapshot_json_layout() {
        let library = LibrarySnapshot::new(movies(), Snapshot::loaded(Vec::new()));
        let json = serde_json::to_value(&library).unwrap();

        assert_eq!(json["movies"]["has_data"], true);
        assert_eq!(json["movies"]["items"][0]["movieid"], 1);
        assert_eq!(json["episodes"]["items"].as_array().unwrap().len(), 0);

        let decoded: LibrarySnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, library);
    }
}
