//! # Watch-State Reconciler
//!
//! Merges the watch state of one library (the subject) with a second library
//! (the reference).
//!
//! ## Algorithm
//!
//! 1. Clear the outdated flags of every subject item.
//! 2. Every subject item without an exact-state twin in the reference is a
//!    candidate.
//! 3. Each candidate looks up its counterpart by identity:
//!    - none: the candidate is left alone
//!    - one: play count and resume position each become the maximum of the
//!      two sides, and the matching outdated flag is raised when the value
//!      changed
//!    - several that all share the same progress: merged as if there were one
//!    - several that disagree: the candidate is skipped and counted as ambiguous
//!
//! Only the subject is mutated. Because both fields merge with `max`, running
//! the pass twice changes nothing the second time, and reconciling A against
//! B then B against A leaves matched pairs in agreement.

use core_library::matcher::MatchRules;
use core_library::models::MediaItem;
use tracing::{debug, trace, warn};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone)]
pub struct Reconciliation<T> {
    /// Subject items that lacked an exact-state twin, after merging
    pub candidates: Vec<T>,

    /// Candidates whose state changed and must be pushed to the subject library
    pub outdated: Vec<T>,

    /// Candidates whose play count was raised
    pub watched_mismatches: usize,

    /// Candidates whose resume position was raised
    pub resume_mismatches: usize,

    /// Candidates skipped because several reference items share their identity
    /// but disagree on progress
    pub ambiguous: usize,
}

impl<T> Default for Reconciliation<T> {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            outdated: Vec::new(),
            watched_mismatches: 0,
            resume_mismatches: 0,
            ambiguous: 0,
        }
    }
}

impl<T> Reconciliation<T> {
    pub fn is_clean(&self) -> bool {
        self.outdated.is_empty()
    }
}

/// Reconcile `subject` against `reference` using the variant's rules.
pub fn reconcile<T, R>(subject: &mut [T], reference: &[T], rules: &R) -> Reconciliation<T>
where
    T: MediaItem,
    R: MatchRules<T> + ?Sized,
{
    let mut outcome = Reconciliation::default();

    for item in subject.iter_mut() {
        item.state_mut().reset_flags();
    }

    for item in subject.iter_mut() {
        if reference.iter().any(|other| rules.exact_state(item, other)) {
            continue;
        }

        let counterparts: Vec<&T> = reference
            .iter()
            .filter(|other| rules.same_identity(item, other))
            .collect();

        let counterpart = match counterparts.as_slice() {
            [] => {
                trace!(item = %item.display_name(), "No counterpart found");
                None
            }
            [only] => Some(*only),
            [first, rest @ ..] if rest.iter().all(|c| c.state().same_progress(first.state())) => {
                debug!(
                    item = %item.display_name(),
                    matches = counterparts.len(),
                    "Several counterparts agree on progress"
                );
                Some(*first)
            }
            several => {
                warn!(
                    item = %item.display_name(),
                    matches = several.len(),
                    "Several counterparts disagree on progress, skipping"
                );
                outcome.ambiguous += 1;
                None
            }
        };

        if let Some(counterpart) = counterpart {
            merge(item, counterpart);
            let state = item.state();
            if state.watched_outdated {
                outcome.watched_mismatches += 1;
            }
            if state.resume_outdated {
                outcome.resume_mismatches += 1;
            }
            if state.is_outdated() {
                debug!(
                    item = %item.display_name(),
                    play_count = state.play_count,
                    resume_position = state.resume.position,
                    "Watch state behind counterpart"
                );
                outcome.outdated.push(item.clone());
            }
        }

        outcome.candidates.push(item.clone());
    }

    outcome
}

/// Raise the item's progress to the counterpart's where it is further along
fn merge<T: MediaItem>(item: &mut T, counterpart: &T) {
    let theirs = counterpart.state();
    let ours = item.state_mut();

    if theirs.play_count > ours.play_count {
        ours.play_count = theirs.play_count;
        ours.watched_outdated = true;
    }
    if theirs.resume.position > ours.resume.position {
        ours.resume.position = theirs.resume.position;
        ours.resume_outdated = true;
    }
}
