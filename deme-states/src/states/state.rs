use crate::states::Init;
use crate::StateSpaceError;

use serde::{Deserialize, Serialize};

use std::fmt;
use std::num::NonZeroUsize;

/// The current location of every gene copy.
///
/// Stored as a flat vector of counts grouped by gene
/// group: entry `g * demes + d` is the number of copies
/// of group `g` currently in deme `d`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct State {
    counts: Vec<usize>,
    demes: NonZeroUsize,
}

impl State {
    /// Creates a state belonging to the passed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedState`] if `counts` has the wrong
    /// length or a group's counts do not add up to its total.
    ///
    /// [`MalformedState`]: StateSpaceError::MalformedState
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, State};
    ///
    /// let init = Init::new(vec![2, 1]).unwrap();
    /// assert!(State::new(&init, vec![1, 1, 0, 1]).is_ok());
    /// assert!(State::new(&init, vec![1, 1, 1, 1]).is_err());
    /// ```
    pub fn new(init: &Init, counts: Vec<usize>) -> Result<State, StateSpaceError> {
        init.validate(&counts)?;
        Ok(State::from_parts(counts, init.demes_nonzero()))
    }

    pub(crate) fn from_parts(counts: Vec<usize>, demes: NonZeroUsize) -> State {
        State { counts, demes }
    }

    /// Returns the flat vector of counts.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Consumes the state, returning its counts.
    pub fn into_counts(self) -> Vec<usize> {
        self.counts
    }

    /// Returns the number of demes.
    pub fn demes(&self) -> usize {
        self.demes.get()
    }

    /// Returns an iterator over each group's counts.
    pub fn groups(&self) -> impl Iterator<Item = &[usize]> {
        self.counts.chunks(self.demes.get())
    }

    /// Returns the number of gene copies in each group.
    pub fn group_totals(&self) -> Vec<usize> {
        self.groups().map(|g| g.iter().sum()).collect()
    }

    /// Returns the number of gene copies currently in
    /// each deme, regardless of their group.
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, State};
    ///
    /// let init = Init::new(vec![2, 1]).unwrap();
    /// let state = State::new(&init, vec![1, 1, 0, 1]).unwrap();
    /// assert_eq!(state.deme_totals(), vec![1, 2]);
    /// ```
    pub fn deme_totals(&self) -> Vec<usize> {
        let mut totals = vec![0; self.demes()];
        for group in self.groups() {
            for (total, &c) in totals.iter_mut().zip(group) {
                *total += c;
            }
        }
        totals
    }

    /// Returns the state resulting from a single gene copy
    /// moving from position `source` to position `target`.
    ///
    /// Returns `None` if there is nothing to move, the positions
    /// are the same, or they belong to different gene groups.
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, State};
    ///
    /// let init = Init::new(vec![2, 1]).unwrap();
    /// let state = State::new(&init, vec![2, 0, 0, 1]).unwrap();
    ///
    /// assert_eq!(state.migrate(0, 1).unwrap().counts(), &[1, 1, 0, 1]);
    /// // No copies of group 0 in deme 1.
    /// assert!(state.migrate(1, 0).is_none());
    /// // Copies cannot change group.
    /// assert!(state.migrate(0, 2).is_none());
    /// ```
    pub fn migrate(&self, source: usize, target: usize) -> Option<State> {
        let demes = self.demes();
        if source == target
            || source / demes != target / demes
            || target >= self.counts.len()
            || *self.counts.get(source)? == 0
        {
            return None;
        }
        let mut counts = self.counts.clone();
        counts[source] -= 1;
        counts[target] += 1;
        Some(State::from_parts(counts, self.demes))
    }

    /// Returns an iterator over every `(source, target)`
    /// pair of positions for which a single migration
    /// is possible, ordered by source then target.
    pub fn migrations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let demes = self.demes();
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .flat_map(move |(source, _)| {
                let group = source / demes;
                (group * demes..(group + 1) * demes)
                    .filter(move |&target| target != source)
                    .map(move |target| (source, target))
            })
    }

    /// Returns every state differing from this one by
    /// a single migration, in [`migrations`] order.
    ///
    /// [`migrations`]: State::migrations
    pub fn neighbors(&self) -> Vec<State> {
        self.migrations()
            .filter_map(|(source, target)| self.migrate(source, target))
            .collect()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "State({})",
            self.counts
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
