use crate::combinatorics::composition_count;
use crate::states::State;
use crate::{Index, Malformation, StateSpaceError};

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// An initial arrangement of genes: the number of
/// gene copies in each gene group, and the number
/// of demes those copies are distributed over.
///
/// Under the default layout there are as many demes
/// as groups, and group `g` consists of the genes
/// sampled in deme `g`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Init {
    counts: Vec<usize>,
    demes: NonZeroUsize,
}

impl Init {
    /// Creates a configuration with one deme per gene group.
    ///
    /// # Errors
    ///
    /// Returns [`NoDemes`] if `counts` is empty.
    ///
    /// [`NoDemes`]: StateSpaceError::NoDemes
    ///
    /// # Examples
    /// ```
    /// use deme_states::Init;
    ///
    /// let init = Init::new(vec![1, 2, 3]).unwrap();
    /// assert_eq!(init.demes(), 3);
    /// assert_eq!(init.groups(), 3);
    /// assert_eq!(init.total_genes(), 6);
    /// ```
    pub fn new(counts: Vec<usize>) -> Result<Init, StateSpaceError> {
        let demes = NonZeroUsize::new(counts.len()).ok_or(StateSpaceError::NoDemes)?;
        Ok(Init { counts, demes })
    }

    /// Creates a configuration with an arbitrary number
    /// of demes.
    ///
    /// # Errors
    ///
    /// Returns [`NoDemes`] if `counts` is empty.
    ///
    /// [`NoDemes`]: StateSpaceError::NoDemes
    ///
    /// # Examples
    /// ```
    /// use deme_states::Init;
    /// use std::num::NonZeroUsize;
    ///
    /// let init = Init::with_demes(vec![4], NonZeroUsize::new(3).unwrap()).unwrap();
    /// assert_eq!(init.state_len(), 3);
    /// ```
    pub fn with_demes(counts: Vec<usize>, demes: NonZeroUsize) -> Result<Init, StateSpaceError> {
        if counts.is_empty() {
            return Err(StateSpaceError::NoDemes);
        }
        Ok(Init { counts, demes })
    }

    /// Returns the number of demes.
    pub fn demes(&self) -> usize {
        self.demes.get()
    }

    /// Returns the number of demes as a [`NonZeroUsize`],
    /// ready to size a migration model.
    pub fn demes_nonzero(&self) -> NonZeroUsize {
        self.demes
    }

    /// Returns the number of gene groups.
    pub fn groups(&self) -> usize {
        self.counts.len()
    }

    /// Returns the number of gene copies in each group.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Returns the number of gene copies over all groups.
    pub fn total_genes(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Returns the length of the state vectors
    /// belonging to this configuration.
    pub fn state_len(&self) -> usize {
        self.demes() * self.groups()
    }

    /// Returns the number of ways each group's genes can be
    /// distributed over the demes.
    ///
    /// # Examples
    /// ```
    /// use deme_states::Init;
    ///
    /// let init = Init::new(vec![1, 2, 3]).unwrap();
    /// assert_eq!(init.dims(), Ok(vec![3, 6, 10]));
    /// ```
    pub fn dims(&self) -> Result<Vec<Index>, StateSpaceError> {
        self.counts
            .iter()
            .map(|&genes| composition_count(self.demes(), genes))
            .collect()
    }

    /// Returns the state in which every group's genes
    /// sit in their home deme (group `g` in deme `g`),
    /// or `None` if there are more groups than demes.
    ///
    /// # Examples
    /// ```
    /// use deme_states::Init;
    ///
    /// let init = Init::new(vec![2, 1]).unwrap();
    /// let home = init.home_state().unwrap();
    /// assert_eq!(home.counts(), &[2, 0, 0, 1]);
    /// ```
    pub fn home_state(&self) -> Option<State> {
        let demes = self.demes();
        if self.groups() > demes {
            return None;
        }
        let mut counts = vec![0; self.state_len()];
        for (group, &genes) in self.counts.iter().enumerate() {
            counts[group * demes + group] = genes;
        }
        Some(State::from_parts(counts, self.demes))
    }

    /// Checks that a state vector belongs to this configuration:
    /// it has one entry per (group, deme) pair, and each group's
    /// entries add up to the group's gene count.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedState`] describing the first
    /// violation found.
    ///
    /// [`MalformedState`]: StateSpaceError::MalformedState
    pub fn validate(&self, counts: &[usize]) -> Result<(), StateSpaceError> {
        let expected = self.state_len();
        if counts.len() != expected {
            return Err(StateSpaceError::MalformedState(Malformation::Length {
                expected,
                found: counts.len(),
            }));
        }
        for (group, (slice, &expected)) in counts
            .chunks(self.demes())
            .zip(self.counts.iter())
            .enumerate()
        {
            let found = slice.iter().fold(0usize, |sum, &c| sum.saturating_add(c));
            if found != expected {
                return Err(StateSpaceError::MalformedState(Malformation::GeneCount {
                    group,
                    expected,
                    found,
                }));
            }
        }
        Ok(())
    }
}
