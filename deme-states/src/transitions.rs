//! Continuous-time migration dynamics over a state space.
//!
//! A [`MigrationModel`] gives the rate at which a single gene
//! copy moves between two demes. A [`TransitionGenerator`]
//! combines it with a [`StateSpace`] to produce the rate of
//! every single-migration transition, i.e. the generator
//! matrix of the migration Markov chain in triplet form.
mod config;

pub use config::MigrationConfig;

use crate::{Index, StateSpace, StateSpaceError};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

/// An interface for per-copy migration rates between demes.
///
/// Migration is viewed backward in time, as in coalescent
/// models: `migration_rate(i, j)` is the rate at which the
/// lineage of a gene copy currently in deme `i` moves to
/// deme `j`.
pub trait MigrationModel {
    /// Returns the number of demes the model covers.
    fn demes(&self) -> usize;

    /// Returns the per-copy rate of migration from deme
    /// `source` to deme `target`.
    fn migration_rate(&self, source: usize, target: usize) -> f64;
}

/// A single entry of the generator matrix.
///
/// Diagonal entries (`from == to`) hold the negated
/// total rate of leaving `from`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Index,
    pub to: Index,
    pub rate: f64,
}

/// Computes migration transition rates between the
/// states of a state space.
pub struct TransitionGenerator<'a, M> {
    space: &'a StateSpace,
    model: &'a M,
}

impl<'a, M> Clone for TransitionGenerator<'a, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M> Copy for TransitionGenerator<'a, M> {}

impl<'a, M: MigrationModel> TransitionGenerator<'a, M> {
    /// Pairs a state space with a migration model.
    ///
    /// # Errors
    ///
    /// Returns [`DemeMismatch`] if the model and the space
    /// disagree on the number of demes.
    ///
    /// [`DemeMismatch`]: StateSpaceError::DemeMismatch
    ///
    /// # Examples
    /// ```
    /// use deme_states::transitions::{MigrationConfig, TransitionGenerator};
    /// use deme_states::{Init, StateSpace};
    /// use std::num::NonZeroUsize;
    ///
    /// let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
    /// let model = MigrationConfig::uniform(NonZeroUsize::new(2).unwrap(), 0.5);
    /// let generator = TransitionGenerator::new(&space, &model).unwrap();
    ///
    /// // State(2, 0, 0, 1): either copy of group 0 can move to deme 1,
    /// // or the single copy of group 1 can move to deme 0.
    /// assert_eq!(generator.outgoing(2), Ok(vec![(1, 1.0), (5, 0.5)]));
    /// ```
    pub fn new(
        space: &'a StateSpace,
        model: &'a M,
    ) -> Result<TransitionGenerator<'a, M>, StateSpaceError> {
        if space.demes() != model.demes() {
            return Err(StateSpaceError::DemeMismatch {
                expected: space.demes(),
                found: model.demes(),
            });
        }
        Ok(TransitionGenerator { space, model })
    }

    /// Returns the underlying state space.
    pub fn space(&self) -> &'a StateSpace {
        self.space
    }

    /// Returns the underlying migration model.
    pub fn model(&self) -> &'a M {
        self.model
    }

    /// Returns the `(target index, rate)` pairs of every
    /// transition out of the state at `idx`, sorted by
    /// target index.
    ///
    /// A move of one copy from a position holding `n` copies,
    /// from deme `i` to deme `j`, has rate `n ⨯ m(i, j)`. Moves
    /// reaching the same state are merged, and moves with no
    /// positive rate are left out.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not a state index,
    /// and [`InvalidRate`] if the model gives a NaN or infinite
    /// rate for a move out of the state.
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    /// [`InvalidRate`]: StateSpaceError::InvalidRate
    pub fn outgoing(&self, idx: Index) -> Result<Vec<(Index, f64)>, StateSpaceError> {
        let state = self.space.index_to_state(idx)?;
        let demes = state.demes();

        let mut rates: HashMap<Index, f64, RandomState> = HashMap::default();
        for (source, target) in state.migrations() {
            let (from_deme, to_deme) = (source % demes, target % demes);
            let per_copy = self.model.migration_rate(from_deme, to_deme);
            if !per_copy.is_finite() {
                return Err(StateSpaceError::InvalidRate {
                    source: from_deme,
                    target: to_deme,
                });
            }
            let rate = state.counts()[source] as f64 * per_copy;
            if rate <= 0.0 {
                continue;
            }
            if let Some(moved) = state.migrate(source, target) {
                let to = self.space.state_to_index(moved.counts())?;
                *rates.entry(to).or_insert(0.0) += rate;
            }
        }

        let mut rates: Vec<_> = rates.into_iter().collect();
        rates.sort_unstable_by_key(|&(to, _)| to);
        Ok(rates)
    }

    /// Returns the total rate of leaving the state at `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not a state index.
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    pub fn exit_rate(&self, idx: Index) -> Result<f64, StateSpaceError> {
        Ok(self.outgoing(idx)?.iter().map(|&(_, rate)| rate).sum())
    }

    /// Returns every non-zero entry of the generator matrix,
    /// state by state: the outgoing transitions of a state,
    /// followed by its diagonal entry.
    ///
    /// # Examples
    /// ```
    /// use deme_states::transitions::{MigrationConfig, TransitionGenerator};
    /// use deme_states::{Init, StateSpace};
    /// use std::num::NonZeroUsize;
    ///
    /// let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
    /// let model = MigrationConfig::uniform(NonZeroUsize::new(2).unwrap(), 0.5);
    /// let generator = TransitionGenerator::new(&space, &model).unwrap();
    ///
    /// // Rows of a generator matrix sum to zero.
    /// for from in 0..space.total_states() {
    ///     let row_sum: f64 = generator
    ///         .transitions()
    ///         .unwrap()
    ///         .iter()
    ///         .filter(|t| t.from == from)
    ///         .map(|t| t.rate)
    ///         .sum();
    ///     assert!(row_sum.abs() < 1e-12);
    /// }
    /// ```
    pub fn transitions(&self) -> Result<Vec<Transition>, StateSpaceError> {
        let mut transitions = Vec::new();
        for from in 0..self.space.total_states() {
            let outgoing = self.outgoing(from)?;
            let total: f64 = outgoing.iter().map(|&(_, rate)| rate).sum();
            transitions.extend(
                outgoing
                    .into_iter()
                    .map(|(to, rate)| Transition { from, to, rate }),
            );
            transitions.push(Transition {
                from,
                to: from,
                rate: -total,
            });
        }
        Ok(transitions)
    }
}
