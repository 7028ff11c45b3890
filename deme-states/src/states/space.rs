use crate::combinatorics::{composition_rank, composition_unrank};
use crate::states::{Init, State};
use crate::{Index, StateSpaceError};

use ahash::RandomState;
use rand::Rng;

use std::collections::HashSet;

/// The set of all states reachable from an initial
/// arrangement of genes, with a bijection between
/// its states and the indices `0..total_states()`.
///
/// Each group's counts are ranked independently as a
/// composition, and the per-group ranks are combined
/// as digits of a mixed-radix number, with group 0 as
/// the least significant digit.
#[derive(Clone, Debug)]
pub struct StateSpace {
    init: Init,
    dims: Vec<Index>,
    weights: Vec<Index>,
    total: Index,
}

impl StateSpace {
    /// Creates the state space of an initial configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Overflow`] if the number of states does
    /// not fit in an [`Index`].
    ///
    /// [`Overflow`]: StateSpaceError::Overflow
    /// [`Index`]: crate::Index
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, StateSpace};
    ///
    /// let space = StateSpace::new(Init::new(vec![1, 2, 3]).unwrap()).unwrap();
    /// assert_eq!(space.total_states(), 3 * 6 * 10);
    /// ```
    pub fn new(init: Init) -> Result<StateSpace, StateSpaceError> {
        let dims = init.dims()?;
        let mut weights = Vec::with_capacity(dims.len());
        let mut total: Index = 1;
        for &dim in &dims {
            weights.push(total);
            total = total.checked_mul(dim).ok_or(StateSpaceError::Overflow)?;
        }
        Ok(StateSpace {
            init,
            dims,
            weights,
            total,
        })
    }

    /// Returns the configuration the space was built from.
    pub fn init(&self) -> &Init {
        &self.init
    }

    /// Returns the number of demes.
    pub fn demes(&self) -> usize {
        self.init.demes()
    }

    /// Returns the number of distributions of each group.
    pub fn dims(&self) -> &[Index] {
        &self.dims
    }

    /// Returns the number of states in the space.
    pub fn total_states(&self) -> Index {
        self.total
    }

    /// Returns the index of a state vector.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedState`] if the vector does not
    /// belong to the space.
    ///
    /// [`MalformedState`]: StateSpaceError::MalformedState
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, StateSpace};
    ///
    /// let space = StateSpace::new(Init::new(vec![1, 2, 3]).unwrap()).unwrap();
    /// assert_eq!(space.state_to_index(&[1, 0, 0, 0, 2, 0, 0, 0, 3]), Ok(8));
    /// ```
    pub fn state_to_index(&self, counts: &[usize]) -> Result<Index, StateSpaceError> {
        self.init.validate(counts)?;
        self.rank(counts)
    }

    /// Returns the state with the passed index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not below
    /// [`total_states`].
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    /// [`total_states`]: StateSpace::total_states
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, StateSpace};
    ///
    /// let space = StateSpace::new(Init::new(vec![1, 2, 3]).unwrap()).unwrap();
    /// let state = space.index_to_state(8).unwrap();
    /// assert_eq!(state.counts(), &[1, 0, 0, 0, 2, 0, 0, 0, 3]);
    /// ```
    pub fn index_to_state(&self, idx: Index) -> Result<State, StateSpaceError> {
        if idx >= self.total {
            return Err(StateSpaceError::IndexOutOfRange(idx, self.total));
        }
        let demes = self.demes();
        let mut counts = Vec::with_capacity(self.init.state_len());
        for ((&dim, &weight), &genes) in self
            .dims
            .iter()
            .zip(self.weights.iter())
            .zip(self.init.counts())
        {
            counts.extend(composition_unrank((idx / weight) % dim, demes, genes)?);
        }
        Ok(State::from_parts(counts, self.init.demes_nonzero()))
    }

    /// Returns the indices of every state reachable from the
    /// state at `idx` through a single migration, sorted in
    /// ascending order.
    ///
    /// Each possible migration contributes one entry; the
    /// result is not deduplicated. Use [`neighbor_set`] if
    /// only the distinct neighbors are of interest.
    ///
    /// [`neighbor_set`]: StateSpace::neighbor_set
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not below
    /// [`total_states`].
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    /// [`total_states`]: StateSpace::total_states
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, StateSpace};
    ///
    /// let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
    /// // State(2, 0, 0, 1)
    /// assert_eq!(space.neighbors(2), Ok(vec![1, 5]));
    /// ```
    pub fn neighbors(&self, idx: Index) -> Result<Vec<Index>, StateSpaceError> {
        let state = self.index_to_state(idx)?;
        let demes = self.demes();

        let mut ids = Vec::new();
        for (group, counts) in state.groups().enumerate() {
            // A migration only changes its own group's digit.
            let weight = self.weights[group];
            let base = idx - composition_rank(counts)? * weight;
            let mut moved = counts.to_vec();
            for source in (0..demes).filter(|&s| counts[s] > 0) {
                for target in (0..demes).filter(|&t| t != source) {
                    moved[source] -= 1;
                    moved[target] += 1;
                    ids.push(base + composition_rank(&moved)? * weight);
                    moved[source] += 1;
                    moved[target] -= 1;
                }
            }
        }
        ids.sort_unstable();

        Ok(ids)
    }

    /// Returns the distinct indices reachable from the state
    /// at `idx` through a single migration.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not below
    /// [`total_states`].
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    /// [`total_states`]: StateSpace::total_states
    pub fn neighbor_set(&self, idx: Index) -> Result<HashSet<Index, RandomState>, StateSpaceError> {
        Ok(self.neighbors(idx)?.into_iter().collect())
    }

    /// Returns the index of the configuration's [home state],
    /// if it has one.
    ///
    /// [home state]: Init::home_state
    pub fn home_index(&self) -> Option<Index> {
        self.init
            .home_state()
            .and_then(|state| self.rank(state.counts()).ok())
    }

    /// Returns an iterator over all states, in index order.
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, StateSpace};
    ///
    /// let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
    /// for (idx, state) in space.iter().enumerate() {
    ///     assert_eq!(space.state_to_index(state.counts()), Ok(idx));
    /// }
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        (0..self.total).filter_map(move |idx| self.index_to_state(idx).ok())
    }

    /// Returns a state drawn uniformly at random from the space.
    ///
    /// # Examples
    /// ```
    /// use deme_states::{Init, StateSpace};
    ///
    /// let init = Init::new(vec![4, 2, 7]).unwrap();
    /// let space = StateSpace::new(init.clone()).unwrap();
    /// let state = space.random_state(&mut rand::thread_rng()).unwrap();
    /// assert_eq!(state.group_totals(), init.counts());
    /// ```
    pub fn random_state<R: Rng>(&self, rng: &mut R) -> Result<State, StateSpaceError> {
        self.index_to_state(rng.gen_range(0..self.total))
    }

    /// Ranks a vector already known to belong to the space.
    fn rank(&self, counts: &[usize]) -> Result<Index, StateSpaceError> {
        let mut idx = 0;
        for (group, &weight) in counts.chunks(self.demes()).zip(self.weights.iter()) {
            idx += composition_rank(group)? * weight;
        }
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::num::NonZeroUsize;

    fn space(counts: &[usize]) -> StateSpace {
        StateSpace::new(Init::new(counts.to_vec()).unwrap()).unwrap()
    }

    #[test]
    fn total_states() {
        assert_eq!(space(&[2, 1]).total_states(), 6);
        assert_eq!(space(&[1, 2, 3]).total_states(), 180);
        assert_eq!(space(&[0, 0]).total_states(), 1);
    }

    #[test]
    fn bijection_coverage() {
        let space = space(&[2, 1]);
        let mut seen = vec![false; space.total_states()];
        for a in 0..=2 {
            for b in 0..=1 {
                let idx = space.state_to_index(&[a, 2 - a, b, 1 - b]).unwrap();
                assert!(!seen[idx], "collision at {}", idx);
                seen[idx] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn known_indices() {
        let space = space(&[2, 1]);
        let expected = [
            ([0, 2, 0, 1], 0),
            ([1, 1, 0, 1], 1),
            ([2, 0, 0, 1], 2),
            ([0, 2, 1, 0], 3),
            ([1, 1, 1, 0], 4),
            ([2, 0, 1, 0], 5),
        ];
        for (counts, idx) in expected {
            assert_eq!(space.state_to_index(&counts), Ok(idx));
            assert_eq!(space.index_to_state(idx).unwrap().counts(), &counts);
        }
    }

    #[test]
    fn round_trip_and_conservation() {
        for counts in [vec![2, 1], vec![1, 2, 3], vec![3, 0, 1, 2]] {
            let space = space(&counts);
            for idx in 0..space.total_states() {
                let state = space.index_to_state(idx).unwrap();
                assert_eq!(state.group_totals(), counts);
                assert_eq!(space.state_to_index(state.counts()), Ok(idx));
            }
        }
    }

    #[test]
    fn round_trip_extra_demes() {
        let init = Init::with_demes(vec![3, 1], NonZeroUsize::new(4).unwrap()).unwrap();
        let space = StateSpace::new(init).unwrap();
        assert_eq!(space.total_states(), 20 * 4);
        for idx in 0..space.total_states() {
            let state = space.index_to_state(idx).unwrap();
            assert_eq!(state.counts().len(), 8);
            assert_eq!(space.state_to_index(state.counts()), Ok(idx));
        }
    }

    #[test]
    fn neighbors_fixture() {
        let space = space(&[1, 2, 3]);
        let idx = space.state_to_index(&[1, 0, 0, 0, 2, 0, 0, 0, 3]).unwrap();
        assert_eq!(idx, 8);
        let neighbors = space.neighbors(idx).unwrap();
        assert_eq!(neighbors, vec![5, 6, 7, 14, 26, 80]);
        for n in neighbors {
            assert_eq!(space.index_to_state(n).unwrap().group_totals(), vec![1, 2, 3]);
        }
    }

    #[test]
    fn neighbors_match_state_migrations() {
        let space = space(&[2, 1, 2]);
        for idx in 0..space.total_states() {
            let state = space.index_to_state(idx).unwrap();
            let mut expected: Vec<_> = state
                .neighbors()
                .iter()
                .map(|n| space.state_to_index(n.counts()).unwrap())
                .collect();
            expected.sort_unstable();
            assert_eq!(space.neighbors(idx), Ok(expected));
        }
    }

    #[test]
    fn neighbors_are_symmetric() {
        let space = space(&[2, 2]);
        for idx in 0..space.total_states() {
            for n in space.neighbors(idx).unwrap() {
                assert!(space.neighbor_set(n).unwrap().contains(&idx));
            }
        }
    }

    #[test]
    fn neighbor_set_size() {
        let space = space(&[2, 2]);
        let idx = space.state_to_index(&[1, 1, 1, 1]).unwrap();
        assert_eq!(idx, 4);
        assert_eq!(space.neighbors(idx), Ok(vec![1, 3, 5, 7]));
        assert_eq!(space.neighbor_set(idx).unwrap().len(), 4);
    }

    #[test]
    fn errors() {
        let space = space(&[2, 1]);
        assert!(matches!(
            space.state_to_index(&[1, 1, 0]),
            Err(StateSpaceError::MalformedState(_))
        ));
        assert_eq!(
            space.index_to_state(6),
            Err(StateSpaceError::IndexOutOfRange(6, 6))
        );
        assert_eq!(
            space.neighbors(6),
            Err(StateSpaceError::IndexOutOfRange(6, 6))
        );
    }

    #[test]
    fn overflow() {
        let init = Init::new(vec![1000; 40]).unwrap();
        assert_eq!(StateSpace::new(init).unwrap_err(), StateSpaceError::Overflow);
    }

    #[test]
    fn home_index() {
        assert_eq!(space(&[2, 1]).home_index(), Some(2));
        assert_eq!(space(&[1, 2, 3]).home_index(), Some(8));
        let init = Init::with_demes(vec![1, 1, 1], NonZeroUsize::new(2).unwrap()).unwrap();
        assert_eq!(StateSpace::new(init).unwrap().home_index(), None);
    }

    #[test]
    fn iter_in_index_order() {
        let space = space(&[1, 2]);
        let states: Vec<_> = space.iter().collect();
        assert_eq!(states.len(), space.total_states());
        for (idx, state) in states.iter().enumerate() {
            assert_eq!(space.state_to_index(state.counts()), Ok(idx));
        }
    }

    #[test]
    fn random_state_is_valid() {
        let space = space(&[3, 1, 4]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let state = space.random_state(&mut rng).unwrap();
            assert_eq!(state.group_totals(), vec![3, 1, 4]);
        }
    }
}
