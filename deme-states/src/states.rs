//! Population states are arrangements of gene copies
//! over demes. Gene copies are grouped by where they
//! were sampled, and migration moves single copies
//! between demes within their group.
//!
//! The functions in this module are shorthands that
//! build a [`StateSpace`] for a single query. Code making
//! many queries against the same configuration should
//! build the space once and reuse it.
mod init;
mod space;
mod state;

pub use init::Init;
pub use space::StateSpace;
pub use state::State;

use crate::{Index, StateSpaceError};

/// Returns the number of states reachable from `init`.
///
/// # Examples
/// ```
/// use deme_states::{total_states, Init};
///
/// assert_eq!(total_states(&Init::new(vec![2, 1]).unwrap()), Ok(6));
/// ```
pub fn total_states(init: &Init) -> Result<Index, StateSpaceError> {
    Ok(StateSpace::new(init.clone())?.total_states())
}

/// Returns the index of `state` in the state space of `init`.
///
/// # Examples
/// ```
/// use deme_states::{state_to_index, Init};
///
/// let init = Init::new(vec![2, 1]).unwrap();
/// assert_eq!(state_to_index(&init, &[2, 0, 1, 0]), Ok(5));
/// assert!(state_to_index(&init, &[1, 1, 0]).is_err());
/// ```
pub fn state_to_index(init: &Init, state: &[usize]) -> Result<Index, StateSpaceError> {
    StateSpace::new(init.clone())?.state_to_index(state)
}

/// Returns the counts of the state at `idx` in the
/// state space of `init`.
///
/// # Examples
/// ```
/// use deme_states::{index_to_state, Init};
///
/// let init = Init::new(vec![2, 1]).unwrap();
/// assert_eq!(index_to_state(&init, 5), Ok(vec![2, 0, 1, 0]));
/// assert!(index_to_state(&init, 6).is_err());
/// ```
pub fn index_to_state(init: &Init, idx: Index) -> Result<Vec<usize>, StateSpaceError> {
    Ok(StateSpace::new(init.clone())?
        .index_to_state(idx)?
        .into_counts())
}

/// Returns the sorted, non-deduplicated indices of the
/// single-migration neighbors of the state at `idx`.
///
/// See [`StateSpace::neighbors`].
///
/// # Examples
/// ```
/// use deme_states::{neighbors, Init};
///
/// let init = Init::new(vec![1, 2, 3]).unwrap();
/// assert_eq!(neighbors(&init, 8), Ok(vec![5, 6, 7, 14, 26, 80]));
/// ```
pub fn neighbors(init: &Init, idx: Index) -> Result<Vec<Index>, StateSpaceError> {
    StateSpace::new(init.clone())?.neighbors(idx)
}
