//! Enumeration of population states in structured
//! (multi-deme) population-genetic models.
//!
//! Gene copies are sampled from several demes and then
//! traced as they migrate. A population state records how
//! many copies of each sampled group currently sit in each
//! deme. This crate provides:
//! - A bijection between states and the dense indices
//!   `0..total_states`, built from the combinatorial number
//!   system over compositions ([`StateSpace`]).
//! - The single-migration adjacency between states
//!   ([`StateSpace::neighbors`]).
//! - Migration rate models and the resulting generator
//!   matrix of the migration Markov chain ([`transitions`]).
//! - Stochastic simulation of that chain, with snapshot
//!   logging ([`walks`]).
//! - Hitting probabilities of the first coalescence under
//!   per-deme population sizes and mutation rates
//!   ([`hitting`]).
//!
//! # Example usage: migration between two demes
//! ```
//! use deme_states::transitions::{MigrationConfig, TransitionGenerator};
//! use deme_states::walks::logging::{ReportingLevel, WalkLogger};
//! use deme_states::walks::MigrationWalk;
//! use deme_states::{Init, StateSpace};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::num::NonZeroUsize;
//!
//! fn main() {
//!     // Two genes sampled in deme 0, one in deme 1.
//!     let init = Init::new(vec![2, 1]).unwrap();
//!     let space = StateSpace::new(init).unwrap();
//!     assert_eq!(space.total_states(), 6);
//!
//!     let home = space.home_index().unwrap();
//!     let state = space.index_to_state(home).unwrap();
//!     println!("{} has index {}", state, home);
//!     println!("neighbors: {:?}", space.neighbors(home).unwrap());
//!
//!     let model = MigrationConfig::uniform(NonZeroUsize::new(2).unwrap(), 0.5);
//!     let generator = TransitionGenerator::new(&space, &model).unwrap();
//!     let mut walk = MigrationWalk::new(generator, home, StdRng::seed_from_u64(42)).unwrap();
//!     let mut logger = WalkLogger::new(ReportingLevel::FullState);
//!
//!     for _ in 0..20 {
//!         if walk.step().unwrap().is_none() {
//!             break;
//!         }
//!         logger.log(&walk).unwrap();
//!     }
//!     for log in logger.iter() {
//!         println!("{}", log);
//!     }
//! }
//! ```

mod combinatorics;
mod errors;
pub mod hitting;
mod states;
pub mod transitions;
pub mod walks;

pub use combinatorics::*;
pub use errors::{Malformation, StateSpaceError};
pub use states::*;

/// Position of a state in the enumeration
/// of its state space.
pub type Index = usize;
