//! Stochastic simulation of the migration Markov chain.
//!
//! A [`MigrationWalk`] follows the jump chain of a
//! [`TransitionGenerator`]: it waits an exponentially
//! distributed time in each state, then jumps to one of
//! its neighbors with probability proportional to the
//! transition rate. Walks can be recorded with a
//! [`WalkLogger`](logging::WalkLogger).
pub mod logging;
mod sampler;

pub use sampler::RateSampler;

use crate::transitions::{MigrationModel, TransitionGenerator};
use crate::{Index, State, StateSpace, StateSpaceError};

use rand::Rng;

/// A single realisation of the migration process.
pub struct MigrationWalk<'a, M, R: Rng> {
    generator: TransitionGenerator<'a, M>,
    sampler: RateSampler<R>,
    current: Index,
    time: f64,
    steps: usize,
}

impl<'a, M: MigrationModel, R: Rng> MigrationWalk<'a, M, R> {
    /// Starts a walk at the state with index `start`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `start` is not a
    /// state index.
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    pub fn new(
        generator: TransitionGenerator<'a, M>,
        start: Index,
        rng: R,
    ) -> Result<MigrationWalk<'a, M, R>, StateSpaceError> {
        let total = generator.space().total_states();
        if start >= total {
            return Err(StateSpaceError::IndexOutOfRange(start, total));
        }
        Ok(MigrationWalk {
            generator,
            sampler: RateSampler::new(rng),
            current: start,
            time: 0.0,
            steps: 0,
        })
    }

    /// Advances the walk by one migration, returning the
    /// index of the new state, or `None` if no migration
    /// out of the current state is possible. The walk is
    /// left unchanged in the latter case.
    ///
    /// # Examples
    /// ```
    /// use deme_states::transitions::{MigrationConfig, TransitionGenerator};
    /// use deme_states::walks::MigrationWalk;
    /// use deme_states::{Init, StateSpace};
    /// use std::num::NonZeroUsize;
    ///
    /// let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
    /// let model = MigrationConfig::uniform(NonZeroUsize::new(2).unwrap(), 1.0);
    /// let generator = TransitionGenerator::new(&space, &model).unwrap();
    ///
    /// let mut walk = MigrationWalk::new(generator, 2, rand::thread_rng()).unwrap();
    /// let next = walk.step().unwrap().unwrap();
    /// assert!(space.neighbors(2).unwrap().contains(&next));
    /// assert!(walk.time() > 0.0);
    /// ```
    pub fn step(&mut self) -> Result<Option<Index>, StateSpaceError> {
        let outgoing = self.generator.outgoing(self.current)?;
        let rates: Vec<f64> = outgoing.iter().map(|&(_, rate)| rate).collect();
        let choice = match self.sampler.choose(&rates) {
            Some(choice) => choice,
            None => return Ok(None),
        };

        self.time += self.sampler.holding_time(rates.iter().sum());
        self.current = outgoing[choice].0;
        self.steps += 1;

        Ok(Some(self.current))
    }

    /// Steps the walk until no migration is possible or
    /// `max_steps` migrations have taken place, returning
    /// the number of migrations performed.
    pub fn run(&mut self, max_steps: usize) -> Result<usize, StateSpaceError> {
        let mut taken = 0;
        while taken < max_steps {
            if self.step()?.is_none() {
                break;
            }
            taken += 1;
        }
        Ok(taken)
    }

    /// Returns the index of the current state.
    pub fn current(&self) -> Index {
        self.current
    }

    /// Returns the current state.
    pub fn state(&self) -> Result<State, StateSpaceError> {
        self.generator.space().index_to_state(self.current)
    }

    /// Returns the time elapsed since the start of the walk.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the number of migrations so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Returns the state space being walked.
    pub fn space(&self) -> &'a StateSpace {
        self.generator.space()
    }
}
