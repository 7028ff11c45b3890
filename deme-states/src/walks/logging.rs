use super::MigrationWalk;

use crate::transitions::MigrationModel;
use crate::{Index, State, StateSpaceError};

use rand::Rng;

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug)]
pub enum ReportingLevel {
    /// Clones the entire state.
    FullState,
    /// Records only the number of copies in each deme.
    DemeTotals,
    /// Records only the state index.
    IndexOnly,
}

/// A reporting-level dependant record
/// of the state of a walk.
#[derive(Clone, Debug)]
pub enum StateRecord {
    /// The full state.
    Full(State),
    /// Copies per deme.
    DemeTotals(Vec<usize>),
    /// Empty.
    None,
}

/// A snapshot of a migration walk.
#[derive(Clone, Debug)]
pub struct Log {
    pub step: usize,
    pub time: f64,
    pub index: Index,
    pub record: StateRecord,
    pub occupancy: Stats,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tstep: {:?}\n\
            \ttime: {:?}\n\
            \tindex: {:?}\n\
            {}\
            \toccupancy: {:?}\n\
            }}",
            self.step,
            self.time,
            self.index,
            match &self.record {
                StateRecord::Full(state) => format!("\tstate: {}\n", state),
                StateRecord::DemeTotals(totals) => format!("\tdeme_totals: {:?}\n", totals),
                StateRecord::None => String::new(),
            },
            self.occupancy,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// All fields are NaN if the sequence is empty.
    ///
    /// # Examples
    /// ```
    /// use deme_states::walks::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: f64::NAN,
                minimum: f64::NAN,
                mean: f64::NAN,
                median: f64::NAN,
            };
        }
        data.sort_unstable_by(|a, b| a.total_cmp(b));
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f64>() / data.len() as f64,
            median,
        }
    }
}

/// A log of the progress of a migration walk over time.
#[derive(Clone, Debug)]
pub struct WalkLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl WalkLogger {
    /// Returns a logger with the appropiate reporting level.
    pub fn new(reporting_level: ReportingLevel) -> WalkLogger {
        WalkLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of a walk.
    ///
    /// # Errors
    ///
    /// Propagates failures to recover the walk's current state.
    ///
    /// # Examples
    /// ```
    /// use deme_states::transitions::{MigrationConfig, TransitionGenerator};
    /// use deme_states::walks::logging::{ReportingLevel, WalkLogger};
    /// use deme_states::walks::MigrationWalk;
    /// use deme_states::{Init, StateSpace};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::num::NonZeroUsize;
    ///
    /// let space = StateSpace::new(Init::new(vec![3, 3]).unwrap()).unwrap();
    /// let model = MigrationConfig::uniform(NonZeroUsize::new(2).unwrap(), 1.0);
    /// let generator = TransitionGenerator::new(&space, &model).unwrap();
    /// let start = space.home_index().unwrap();
    /// let mut walk = MigrationWalk::new(generator, start, StdRng::seed_from_u64(0)).unwrap();
    ///
    /// let mut logger = WalkLogger::new(ReportingLevel::DemeTotals);
    /// for _ in 0..10 {
    ///     walk.step().unwrap();
    ///     logger.log(&walk).unwrap();
    /// }
    /// assert_eq!(logger.iter().count(), 10);
    /// ```
    pub fn log<M, R>(&mut self, walk: &MigrationWalk<'_, M, R>) -> Result<(), StateSpaceError>
    where
        M: MigrationModel,
        R: Rng,
    {
        let state = walk.state()?;
        let totals = state.deme_totals();
        let occupancy = Stats::from(totals.iter().map(|&c| c as f64));
        self.logs.push(Log {
            step: walk.steps(),
            time: walk.time(),
            index: walk.current(),
            record: match self.reporting_level {
                ReportingLevel::FullState => StateRecord::Full(state),
                ReportingLevel::DemeTotals => StateRecord::DemeTotals(totals),
                ReportingLevel::IndexOnly => StateRecord::None,
            },
            occupancy,
        });
        Ok(())
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }
}
