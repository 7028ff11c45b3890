use crate::Index;

use std::error::Error;
use std::fmt;

/// The way in which a state vector fails to
/// belong to a state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// The vector does not have `demes ⨯ groups` entries.
    Length { expected: usize, found: usize },
    /// A gene group's counts do not add up to its
    /// configured total.
    GeneCount {
        group: usize,
        expected: usize,
        found: usize,
    },
}

/// An error type for all fallible operations
/// on compositions, states and state spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSpaceError {
    /// A binomial coefficient C(n, k) was requested with k > n.
    InvalidCoefficientArgs(usize, usize),
    /// A state vector does not belong to the state space.
    MalformedState(Malformation),
    /// An index (first) was not below the size of its space (second).
    IndexOutOfRange(Index, Index),
    /// A count or index does not fit in an `Index`.
    Overflow,
    /// A composition with zero parts, or a configuration
    /// with no gene groups, was given.
    NoDemes,
    /// A migration model was paired with a state space
    /// over a different number of demes.
    DemeMismatch { expected: usize, found: usize },
    /// A migration rate between two demes is NaN or infinite.
    InvalidRate { source: usize, target: usize },
    /// The population size or mutation rate of a deme
    /// is negative or not finite.
    InvalidParameter(usize),
    /// A configuration has no home state, i.e. more gene
    /// groups than demes.
    NoHomeState,
    /// The linear system for hitting probabilities could
    /// not be solved: some state never leads to an absorbing
    /// event.
    SingularSystem,
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, found } => write!(
                f,
                "state has {} entries, expected {}",
                found, expected
            ),
            Self::GeneCount {
                group,
                expected,
                found,
            } => write!(
                f,
                "gene group {} holds {} copies, expected {}",
                group, found, expected
            ),
        }
    }
}

impl fmt::Display for StateSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoefficientArgs(n, k) => {
                write!(f, "binomial coefficient C({}, {}) is undefined", n, k)
            }
            Self::MalformedState(malformation) => write!(f, "malformed state: {}", malformation),
            Self::IndexOutOfRange(index, bound) => {
                write!(f, "index {} out of range for space of size {}", index, bound)
            }
            Self::Overflow => write!(f, "state space size overflows the index type"),
            Self::NoDemes => write!(f, "configuration with no demes"),
            Self::DemeMismatch { expected, found } => write!(
                f,
                "migration model over {} demes used with state space over {} demes",
                found, expected
            ),
            Self::InvalidRate { source, target } => write!(
                f,
                "migration rate from deme {} to deme {} is not finite",
                source, target
            ),
            Self::InvalidParameter(deme) => write!(
                f,
                "population size or mutation rate of deme {} is invalid",
                deme
            ),
            Self::NoHomeState => write!(f, "configuration has more gene groups than demes"),
            Self::SingularSystem => write!(f, "hitting probability system is singular"),
        }
    }
}

impl Error for StateSpaceError {}
