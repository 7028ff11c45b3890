use crate::transitions::{MigrationConfig, MigrationModel};
use crate::StateSpaceError;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Demographic parameters of a structured coalescent:
/// migration rates between demes, and the per-deme
/// population size and mutation rate.
///
/// All parameters are deme-specific. Each pair of lineages
/// in deme `j` coalesces at rate `2 ⨯ pop_sizes[j]`, and each
/// lineage in deme `j` mutates at rate `mut_rates[j]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Per-copy migration rates.
    pub migration: MigrationConfig,
    /// Relative population size of each deme.
    pub pop_sizes: Vec<f64>,
    /// Mutation rate of each deme.
    pub mut_rates: Vec<f64>,
}

impl Params {
    /// Returns a "zero-valued" parameter set: a single
    /// deme with no migration, no coalescence and no mutation.
    ///
    /// # Examples
    /// ```
    /// use deme_states::hitting::Params;
    ///
    /// let params = Params {
    ///     pop_sizes: vec![1.0],
    ///     mut_rates: vec![0.1],
    ///     ..Params::zero()
    /// };
    /// assert_eq!(params.coalescence_rate(0, 3), 6.0);
    /// ```
    pub const fn zero() -> Params {
        Params {
            migration: MigrationConfig::zero(),
            pop_sizes: vec![],
            mut_rates: vec![],
        }
    }

    /// Returns parameters shared by every deme: the same
    /// migration rate between each pair of distinct demes,
    /// and the same population size and mutation rate.
    ///
    /// # Examples
    /// ```
    /// use deme_states::hitting::Params;
    /// use std::num::NonZeroUsize;
    ///
    /// let params = Params::uniform(NonZeroUsize::new(2).unwrap(), 0.5, 1.0, 0.2);
    /// assert_eq!(params.migration.rate(1, 0), 0.5);
    /// assert_eq!(params.pop_size(1), 1.0);
    /// assert_eq!(params.mut_rate(0), 0.2);
    /// ```
    pub fn uniform(demes: NonZeroUsize, mig_rate: f64, pop_size: f64, mut_rate: f64) -> Params {
        Params {
            migration: MigrationConfig::uniform(demes, mig_rate),
            pop_sizes: vec![pop_size; demes.get()],
            mut_rates: vec![mut_rate; demes.get()],
        }
    }

    /// Returns the relative population size of a deme,
    /// or 0 if it is not given.
    pub fn pop_size(&self, deme: usize) -> f64 {
        self.pop_sizes.get(deme).copied().unwrap_or(0.0)
    }

    /// Returns the mutation rate of a deme, or 0 if it
    /// is not given.
    pub fn mut_rate(&self, deme: usize) -> f64 {
        self.mut_rates.get(deme).copied().unwrap_or(0.0)
    }

    /// Returns the total rate of coalescence in a deme
    /// holding `genes` lineages.
    pub fn coalescence_rate(&self, deme: usize, genes: usize) -> f64 {
        let pairs = genes as f64 * genes.saturating_sub(1) as f64 / 2.0;
        2.0 * self.pop_size(deme) * pairs
    }

    /// Returns the total rate of events other than migration
    /// (coalescence or mutation) given the number of lineages
    /// in each deme.
    pub fn absorption_rate(&self, deme_totals: &[usize]) -> f64 {
        deme_totals
            .iter()
            .enumerate()
            .map(|(deme, &genes)| {
                self.coalescence_rate(deme, genes) + genes as f64 * self.mut_rate(deme)
            })
            .sum()
    }

    /// Checks that every deme has a population size and a
    /// mutation rate, and that both are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`DemeMismatch`] if `pop_sizes` or `mut_rates`
    /// does not have one entry per deme, and [`InvalidParameter`]
    /// naming the first deme with a bad value.
    ///
    /// [`DemeMismatch`]: StateSpaceError::DemeMismatch
    /// [`InvalidParameter`]: StateSpaceError::InvalidParameter
    pub fn validate(&self) -> Result<(), StateSpaceError> {
        let demes = self.demes();
        for values in [&self.pop_sizes, &self.mut_rates] {
            if values.len() != demes {
                return Err(StateSpaceError::DemeMismatch {
                    expected: demes,
                    found: values.len(),
                });
            }
        }
        for deme in 0..demes {
            let (pop, mu) = (self.pop_sizes[deme], self.mut_rates[deme]);
            if !(pop.is_finite() && pop >= 0.0 && mu.is_finite() && mu >= 0.0) {
                return Err(StateSpaceError::InvalidParameter(deme));
            }
        }
        Ok(())
    }
}

impl MigrationModel for Params {
    fn demes(&self) -> usize {
        self.migration.demes.get()
    }

    fn migration_rate(&self, source: usize, target: usize) -> f64 {
        self.migration.rate(source, target)
    }
}
