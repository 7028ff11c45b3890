use crate::transitions::MigrationModel;

use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// Migration rates between every ordered pair of demes.
///
/// `rates[source * demes + target]` is the rate at which a
/// single gene copy in deme `source` moves to deme `target`.
/// Rates on the diagonal are ignored. Missing entries are
/// treated as 0.
///
/// # Note
/// Non-positive rates are treated as absent migration
/// routes. NaN or infinite rates are rejected when
/// transition rates are computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Number of demes.
    pub demes: NonZeroUsize,
    /// Row-major matrix of per-copy migration rates.
    pub rates: Vec<f64>,
}

impl MigrationConfig {
    /// Returns a "zero-valued" configuration: a single
    /// deme and no migration.
    ///
    /// # Examples
    /// ```
    /// use deme_states::transitions::MigrationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let cfg1 = MigrationConfig::zero();
    /// assert_eq!(cfg1.demes.get(), 1);
    ///
    /// let cfg2 = MigrationConfig {
    ///     // Specify the deme count...
    ///     demes: NonZeroUsize::new(2).unwrap(),
    ///     // Default the rest...
    ///     ..MigrationConfig::zero()
    /// };
    /// assert_eq!(cfg2.rate(0, 1), 0.0);
    /// ```
    pub const fn zero() -> MigrationConfig {
        MigrationConfig {
            demes: match NonZeroUsize::new(1) {
                Some(one) => one,
                None => unreachable!(),
            },
            rates: vec![],
        }
    }

    /// Returns a configuration in which every pair of
    /// distinct demes exchanges migrants at `rate`.
    ///
    /// # Examples
    /// ```
    /// use deme_states::transitions::MigrationConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let cfg = MigrationConfig::uniform(NonZeroUsize::new(3).unwrap(), 0.1);
    /// assert_eq!(cfg.rate(0, 2), 0.1);
    /// assert_eq!(cfg.rate(1, 1), 0.0);
    /// ```
    pub fn uniform(demes: NonZeroUsize, rate: f64) -> MigrationConfig {
        let n = demes.get();
        let rates = (0..n * n)
            .map(|i| if i / n == i % n { 0.0 } else { rate })
            .collect();
        MigrationConfig { demes, rates }
    }

    /// Returns the rate of migration from deme `source`
    /// to deme `target`.
    pub fn rate(&self, source: usize, target: usize) -> f64 {
        let n = self.demes.get();
        if source == target || source >= n || target >= n {
            return 0.0;
        }
        self.rates.get(source * n + target).copied().unwrap_or(0.0)
    }
}

impl MigrationModel for MigrationConfig {
    fn demes(&self) -> usize {
        self.demes.get()
    }

    fn migration_rate(&self, source: usize, target: usize) -> f64 {
        self.rate(source, target)
    }
}
