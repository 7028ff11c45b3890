//! Hitting probabilities of the structured coalescent.
//!
//! Going backward in time from the sampled configuration, the
//! lineages of a sample migrate between demes until the first
//! coalescence or mutation event. [`HittingProbabilities`]
//! gives, for every state and deme, the probability that this
//! first event is a coalescence in that deme while the sample
//! is in that state.
mod params;

pub use params::Params;

use crate::transitions::TransitionGenerator;
use crate::{Index, StateSpace, StateSpaceError};

use ndarray::{Array1, Array2};

/// Pivots smaller than this, relative to the largest
/// matrix entry, are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Probabilities of the first non-migration event of a
/// sample, by state and deme.
#[derive(Clone, Debug)]
pub struct HittingProbabilities {
    space: StateSpace,
    params: Params,
    occupancy: Array1<f64>,
}

impl HittingProbabilities {
    /// Computes the hitting probabilities of a state space
    /// under a set of demographic parameters, starting from
    /// the space's [home state].
    ///
    /// [home state]: crate::Init::home_state
    ///
    /// # Errors
    ///
    /// - [`DemeMismatch`] if the parameters and the space
    ///   disagree on the number of demes.
    /// - [`InvalidParameter`] or [`InvalidRate`] for bad
    ///   parameter values.
    /// - [`NoHomeState`] if the space has no home state.
    /// - [`SingularSystem`] if some state can never reach
    ///   a coalescence or mutation.
    ///
    /// [`DemeMismatch`]: StateSpaceError::DemeMismatch
    /// [`InvalidParameter`]: StateSpaceError::InvalidParameter
    /// [`InvalidRate`]: StateSpaceError::InvalidRate
    /// [`NoHomeState`]: StateSpaceError::NoHomeState
    /// [`SingularSystem`]: StateSpaceError::SingularSystem
    ///
    /// # Examples
    /// ```
    /// use deme_states::hitting::{HittingProbabilities, Params};
    /// use deme_states::{Init, StateSpace};
    ///
    /// // A single pair in a single deme: coalescence at rate 2,
    /// // mutation at rate 2 ⨯ 1.
    /// let space = StateSpace::new(Init::new(vec![2]).unwrap()).unwrap();
    /// let params = Params {
    ///     pop_sizes: vec![1.0],
    ///     mut_rates: vec![1.0],
    ///     ..Params::zero()
    /// };
    /// let hp = HittingProbabilities::new(space, params).unwrap();
    /// assert!((hp.get(0, 0).unwrap() - 0.5).abs() < 1e-12);
    /// ```
    pub fn new(space: StateSpace, params: Params) -> Result<HittingProbabilities, StateSpaceError> {
        let occupancy = occupancy(&space, &params)?;
        Ok(HittingProbabilities {
            space,
            params,
            occupancy,
        })
    }

    /// Returns the state space.
    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    /// Returns the current parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Recomputes the probabilities under new parameters.
    /// On error, the previous parameters and probabilities
    /// are kept.
    pub fn update(&mut self, params: Params) -> Result<(), StateSpaceError> {
        self.occupancy = occupancy(&self.space, &params)?;
        self.params = params;
        Ok(())
    }

    /// Returns the expected time the sample spends in the
    /// state at `idx` before the first coalescence or mutation.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not a state index.
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    pub fn occupancy(&self, idx: Index) -> Result<f64, StateSpaceError> {
        self.occupancy
            .get(idx)
            .copied()
            .ok_or_else(|| StateSpaceError::IndexOutOfRange(idx, self.space.total_states()))
    }

    /// Returns the probability that the first event other
    /// than migration is a coalescence in `deme`, happening
    /// while the sample is in the state at `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfRange`] if `idx` is not a state
    /// index or `deme` is not a deme.
    ///
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    pub fn get(&self, idx: Index, deme: usize) -> Result<f64, StateSpaceError> {
        let demes = self.space.demes();
        if deme >= demes {
            return Err(StateSpaceError::IndexOutOfRange(deme, demes));
        }
        let state = self.space.index_to_state(idx)?;
        let genes = state.deme_totals()[deme];
        Ok(self.occupancy(idx)? * self.params.coalescence_rate(deme, genes))
    }

    /// Same as [`get`], for a state vector.
    ///
    /// [`get`]: HittingProbabilities::get
    ///
    /// # Errors
    ///
    /// Returns [`MalformedState`] if `counts` does not belong
    /// to the space, and [`IndexOutOfRange`] if `deme` is
    /// not a deme.
    ///
    /// [`MalformedState`]: StateSpaceError::MalformedState
    /// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
    pub fn get_state(&self, counts: &[usize], deme: usize) -> Result<f64, StateSpaceError> {
        self.get(self.space.state_to_index(counts)?, deme)
    }

    /// Returns the probability that a coalescence happens
    /// before any mutation.
    pub fn coalescence_probability(&self) -> Result<f64, StateSpaceError> {
        let mut total = 0.0;
        for (idx, state) in self.space.iter().enumerate() {
            for (deme, &genes) in state.deme_totals().iter().enumerate() {
                total += self.occupancy(idx)? * self.params.coalescence_rate(deme, genes);
            }
        }
        Ok(total)
    }
}

/// Solves for the expected time spent in every state before
/// absorption, starting from the home state. With `U` the
/// generator of the migration chain killed at the absorption
/// rate, stored column-wise (`U[to, from]`), this is the
/// solution of `U x = -e_home`.
fn occupancy(space: &StateSpace, params: &Params) -> Result<Array1<f64>, StateSpaceError> {
    let generator = TransitionGenerator::new(space, params)?;
    params.validate()?;
    let home = space.home_index().ok_or(StateSpaceError::NoHomeState)?;

    let dim = space.total_states();
    let mut u = Array2::<f64>::zeros((dim, dim));
    for from in 0..dim {
        let state = space.index_to_state(from)?;
        let mut total = params.absorption_rate(&state.deme_totals());
        for (to, rate) in generator.outgoing(from)? {
            u[[to, from]] += rate;
            total += rate;
        }
        u[[from, from]] -= total;
    }

    let mut rhs = Array1::<f64>::zeros(dim);
    rhs[home] = -1.0;
    solve(u, rhs)
}

/// Solves `a x = b` by Gaussian elimination with
/// partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, StateSpaceError> {
    let n = b.len();
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let threshold = scale * PIVOT_TOLERANCE;

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if !(a[[pivot, col]].abs() > threshold) {
            return Err(StateSpaceError::SingularSystem);
        }
        if pivot != col {
            for k in col..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }

        let diagonal = a[[col, col]];
        for row in col + 1..n {
            let factor = a[[row, col]] / diagonal;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let upper = a[[col, k]];
                a[[row, k]] -= factor * upper;
            }
            let upper = b[col];
            b[row] -= factor * upper;
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in row + 1..n {
            sum -= a[[row, k]] * x[k];
        }
        x[row] = sum / a[[row, row]];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transitions::MigrationConfig;
    use crate::Init;
    use std::num::NonZeroUsize;

    const TOLERANCE: f64 = 1e-6;

    fn params(rates: Vec<f64>, pop_sizes: Vec<f64>, mut_rates: Vec<f64>) -> Params {
        Params {
            migration: MigrationConfig {
                demes: NonZeroUsize::new(pop_sizes.len()).unwrap(),
                rates,
            },
            pop_sizes,
            mut_rates,
        }
    }

    fn assert_matches(hp: &HittingProbabilities, expected: &[f64]) {
        let demes = hp.space().demes();
        assert_eq!(expected.len(), hp.space().total_states() * demes);
        for idx in 0..hp.space().total_states() {
            let state = hp.space().index_to_state(idx).unwrap();
            for deme in 0..demes {
                let want = expected[idx * demes + deme];
                let by_index = hp.get(idx, deme).unwrap();
                let by_state = hp.get_state(state.counts(), deme).unwrap();
                assert!(
                    (by_index - want).abs() < TOLERANCE,
                    "state {} deme {}: {} != {}",
                    state,
                    deme,
                    by_index,
                    want
                );
                assert!((by_state - by_index).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn two_demes() {
        let space = StateSpace::new(Init::new(vec![2, 3]).unwrap()).unwrap();
        let hp = HittingProbabilities::new(
            space,
            params(vec![0.0, 0.5, 1.0, 0.0], vec![1.0, 1.5], vec![0.2, 0.4]),
        )
        .unwrap();

        let expected = [
            0., 0.00103878, 0., 0.0455599, 0.12159, 0.547156, 0., 0.000561967, 0.00256614,
            0.0115476, 0.080003, 0.0400015, 0.0000264864, 0.000119189, 0.00185621,
            0.000928104, 0.0200632, 0., 0.0000108476, 5.4238e-6, 0.00028529, 0., 0.00144315,
            0.,
        ];
        assert_matches(&hp, &expected);
        assert!((hp.occupancy(2).unwrap() - 0.0607950613).abs() < 1e-9);
    }

    #[test]
    fn three_demes() {
        let space = StateSpace::new(Init::new(vec![1, 2, 1]).unwrap()).unwrap();
        let hp = HittingProbabilities::new(
            space,
            params(
                vec![0.0, 1.5, 2.5, 1.0, 0.0, 3.0, 0.5, 2.0, 0.0],
                vec![1.0, 1.5, 2.0],
                vec![0.2, 0.4, 0.6],
            ),
        )
        .unwrap();

        let expected = [
            0., 0., 0.019806, 0., 0., 0.0100659, 0., 0., 0.0359177, 0., 0., 0.0611395, 0.,
            0.0112255, 0.0149673, 0., 0., 0.0848855, 0., 0.0238654, 0.0318206, 0., 0.0403591,
            0., 0., 0.169849, 0., 0., 0., 0.0127268, 0., 0., 0.00390996, 0.00532553, 0.,
            0.0106511, 0., 0., 0.0104442, 0., 0.00500293, 0., 0.0155173, 0., 0., 0.000520704,
            0., 0.00104141, 0.000404654, 0., 0., 0.00273678, 0., 0., 0., 0., 0.00614411, 0.,
            0.00121538, 0.00162051, 0., 0., 0.00492505, 0., 0.00535094, 0.00713459, 0.,
            0.00908355, 0., 0., 0.0134821, 0., 0., 0.0127084, 0., 0., 0.0111906, 0., 0.,
            0.0437093, 0., 0., 0., 0.00243712, 0., 0.0012199, 0., 0.00190634, 0., 0., 0.,
            0.00246842, 0., 0., 0.00344907, 0., 0.00281571, 0.00422357, 0., 0.000249283, 0.,
            0., 0.000132574, 0.000198862, 0., 0.000776759, 0., 0., 0., 0., 0.00272357, 0., 0.,
            0.000852867, 0.000847104, 0., 0.00169421, 0., 0., 0.00345647, 0., 0.00164827, 0.,
            0.00330404, 0., 0., 0., 0.00201258, 0., 0., 0.00276916, 0., 0.00340535,
            0.00510803, 0., 0.000457663, 0., 0.000915326, 0.000357125, 0., 0., 0.00171498, 0.,
            0., 0.000687756, 0., 0., 0.000352559, 0.000528838, 0., 0.00275034, 0., 0.,
            0.000241668, 0., 0., 0.00014761, 0., 0., 0.000418154, 0., 0.,
        ];
        assert_matches(&hp, &expected);
    }

    #[test]
    fn coalescence_is_certain_without_mutation() {
        let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
        let two = NonZeroUsize::new(2).unwrap();
        let hp = HittingProbabilities::new(space, Params::uniform(two, 0.5, 1.0, 0.0)).unwrap();
        assert!((hp.coalescence_probability().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn update_matches_fresh_solve() {
        let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
        let two = NonZeroUsize::new(2).unwrap();
        let mut hp =
            HittingProbabilities::new(space.clone(), Params::uniform(two, 0.5, 1.0, 0.0)).unwrap();

        let mutating = Params::uniform(two, 0.5, 1.0, 0.3);
        hp.update(mutating.clone()).unwrap();
        assert!((hp.coalescence_probability().unwrap() - 0.7119741100).abs() < 1e-9);

        let fresh = HittingProbabilities::new(space, mutating).unwrap();
        for idx in 0..6 {
            for deme in 0..2 {
                assert_eq!(hp.get(idx, deme), fresh.get(idx, deme));
            }
        }
    }

    #[test]
    fn failed_update_keeps_state() {
        let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
        let two = NonZeroUsize::new(2).unwrap();
        let initial = Params::uniform(two, 0.5, 1.0, 0.3);
        let mut hp = HittingProbabilities::new(space, initial.clone()).unwrap();
        let before = hp.get(2, 0).unwrap();

        let mut bad = initial.clone();
        bad.pop_sizes[0] = f64::NAN;
        assert_eq!(hp.update(bad), Err(StateSpaceError::InvalidParameter(0)));
        assert_eq!(hp.params(), &initial);
        assert_eq!(hp.get(2, 0), Ok(before));
    }

    #[test]
    fn singular_without_absorption() {
        let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
        let two = NonZeroUsize::new(2).unwrap();
        assert_eq!(
            HittingProbabilities::new(space, Params::uniform(two, 0.5, 0.0, 0.0)).err(),
            Some(StateSpaceError::SingularSystem)
        );
    }

    #[test]
    fn configuration_errors() {
        let two = NonZeroUsize::new(2).unwrap();
        let three = NonZeroUsize::new(3).unwrap();

        let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
        assert_eq!(
            HittingProbabilities::new(space.clone(), Params::uniform(three, 0.5, 1.0, 0.1)).err(),
            Some(StateSpaceError::DemeMismatch {
                expected: 2,
                found: 3
            })
        );

        let mut short = Params::uniform(two, 0.5, 1.0, 0.1);
        short.pop_sizes.pop();
        assert_eq!(
            HittingProbabilities::new(space, short).err(),
            Some(StateSpaceError::DemeMismatch {
                expected: 2,
                found: 1
            })
        );

        let crowded = Init::with_demes(vec![1, 1, 1], two).unwrap();
        let space = StateSpace::new(crowded).unwrap();
        assert_eq!(
            HittingProbabilities::new(space, Params::uniform(two, 0.5, 1.0, 0.1)).err(),
            Some(StateSpaceError::NoHomeState)
        );
    }

    #[test]
    fn out_of_range() {
        let space = StateSpace::new(Init::new(vec![2, 1]).unwrap()).unwrap();
        let two = NonZeroUsize::new(2).unwrap();
        let hp = HittingProbabilities::new(space, Params::uniform(two, 0.5, 1.0, 0.1)).unwrap();
        assert_eq!(hp.get(6, 0), Err(StateSpaceError::IndexOutOfRange(6, 6)));
        assert_eq!(hp.get(0, 2), Err(StateSpaceError::IndexOutOfRange(2, 2)));
        assert_eq!(hp.occupancy(6), Err(StateSpaceError::IndexOutOfRange(6, 6)));
    }
}
