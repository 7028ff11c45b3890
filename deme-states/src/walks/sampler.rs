use rand::distributions::WeightedIndex;
use rand::Rng;
use rand_distr::Exp;

/// Wrapper around an `R: Rng` providing the two
/// draws a jump chain needs: exponential holding
/// times and rate-proportional choices.
#[derive(Clone, Debug)]
pub struct RateSampler<R: Rng>(R);

impl<R: Rng> RateSampler<R> {
    pub fn new(rng: R) -> RateSampler<R> {
        RateSampler(rng)
    }

    /// Returns an exponentially distributed waiting
    /// time with the passed total rate. A rate that is
    /// negative or NaN never fires.
    pub fn holding_time(&mut self, total_rate: f64) -> f64 {
        match Exp::new(total_rate) {
            Ok(exp) => self.0.sample(exp),
            Err(_) => f64::INFINITY,
        }
    }

    /// Returns an index into `weights`, chosen with
    /// probability proportional to its weight, or `None`
    /// if no weight is positive.
    ///
    /// Weights that are not positive, NaN included,
    /// are never chosen.
    pub fn choose(&mut self, weights: &[f64]) -> Option<usize> {
        let weights = weights.iter().map(|&w| if w > 0.0 { w } else { 0.0 });
        let index = WeightedIndex::new(weights).ok()?;
        Some(self.0.sample(index))
    }
}
