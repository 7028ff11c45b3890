//! Exact binomial coefficients and the combinatorial
//! number system over compositions.
//!
//! A _composition_ of `ngenes` into `ndeme` parts is an ordered
//! sequence of `ndeme` non-negative integers summing to `ngenes`,
//! i.e. one way of distributing the gene copies of a single group
//! over the demes. Compositions are ranked lexicographically: those
//! with a larger leading part come later, with ties broken by the
//! rank of the remaining parts.
use crate::{Index, StateSpaceError};

/// Returns the binomial coefficient C(n, k), computed
/// exactly in integer arithmetic.
///
/// # Errors
///
/// Returns [`InvalidCoefficientArgs`] if `k > n`, and
/// [`Overflow`] if the coefficient does not fit in a `usize`.
///
/// [`InvalidCoefficientArgs`]: StateSpaceError::InvalidCoefficientArgs
/// [`Overflow`]: StateSpaceError::Overflow
///
/// # Examples
/// ```
/// use deme_states::binom;
///
/// assert_eq!(binom(5, 2), Ok(10));
/// assert_eq!(binom(0, 0), Ok(1));
/// assert!(binom(3, 5).is_err());
/// ```
pub fn binom(n: usize, k: usize) -> Result<usize, StateSpaceError> {
    if k > n {
        return Err(StateSpaceError::InvalidCoefficientArgs(n, k));
    }
    let k = k.min(n - k);
    // After step i the accumulator holds C(n, i + 1), so each
    // division is exact. Intermediates never exceed the result.
    let mut value: u128 = 1;
    for i in 0..k {
        value = value * (n - i) as u128 / (i + 1) as u128;
        if value > usize::MAX as u128 {
            return Err(StateSpaceError::Overflow);
        }
    }
    Ok(value as usize)
}

/// Returns the number of compositions of `ngenes` into
/// `ndeme` parts, C(ngenes + ndeme - 1, ndeme - 1).
///
/// # Examples
/// ```
/// use deme_states::composition_count;
///
/// // (0, 0, 2), (0, 1, 1), (0, 2, 0), (1, 0, 1), (1, 1, 0), (2, 0, 0)
/// assert_eq!(composition_count(3, 2), Ok(6));
/// ```
pub fn composition_count(ndeme: usize, ngenes: usize) -> Result<Index, StateSpaceError> {
    if ndeme == 0 {
        return Err(StateSpaceError::NoDemes);
    }
    let n = ngenes
        .checked_add(ndeme - 1)
        .ok_or(StateSpaceError::Overflow)?;
    binom(n, ndeme - 1)
}

/// Returns the rank of a composition among all compositions
/// with the same number of parts and the same total.
///
/// # Errors
///
/// Returns [`NoDemes`] if `parts` is empty, and [`Overflow`]
/// if the total or an intermediate block count does not fit
/// in an [`Index`].
///
/// [`NoDemes`]: StateSpaceError::NoDemes
/// [`Overflow`]: StateSpaceError::Overflow
/// [`Index`]: crate::Index
///
/// # Examples
/// ```
/// use deme_states::composition_rank;
///
/// assert_eq!(composition_rank(&[0, 0, 3]), Ok(0));
/// assert_eq!(composition_rank(&[0, 1, 0]), Ok(1));
/// assert_eq!(composition_rank(&[1, 1, 0]), Ok(4));
/// assert_eq!(composition_rank(&[7]), Ok(0));
/// ```
pub fn composition_rank(parts: &[usize]) -> Result<Index, StateSpaceError> {
    let ndeme = parts.len();
    if ndeme == 0 {
        return Err(StateSpaceError::NoDemes);
    }
    let mut remaining = parts
        .iter()
        .try_fold(0usize, |sum, &p| sum.checked_add(p))
        .ok_or(StateSpaceError::Overflow)?;

    let mut rank: Index = 0;
    for (i, &head) in parts[..ndeme - 1].iter().enumerate() {
        if head == 0 {
            continue;
        }
        let tail = ndeme - i - 1;
        // Sum of the block sizes C(remaining - j + tail - 1, tail - 1)
        // for every leading value j below `head` (hockey-stick identity).
        let upper = remaining
            .checked_add(tail)
            .ok_or(StateSpaceError::Overflow)?;
        let skipped = binom(upper, tail)? - binom(upper - head, tail)?;
        rank = rank
            .checked_add(skipped)
            .ok_or(StateSpaceError::Overflow)?;
        remaining -= head;
    }
    Ok(rank)
}

/// Returns the composition of `ngenes` into `ndeme` parts
/// with rank `idx`. Inverse of [`composition_rank`].
///
/// # Errors
///
/// Returns [`IndexOutOfRange`] if `idx` is not below
/// [`composition_count`]`(ndeme, ngenes)`, and [`NoDemes`]
/// if `ndeme` is 0.
///
/// [`IndexOutOfRange`]: StateSpaceError::IndexOutOfRange
/// [`NoDemes`]: StateSpaceError::NoDemes
///
/// # Examples
/// ```
/// use deme_states::composition_unrank;
///
/// assert_eq!(composition_unrank(5, 3, 2), Ok(vec![2, 0, 0]));
/// assert_eq!(composition_unrank(3, 3, 2), Ok(vec![1, 0, 1]));
/// assert!(composition_unrank(6, 3, 2).is_err());
/// ```
pub fn composition_unrank(
    idx: Index,
    ndeme: usize,
    ngenes: usize,
) -> Result<Vec<usize>, StateSpaceError> {
    let count = composition_count(ndeme, ngenes)?;
    if idx >= count {
        return Err(StateSpaceError::IndexOutOfRange(idx, count));
    }

    let mut parts = vec![0; ndeme];
    let mut remaining = ngenes;
    let mut idx = idx;
    for i in 0..ndeme - 1 {
        let tail = ndeme - i - 1;
        let mut head = 0;
        loop {
            let block = binom(remaining - head + tail - 1, tail - 1)?;
            if idx < block {
                break;
            }
            idx -= block;
            head += 1;
        }
        parts[i] = head;
        remaining -= head;
    }
    parts[ndeme - 1] = remaining;

    Ok(parts)
}

/// An iterator over all compositions of a number of
/// genes into a number of demes, in rank order.
///
/// # Examples
/// ```
/// use deme_states::{composition_rank, Compositions};
///
/// for (rank, parts) in Compositions::new(3, 4).unwrap().enumerate() {
///     assert_eq!(composition_rank(&parts), Ok(rank));
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Compositions {
    next: Option<Vec<usize>>,
}

impl Compositions {
    /// Returns an iterator starting at the composition of
    /// rank 0, which places every gene in the last deme.
    ///
    /// # Errors
    ///
    /// Returns [`NoDemes`] if `ndeme` is 0.
    ///
    /// [`NoDemes`]: StateSpaceError::NoDemes
    pub fn new(ndeme: usize, ngenes: usize) -> Result<Compositions, StateSpaceError> {
        if ndeme == 0 {
            return Err(StateSpaceError::NoDemes);
        }
        let mut first = vec![0; ndeme];
        first[ndeme - 1] = ngenes;
        Ok(Compositions { next: Some(first) })
    }

    /// The composition following `parts` in rank order.
    fn successor(parts: &[usize]) -> Option<Vec<usize>> {
        let ndeme = parts.len();
        let mut suffix = 0;
        for i in (0..ndeme.saturating_sub(1)).rev() {
            suffix += parts[i + 1];
            if suffix > 0 {
                let mut next = parts.to_vec();
                next[i] += 1;
                next[i + 1..].iter_mut().for_each(|p| *p = 0);
                next[ndeme - 1] = suffix - 1;
                return Some(next);
            }
        }
        None
    }
}

impl Iterator for Compositions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        self.next = Self::successor(&current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binom_values() {
        assert_eq!(binom(5, 2), Ok(10));
        assert_eq!(binom(0, 0), Ok(1));
        assert_eq!(binom(6, 3), Ok(20));
        assert_eq!(binom(52, 5), Ok(2_598_960));
        assert_eq!(binom(62, 31), Ok(465_428_353_255_261_088));
    }

    #[test]
    fn binom_symmetry() {
        for n in 0..40 {
            for k in 0..=n {
                assert_eq!(binom(n, k), binom(n, n - k), "C({}, {})", n, k);
            }
        }
    }

    #[test]
    fn binom_pascal_rule() {
        for n in 1..50 {
            for k in 1..n {
                assert_eq!(
                    binom(n, k).unwrap(),
                    binom(n - 1, k - 1).unwrap() + binom(n - 1, k).unwrap()
                );
            }
        }
    }

    #[test]
    fn binom_invalid_args() {
        assert_eq!(
            binom(3, 5),
            Err(StateSpaceError::InvalidCoefficientArgs(3, 5))
        );
    }

    #[test]
    fn binom_overflow() {
        assert_eq!(binom(200, 100), Err(StateSpaceError::Overflow));
    }

    #[test]
    fn rank_three_demes() {
        let expected = [
            (vec![0, 0, 1], 0),
            (vec![0, 1, 0], 1),
            (vec![1, 0, 0], 2),
            (vec![0, 0, 2], 0),
            (vec![0, 1, 1], 1),
            (vec![0, 2, 0], 2),
            (vec![1, 0, 1], 3),
            (vec![1, 1, 0], 4),
            (vec![2, 0, 0], 5),
        ];
        for (parts, rank) in expected {
            assert_eq!(composition_rank(&parts), Ok(rank), "{:?}", parts);
        }
    }

    #[test]
    fn rank_two_demes() {
        assert_eq!(composition_rank(&[0, 1]), Ok(0));
        assert_eq!(composition_rank(&[1, 0]), Ok(1));
        assert_eq!(composition_rank(&[0, 2]), Ok(0));
        assert_eq!(composition_rank(&[1, 1]), Ok(1));
        assert_eq!(composition_rank(&[2, 0]), Ok(2));
    }

    #[test]
    fn rank_empty() {
        assert_eq!(composition_rank(&[]), Err(StateSpaceError::NoDemes));
    }

    #[test]
    fn rank_near_max_total() {
        assert_eq!(
            composition_rank(&[usize::MAX - 1, 1]),
            Err(StateSpaceError::Overflow)
        );
        assert_eq!(
            composition_rank(&[usize::MAX, 1]),
            Err(StateSpaceError::Overflow)
        );
        assert_eq!(composition_rank(&[0, usize::MAX]), Ok(0));
    }

    #[test]
    fn rank_zero_with_many_demes() {
        let mut parts = vec![0; 40];
        parts[39] = 1000;
        assert_eq!(composition_rank(&parts), Ok(0));
        // C(1039, 39) does not fit in any index type.
        parts.swap(0, 39);
        assert_eq!(composition_rank(&parts), Err(StateSpaceError::Overflow));
    }

    #[test]
    fn unrank_inverts_rank() {
        for ndeme in 1..6 {
            for ngenes in 0..7 {
                let count = composition_count(ndeme, ngenes).unwrap();
                for idx in 0..count {
                    let parts = composition_unrank(idx, ndeme, ngenes).unwrap();
                    assert_eq!(parts.len(), ndeme);
                    assert_eq!(parts.iter().sum::<usize>(), ngenes);
                    assert_eq!(composition_rank(&parts), Ok(idx));
                }
            }
        }
    }

    #[test]
    fn unrank_out_of_range() {
        assert_eq!(
            composition_unrank(6, 3, 2),
            Err(StateSpaceError::IndexOutOfRange(6, 6))
        );
        assert_eq!(
            composition_unrank(1, 1, 9),
            Err(StateSpaceError::IndexOutOfRange(1, 1))
        );
        assert_eq!(composition_unrank(0, 0, 1), Err(StateSpaceError::NoDemes));
    }

    #[test]
    fn unrank_single_deme() {
        assert_eq!(composition_unrank(0, 1, 4), Ok(vec![4]));
    }

    #[test]
    fn compositions_cover_rank_space() {
        for ndeme in 1..5 {
            for ngenes in 0..6 {
                let all: Vec<_> = Compositions::new(ndeme, ngenes).unwrap().collect();
                assert_eq!(all.len(), composition_count(ndeme, ngenes).unwrap());
                for (rank, parts) in all.iter().enumerate() {
                    assert_eq!(composition_rank(parts), Ok(rank));
                }
            }
        }
    }

    #[test]
    fn compositions_order() {
        let all: Vec<_> = Compositions::new(3, 2).unwrap().collect();
        assert_eq!(
            all,
            vec![
                vec![0, 0, 2],
                vec![0, 1, 1],
                vec![0, 2, 0],
                vec![1, 0, 1],
                vec![1, 1, 0],
                vec![2, 0, 0],
            ]
        );
    }
}
