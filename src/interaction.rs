//! Enumeration of interaction index sets.
//!
//! An interaction term of order `o` is the product of `o` distinct
//! transformed columns. [`Combinations`] yields every such index set of one
//! order in lexicographic order without materialising the full list;
//! [`enumerate`] collects all orders `2..=max_order` at once.

use std::collections::BTreeMap;

/// Lexicographic iterator over the `order`-element subsets of `0..k`.
///
/// # Examples
///
/// ```
/// use metafunction::interaction::Combinations;
///
/// let pairs: Vec<Vec<usize>> = Combinations::new(3, 2).collect();
/// assert_eq!(pairs, vec![vec![0, 1], vec![0, 2], vec![1, 2]]);
/// ```
#[derive(Clone, Debug)]
pub struct Combinations {
    k: usize,
    current: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// Subsets of size `order` drawn from `0..k`.
    ///
    /// Yields nothing when `order == 0` or `order > k`.
    #[must_use]
    pub fn new(k: usize, order: usize) -> Self {
        Self {
            k,
            current: (0..order).collect(),
            done: order == 0 || order > k,
        }
    }

    /// Advance `current` to the next subset in place.
    ///
    /// Returns `false` once the last subset has been produced.
    fn advance(&mut self) -> bool {
        let order = self.current.len();
        // Rightmost position that can still be incremented.
        let Some(i) = (0..order)
            .rev()
            .find(|&i| self.current[i] < self.k - order + i)
        else {
            return false;
        };
        self.current[i] += 1;
        for j in i + 1..order {
            self.current[j] = self.current[j - 1] + 1;
        }
        true
    }

    /// Visit every subset by reference, avoiding a `Vec` per item.
    pub fn for_each_subset(mut self, mut f: impl FnMut(&[usize])) {
        if self.done {
            return;
        }
        loop {
            f(&self.current);
            if !self.advance() {
                break;
            }
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current.clone();
        self.done = !self.advance();
        Some(item)
    }
}

/// All interaction index sets of order `2..=max_order` over `k` inputs.
///
/// Returns an empty map when `max_order < 2`. Orders above `k` are present
/// with no subsets.
///
/// # Examples
///
/// ```
/// use metafunction::interaction::enumerate;
///
/// let sets = enumerate(4, 3);
/// assert_eq!(sets[&2].len(), 6);
/// assert_eq!(sets[&3].len(), 4);
/// ```
#[must_use]
pub fn enumerate(k: usize, max_order: usize) -> BTreeMap<usize, Vec<Vec<usize>>> {
    (2..=max_order)
        .map(|order| (order, Combinations::new(k, order).collect()))
        .collect()
}

/// Binomial coefficient `C(n, r)`, saturating at `usize::MAX`.
#[must_use]
pub fn binomial(n: usize, r: usize) -> usize {
    if r > n {
        return 0;
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        // acc * (n - i) is divisible by i + 1 since acc = C(n, i).
        let Some(next) = acc.checked_mul((n - i) as u128) else {
            return usize::MAX;
        };
        acc = next / (i + 1) as u128;
    }
    usize::try_from(acc).unwrap_or(usize::MAX)
}

/// Number of interaction terms of orders `2..=max_order` over `k` inputs,
/// saturating at `usize::MAX`.
#[must_use]
pub fn n_interaction_terms(k: usize, max_order: usize) -> usize {
    (2..=max_order).fold(0, |acc: usize, o| acc.saturating_add(binomial(k, o)))
}
