//! Small arithmetic helpers used by [`crate::proof_tree::sanity_check`].

/// All ways to write `n` as an ordered sum of `k` non-negative integers.
///
/// Ported from `original_source/comb_spec_searcher/utils.py`'s
/// `compositions`, which the Cartesian counting identity in `spec.md` §8
/// testable property 7 relies on: a Cartesian rule with `k` children counts
/// the parent at size `n` as the sum, over every composition of `n` into
/// `k` parts, of the product of each child's count at its part.
///
/// `compositions(n, 0)` is `vec![vec![]]` when `n == 0` and empty otherwise
/// (there is exactly one way to distribute nothing among no parts, and no
/// way to distribute something among no parts).
#[must_use]
pub fn compositions(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return if n == 0 { vec![Vec::new()] } else { Vec::new() };
    }
    if k == 1 {
        return vec![vec![n]];
    }
    let mut result = Vec::new();
    for first in 0..=n {
        for mut rest in compositions(n - first, k - 1) {
            let mut composition = Vec::with_capacity(k);
            composition.push(first);
            composition.append(&mut rest);
            result.push(composition);
        }
    }
    result
}
