use crate::CellCount;

/// Binomial coefficient `C(n, k)` as a running product of `(n - i + 1) / i`.
///
/// The multiplicative form stays well inside `f64` range for boards of a few dozen
/// cells, where a factorial ratio would not. `combination(n, 0)` is `1` for every
/// `n`.
///
/// Callers must keep `k <= n`. Past that point the product contains a zero factor
/// and evaluates to `0`, which is the right count but not a meaningful draw.
pub fn combination(n: CellCount, k: CellCount) -> f64 {
    debug_assert!(k <= n, "combination({n}, {k}) called with k > n");
    let n = f64::from(n);
    (1..=k).fold(1.0, |acc, i| {
        let i = f64::from(i);
        acc * (n - i + 1.0) / i
    })
}
