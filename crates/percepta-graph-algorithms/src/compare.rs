//! Partition comparison
//!
//! Normalized mutual information between two community assignments of the
//! same node set (Danon et al., 2005).

use rustc_hash::FxHashMap;

/// Normalized mutual information `2·I(X;Y) / (H(X) + H(Y))`.
///
/// Both slices must describe the same nodes in the same order. Two trivial
/// partitions (zero entropy on both sides) are identical by definition and
/// score 1.0. Mismatched or empty inputs score 0.0.
pub fn normalized_mutual_information(a: &[usize], b: &[usize]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let n = a.len() as f64;
    let mut count_a: FxHashMap<usize, f64> = FxHashMap::default();
    let mut count_b: FxHashMap<usize, f64> = FxHashMap::default();
    let mut joint: FxHashMap<(usize, usize), f64> = FxHashMap::default();

    for (&x, &y) in a.iter().zip(b.iter()) {
        *count_a.entry(x).or_insert(0.0) += 1.0;
        *count_b.entry(y).or_insert(0.0) += 1.0;
        *joint.entry((x, y)).or_insert(0.0) += 1.0;
    }

    let entropy = |counts: &FxHashMap<usize, f64>| -> f64 {
        counts
            .values()
            .map(|&c| {
                let p = c / n;
                -p * p.ln()
            })
            .sum()
    };
    let h_a = entropy(&count_a);
    let h_b = entropy(&count_b);

    if h_a + h_b <= f64::EPSILON {
        return 1.0;
    }

    let mutual: f64 = joint
        .iter()
        .map(|(&(x, y), &nij)| {
            let ni = count_a[&x];
            let nj = count_b[&y];
            (nij / n) * ((n * nij) / (ni * nj)).ln()
        })
        .sum();

    (2.0 * mutual / (h_a + h_b)).clamp(0.0, 1.0)
}
