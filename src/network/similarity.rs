//! Pairwise cosine similarity

use ndarray::{Array2, Axis};

/// Symmetric `n × n` cosine similarity matrix with a unit diagonal.
///
/// A zero-norm row is similar to nothing: its off-diagonal entries are 0.0.
pub fn cosine_similarity_matrix(vectors: &Array2<f64>) -> Array2<f64> {
    let n = vectors.nrows();
    let norms: Vec<f64> = vectors
        .axis_iter(Axis(0))
        .map(|row| row.dot(&row).sqrt())
        .collect();
    let gram = vectors.dot(&vectors.t());

    let mut sim = Array2::zeros((n, n));
    for i in 0..n {
        sim[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let denom = norms[i] * norms[j];
            let s = if denom > 0.0 { gram[[i, j]] / denom } else { 0.0 };
            sim[[i, j]] = s;
            sim[[j, i]] = s;
        }
    }
    sim
}

/// Strict upper triangle in row-major order: `(0,1), (0,2), .., (1,2), ..`
pub fn upper_triangle(sim: &Array2<f64>) -> Vec<f64> {
    let n = sim.nrows();
    let mut values = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            values.push(sim[[i, j]]);
        }
    }
    values
}
