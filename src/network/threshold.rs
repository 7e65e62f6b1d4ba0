//! Adaptive similarity threshold
//!
//! Bisects the similarity range for a cut-off whose edge density falls inside
//! the configured band. The first midpoint inside the band wins. When the band
//! cannot be hit (ties, tiny graphs) the last midpoint is returned.

use crate::config::ThresholdConfig;
use tracing::debug;

/// Outcome of a threshold search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub threshold: f64,
    /// Fraction of pairs with similarity at or above `threshold`
    pub density: f64,
    pub steps: usize,
    pub in_band: bool,
}

/// Fraction of `sorted` (ascending) values that are `>= t`
fn density_at(sorted: &[f64], t: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let below = sorted.partition_point(|&s| s < t);
    (sorted.len() - below) as f64 / sorted.len() as f64
}

/// Search a threshold over the pairwise similarities (any order).
pub fn calibrate_threshold(pairs: &[f64], config: &ThresholdConfig) -> Calibration {
    let mut sorted: Vec<f64> = pairs.iter().copied().filter(|s| !s.is_nan()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return Calibration {
            threshold: 0.0,
            density: 0.0,
            steps: 0,
            in_band: false,
        };
    };

    let (mut lo, mut hi) = (first, last);
    let mut best = (lo + hi) / 2.0;
    let mut steps = 0;
    let mut in_band = false;

    while steps < config.max_steps {
        steps += 1;
        let mid = (lo + hi) / 2.0;
        let density = density_at(&sorted, mid);
        debug!("Threshold step {}: t={:.6} density={:.4}", steps, mid, density);

        if density >= config.min_density && density <= config.max_density {
            best = mid;
            in_band = true;
            break;
        } else if density < config.min_density {
            hi = mid;
        } else {
            lo = mid;
        }
        best = mid;
        if hi - lo < config.tolerance {
            break;
        }
    }

    Calibration {
        threshold: best,
        density: density_at(&sorted, best),
        steps,
        in_band,
    }
}
