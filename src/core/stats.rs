//! Box-and-whisker statistics and kernel density curves.
//!
//! Quartiles use linear interpolation between closest ranks, whiskers reach
//! the most extreme samples within `whis * IQR` of the box, and everything
//! beyond the whiskers is a flier.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    /// Computes box statistics. NaN samples are dropped; returns `None` when
    /// no finite-comparable sample remains.
    #[must_use]
    pub fn from_samples(samples: &[f64], whis: f64) -> Option<Self> {
        let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by_key(|v| OrderedFloat(*v));

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let reach = whis * (q3 - q1);
        let low_fence = q1 - reach;
        let high_fence = q3 + reach;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1)
            .min(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3)
            .max(q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < whisker_low || *v > whisker_high)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }
}

/// Grid size of density curves drawn by statistical plots.
pub const KDE_GRID_POINTS: usize = 64;

/// Gaussian kernel density estimate with Scott's bandwidth.
///
/// The curve is evaluated at `points` evenly spaced positions reaching three
/// bandwidths past the extreme samples. Non-finite samples are dropped.
/// Returns `None` with fewer than two samples, fewer than two grid points,
/// or samples without spread.
#[must_use]
pub fn gaussian_kde(samples: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 || points < 2 {
        return None;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = variance.sqrt() * n.powf(-0.2);
    if !bandwidth.is_normal() {
        return None;
    }

    let (min, max) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let start = min - 3.0 * bandwidth;
    let step = (max - min + 6.0 * bandwidth) / (points - 1) as f64;
    let scale = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..points)
        .map(|index| {
            let x = start + step * index as f64;
            let density: f64 = finite
                .iter()
                .map(|sample| (-0.5 * ((x - sample) / bandwidth).powi(2)).exp())
                .sum();
            (x, density * scale)
        })
        .collect();
    Some(curve)
}

fn quantile(sorted: &[f64], fraction: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * fraction;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = position - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}
