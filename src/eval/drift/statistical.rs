//! Statistical helper functions for drift detection.

use std::cmp::Ordering;

/// Floor for the reference standard deviation used to normalise distances
const MIN_NORM: f64 = 0.001;

/// Sort a copy of the finite values of `data`
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Two-sample KS statistic: the largest gap between the empirical CDFs
///
/// Both inputs must be sorted. Ties are consumed together on both sides so
/// that identical samples yield exactly zero.
pub fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut d_max = 0.0f64;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d_max = d_max.max((i as f64 / n1 - j as f64 / n2).abs());
    }
    d_max
}

/// Approximate p-value of a two-sample KS statistic
///
/// Uses the Kolmogorov distribution with the small-sample correction
/// `λ = (√nₑ + 0.12 + 0.11/√nₑ)·D`, `nₑ = n₁n₂/(n₁+n₂)`.
pub fn ks_two_sample_p_value(d: f64, n1: usize, n2: usize) -> f64 {
    if n1 == 0 || n2 == 0 {
        return 1.0;
    }
    let n_eff = (n1 as f64 * n2 as f64) / (n1 + n2) as f64;
    let sqrt_n = n_eff.sqrt();
    ks_p_value((sqrt_n + 0.12 + 0.11 / sqrt_n) * d)
}

/// Approximate p-value for KS statistic using Kolmogorov distribution
pub fn ks_p_value(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    // Asymptotic approximation: P(D > d) ≈ 2 * sum_{k=1}^∞ (-1)^{k+1} * exp(-2 * k^2 * λ^2)
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-10 {
            return (2.0 * p).clamp(0.0, 1.0);
        }
    }
    // series failed to converge: λ is tiny, the samples are indistinguishable
    1.0
}

/// Count samples in bins defined by edges
pub fn bin_counts(data: &[f64], edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; edges.len() - 1];
    for &val in data {
        for i in 0..counts.len() {
            if val > edges[i] && val <= edges[i + 1] {
                counts[i] += 1;
                break;
            }
        }
    }
    counts
}

/// Population Stability Index over reference deciles
///
/// `baseline` must be sorted. Either side empty gives 0.0, the same as
/// the other distances.
pub fn psi(baseline: &[f64], current: &[f64]) -> f64 {
    if baseline.is_empty() || current.is_empty() {
        return 0.0;
    }
    let n_bins = 10;
    let mut edges = Vec::with_capacity(n_bins + 1);
    edges.push(f64::NEG_INFINITY);
    for i in 1..n_bins {
        let idx = (baseline.len() * i / n_bins).min(baseline.len() - 1);
        edges.push(baseline[idx]);
    }
    edges.push(f64::INFINITY);

    let baseline_counts = bin_counts(baseline, &edges);
    let current_counts = bin_counts(current, &edges);

    let total_baseline = baseline.len() as f64;
    let total_current = current.len() as f64;

    let mut psi = 0.0;
    for (b_count, c_count) in baseline_counts.iter().zip(current_counts.iter()) {
        let b_pct = (*b_count as f64 + 0.0001) / (total_baseline + 0.001);
        let c_pct = (*c_count as f64 + 0.0001) / (total_current + 0.001);
        psi += (c_pct - b_pct) * (c_pct / b_pct).ln();
    }
    psi
}

/// First Wasserstein distance between two sorted empirical distributions
pub fn wasserstein_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (mut i, mut j) = (0usize, 0usize);
    let mut prev = a[0].min(b[0]);
    let mut distance = 0.0;

    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) => x.min(y),
            (Some(&x), None) => x,
            (None, Some(&y)) => y,
            (None, None) => break,
        };
        let cdf_gap = (i as f64 / n1 - j as f64 / n2).abs();
        distance += cdf_gap * (next - prev);
        while i < a.len() && a[i] <= next {
            i += 1;
        }
        while j < b.len() && b[j] <= next {
            j += 1;
        }
        prev = next;
    }
    distance
}

/// Wasserstein distance divided by the reference standard deviation
pub fn normed_wasserstein(reference: &[f64], current: &[f64]) -> f64 {
    wasserstein_distance(reference, current) / std_dev(reference).max(MIN_NORM)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    (data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}
