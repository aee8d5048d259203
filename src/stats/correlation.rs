//! Correlation Engine: Pairwise Coefficients Between Country Series
//!
//! Three coefficients are supported:
//!
//! - **Pearson**: r = cov(x, y) / (σₓ σᵧ)
//! - **Spearman**: Pearson over average ranks (ties share the mean rank)
//! - **Kendall τ_b**: (n_c − n_d) / √((n₀ − n₁)(n₀ − n₂))
//!
//! Degenerate inputs (fewer than two samples, zero variance) give NaN from
//! the raw coefficient functions; [`correlate`] maps NaN to 0.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::config::CorrelationMethod;

/// Correlation under `method`, with NaN coerced to 0.
pub fn correlate(method: CorrelationMethod, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let cc = match method {
        CorrelationMethod::Pearson => pearson(x, y),
        CorrelationMethod::Spearman => spearman(x, y),
        CorrelationMethod::Kendall => kendall_tau_b(x, y),
    };
    if cc.is_nan() {
        0.0
    } else {
        cc
    }
}

/// Full N×N matrix of [`correlate`] between the rows of `window`, diagonal
/// included (a constant row correlates 0 with itself).
pub fn correlation_matrix(method: CorrelationMethod, window: ArrayView2<f64>) -> Array2<f64> {
    let n = window.nrows();
    let mut cc = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let v = correlate(method, window.row(i), window.row(j));
            cc[[i, j]] = v;
            cc[[j, i]] = v;
        }
    }
    cc
}

/// Pearson product-moment correlation
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let nf = n as f64;
    let mean_x = x.iter().take(n).sum::<f64>() / nf;
    let mean_y = y.iter().take(n).sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }

    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Spearman rank correlation
pub fn spearman(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let rx = average_ranks(x);
    let ry = average_ranks(y);
    pearson(ArrayView1::from(&rx), ArrayView1::from(&ry))
}

/// Kendall rank correlation, tau-b variant (tie corrected)
pub fn kendall_tau_b(x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;

    for i in 0..n {
        for j in i + 1..n {
            let dx = x[j] - x[i];
            let dy = y[j] - y[i];
            if dx == 0.0 {
                ties_x += 1;
            }
            if dy == 0.0 {
                ties_y += 1;
            }
            if dx == 0.0 || dy == 0.0 {
                continue;
            }
            if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let n0 = (n * (n - 1) / 2) as i64;
    let denom = (((n0 - ties_x) * (n0 - ties_y)) as f64).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }

    ((concordant - discordant) as f64 / denom).clamp(-1.0, 1.0)
}

/// 1-based ranks with ties sharing their average rank.
pub fn average_ranks(x: ArrayView1<f64>) -> Vec<f64> {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && x[order[j + 1]] == x[order[i]] {
            j += 1;
        }
        // Positions i..=j share the mean of ranks i+1..=j+1
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = rank;
        }
        i = j + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_pearson_perfect() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![2.0, 4.0, 6.0, 8.0];
        assert_abs_diff_eq!(pearson(x.view(), y.view()), 1.0, epsilon = 1e-12);
        let z = array![8.0, 6.0, 4.0, 2.0];
        assert_abs_diff_eq!(pearson(x.view(), z.view()), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = array![2.0, 1.0, 4.0, 3.0, 5.0];
        assert_abs_diff_eq!(pearson(x.view(), y.view()), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_variance_is_nan_then_zero() {
        let x = array![3.0, 3.0, 3.0];
        let y = array![1.0, 2.0, 3.0];
        assert!(pearson(x.view(), y.view()).is_nan());
        assert_eq!(correlate(CorrelationMethod::Pearson, x.view(), y.view()), 0.0);
        assert_eq!(correlate(CorrelationMethod::Kendall, x.view(), y.view()), 0.0);
    }

    #[test]
    fn test_average_ranks_ties() {
        let x = array![10.0, 20.0, 10.0, 30.0];
        assert_eq!(average_ranks(x.view()), vec![1.5, 3.0, 1.5, 4.0]);
    }

    #[test]
    fn test_spearman_monotone() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = array![1.0, 4.0, 9.0, 16.0, 100.0];
        assert_abs_diff_eq!(spearman(x.view(), y.view()), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kendall_known_value() {
        // One discordant pair out of six
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![1.0, 3.0, 2.0, 4.0];
        assert_abs_diff_eq!(kendall_tau_b(x.view(), y.view()), 4.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kendall_with_ties() {
        // scipy.stats.kendalltau([1, 2, 2, 3], [1, 2, 3, 3]) = 0.8
        let x = array![1.0, 2.0, 2.0, 3.0];
        let y = array![1.0, 2.0, 3.0, 3.0];
        assert_abs_diff_eq!(kendall_tau_b(x.view(), y.view()), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_correlation_matrix_symmetric() {
        let w = array![[1.0, 2.0, 3.0], [3.0, 1.0, 2.0], [5.0, 5.0, 5.0]];
        let cc = correlation_matrix(CorrelationMethod::Pearson, w.view());
        assert_eq!(cc, cc.t());
        assert_abs_diff_eq!(cc[[0, 0]], 1.0, epsilon = 1e-12);
        // Constant row correlates 0 with everything, itself included
        assert_eq!(cc.row(2).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_short_series_nan() {
        let x = Array1::from(vec![1.0]);
        assert!(pearson(x.view(), x.view()).is_nan());
        assert!(kendall_tau_b(x.view(), x.view()).is_nan());
    }
}
