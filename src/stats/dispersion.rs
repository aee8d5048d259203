//! Sample dispersion of a window.

use ndarray::{Array1, ArrayView1, ArrayView2};

/// Sample standard deviation (n − 1 denominator); NaN below two samples.
pub fn sample_std(x: ArrayView1<f64>) -> f64 {
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = x.sum() / n as f64;
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Sample standard deviation of every row.
pub fn row_std(window: ArrayView2<f64>) -> Array1<f64> {
    window.rows().into_iter().map(sample_std).collect()
}
