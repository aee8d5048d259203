//! Case-series transforms.
//!
//! Applied over the full day span of the selected rows, before slicing to
//! the study range, so the first sliced day of a differenced series is a
//! real daily count rather than a padding zero.

use ndarray::{s, Array2, ArrayView1, Axis};

/// Square root (optional) followed by first discrete difference (when the
/// data is not kept cumulative). The first day of a differenced series is 0.
pub fn transform_counts(raw: &Array2<i64>, cumulative_data: bool, square_root_data: bool) -> Array2<f64> {
    let mut data = raw.mapv(|v| v as f64);

    if square_root_data {
        data.mapv_inplace(f64::sqrt);
    }

    if !cumulative_data && data.ncols() > 0 {
        let mut diff = Array2::zeros(data.dim());
        let later = data.slice(s![.., 1..]);
        let earlier = data.slice(s![.., ..-1]);
        diff.slice_mut(s![.., 1..]).assign(&(&later - &earlier));
        data = diff;
    }

    data
}

/// Inverse of the differencing step: rebuilds a cumulative series from daily
/// values, anchored at `base` (the cumulative value of the first day).
pub fn cumulative_sum(daily: &Array2<f64>, base: ArrayView1<f64>) -> Array2<f64> {
    let mut out = Array2::zeros(daily.dim());
    if daily.ncols() == 0 {
        return out;
    }

    out.column_mut(0).assign(&base);
    for t in 1..daily.ncols() {
        let next = &out.column(t - 1) + &daily.column(t);
        out.column_mut(t).assign(&next);
    }
    out
}

/// Total transformed cases per day (sum over countries).
pub fn daily_totals(data: &Array2<f64>) -> ndarray::Array1<f64> {
    data.sum_axis(Axis(0))
}
