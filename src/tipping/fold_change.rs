//! Fold-Change Tipping Points
//!
//! A position i + j (1 ≤ j ≤ step) is a tipping point when an earlier
//! non-zero sample is exceeded k_fold times:
//!
//! ```text
//! x[i] ≠ 0  ∧  x[i + j] > k · x[i]
//! ```
//!
//! The mask has the input's length. Several (i, j) pairs may flag the same
//! position; flags only ever turn on.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::error::{WarningError, WarningResult};

fn check_fold(k_fold: f64, step: usize) -> WarningResult<()> {
    if !k_fold.is_finite() || k_fold < 0.0 {
        return Err(WarningError::invalid_parameter(format!(
            "k_fold must be finite and non-negative; got {k_fold}"
        )));
    }
    if step == 0 {
        return Err(WarningError::invalid_parameter("step must be at least 1"));
    }
    Ok(())
}

fn scan(series: ArrayView1<f64>, k_fold: f64, step: usize) -> Array1<u8> {
    let n = series.len();
    let mut mask = Array1::zeros(n);
    for i in 0..n {
        let base = series[i];
        if base == 0.0 {
            continue;
        }
        for j in 1..=step.min(n - 1 - i) {
            if series[i + j] > k_fold * base {
                mask[i + j] = 1;
            }
        }
    }
    mask
}

/// 0/1 tipping-point mask of one series.
pub fn k_fold_changes(series: ArrayView1<f64>, k_fold: f64, step: usize) -> WarningResult<Array1<u8>> {
    check_fold(k_fold, step)?;
    Ok(scan(series, k_fold, step))
}

/// Shared mask over parallel series (rows): an index is flagged when at
/// least `rate_compare` of the rows flag it.
pub fn k_fold_changes_multiple(
    series: ArrayView2<f64>,
    k_fold: f64,
    step: usize,
    rate_compare: f64,
) -> WarningResult<Array1<u8>> {
    check_fold(k_fold, step)?;
    if !(0.0..=1.0).contains(&rate_compare) {
        return Err(WarningError::invalid_parameter(format!(
            "rate_compare must lie in [0, 1]; got {rate_compare}"
        )));
    }

    let rows = series.nrows();
    let mut votes = Array1::<usize>::zeros(series.ncols());
    for row in series.axis_iter(Axis(0)) {
        votes += &scan(row, k_fold, step).mapv(usize::from);
    }

    if rows == 0 {
        return Ok(Array1::zeros(series.ncols()));
    }
    Ok(votes.mapv(|v| u8::from(v > 0 && v as f64 / rows as f64 >= rate_compare)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_doubling_is_not_enough() {
        let mask = k_fold_changes(array![1.0, 2.0, 5.0, 5.0, 20.0].view(), 2.0, 1).unwrap();
        assert_eq!(mask, array![0, 0, 1, 0, 1]);
    }

    #[test]
    fn test_zero_base_never_triggers() {
        let mask = k_fold_changes(array![0.0, 100.0, 0.0, 3.0].view(), 2.0, 2).unwrap();
        assert_eq!(mask, array![0, 0, 0, 0]);
    }

    #[test]
    fn test_lookahead_reaches_past_neighbours() {
        // 1 -> 1.5 -> 3: only a two-step look-ahead sees the tripling
        let series = array![1.0, 1.5, 3.0];
        assert_eq!(k_fold_changes(series.view(), 2.5, 1).unwrap(), array![0, 0, 0]);
        assert_eq!(k_fold_changes(series.view(), 2.5, 2).unwrap(), array![0, 0, 1]);
    }

    #[test]
    fn test_invalid_parameters() {
        let s = array![1.0, 2.0];
        assert!(k_fold_changes(s.view(), -1.0, 1).is_err());
        assert!(k_fold_changes(s.view(), f64::NAN, 1).is_err());
        assert!(k_fold_changes(s.view(), 2.0, 0).is_err());
        let m = array![[1.0, 2.0]];
        assert!(k_fold_changes_multiple(m.view(), 2.0, 1, 1.5).is_err());
    }

    #[test]
    fn test_multiple_rate() {
        let series = array![
            [1.0, 3.0, 3.0, 9.0],
            [1.0, 3.0, 3.0, 3.0],
            [1.0, 1.0, 1.0, 9.0],
        ];
        // Index 1: 2 of 3 rows; index 3: 2 of 3 rows
        let half = k_fold_changes_multiple(series.view(), 2.0, 1, 0.5).unwrap();
        assert_eq!(half, array![0, 1, 0, 1]);
        let all = k_fold_changes_multiple(series.view(), 2.0, 1, 1.0).unwrap();
        assert_eq!(all, array![0, 0, 0, 0]);
    }

    proptest! {
        #[test]
        fn test_mask_shape_and_first_sample(
            values in prop::collection::vec(-100.0f64..100.0, 1..40),
            k in 0.0f64..5.0,
            step in 1usize..6,
        ) {
            let series = Array1::from(values);
            let mask = k_fold_changes(series.view(), k, step).unwrap();
            prop_assert_eq!(mask.len(), series.len());
            prop_assert_eq!(mask[0], 0);
            prop_assert!(mask.iter().all(|&m| m <= 1));
        }

        #[test]
        fn test_larger_step_only_adds_flags(
            values in prop::collection::vec(0.0f64..50.0, 2..30),
            k in 0.5f64..4.0,
        ) {
            let series = Array1::from(values);
            let narrow = k_fold_changes(series.view(), k, 1).unwrap();
            let wide = k_fold_changes(series.view(), k, 3).unwrap();
            for (a, b) in narrow.iter().zip(wide.iter()) {
                prop_assert!(a <= b);
            }
        }
    }
}
