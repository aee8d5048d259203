//! Statistics Module: Window-Level Coefficients
//!
//! Every network variant reduces two windows of country series to pairwise
//! correlation coefficients and per-country dispersions. Both live here so
//! the builders stay purely combinatorial.

mod correlation;
mod dispersion;

pub use correlation::{
    average_ranks, correlate, correlation_matrix, kendall_tau_b, pearson, spearman,
};
pub use dispersion::{row_std, sample_std};
