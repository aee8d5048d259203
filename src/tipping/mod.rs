//! Tipping Module: Abrupt-Change Detection on Marker Series
//!
//! Stateless fold-change scans. Work on any numeric series: a marker, a
//! landscape row, or daily case totals.

mod fold_change;

pub use fold_change::{k_fold_changes, k_fold_changes_multiple};
