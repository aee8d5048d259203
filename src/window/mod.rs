//! Window Module: Sliding-Window Alignment
//!
//! Converts a requested date range and window size into a [`WindowPlan`]:
//! the corrected start date, the extended start from which data is pulled,
//! and the column ranges of every (t0, t1) window pair.

mod scheduler;

pub use scheduler::{WindowPlan, WindowScheduler};
