//! Window Scheduler: Date Alignment of the Sliding Windows
//!
//! Every network instant t is built from two windows of transformed data,
//! `window_t0` and `window_t1`, with `window_t1` one day later. Two modes:
//!
//! - **Windowed** (w > 0): both windows hold w days; the pair spans w + 1
//!   days, so w days of history must precede the first instant.
//! - **No-window** (w = 0): windows grow from the extended start; t1 holds
//!   every day up to the instant and t0 one day less. Two days of history
//!   must precede the first instant.
//!
//! When the dataset lacks that history before `start_date`, the start is
//! pushed forward by the shortfall. The shift is a pure function of the
//! inputs and re-aligning an already aligned start is a no-op.

use std::ops::Range;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{WarningError, WarningResult};

/// History needed before the first instant in no-window mode.
const NO_WINDOW_HISTORY: usize = 2;

/// Aligns study ranges against the dates available in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowScheduler {
    /// First date with reports
    min_date: NaiveDate,
    /// Last date with reports
    max_date: NaiveDate,
}

/// Result of aligning a study range: everything needed to slice windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlan {
    /// Start date as requested by the caller
    pub requested_start: NaiveDate,
    /// Corrected start date: the date of the first instant
    pub start_date: NaiveDate,
    /// Last instant (inclusive)
    pub end_date: NaiveDate,
    /// First day of data pulled for the first window pair
    pub window_start: NaiveDate,
    /// Days per window, 0 for no-window mode
    pub window_size: usize,
}

impl WindowScheduler {
    pub fn new(min_date: NaiveDate, max_date: NaiveDate) -> Self {
        Self { min_date, max_date }
    }

    pub fn min_date(&self) -> NaiveDate {
        self.min_date
    }

    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    /// Check a requested range against the dataset bounds and window size.
    pub fn validate(&self, start: NaiveDate, end: NaiveDate, window_size: usize) -> WarningResult<()> {
        if start > end {
            return Err(WarningError::date_out_range("<start_date> must be older than <end_date>."));
        }
        if start < self.min_date || end > self.max_date {
            return Err(WarningError::date_out_range(format!(
                "Dates out of range. [{} , {}]",
                self.min_date, self.max_date
            )));
        }
        if window_size > 0 {
            if days_between(self.min_date, end) < window_size as i64 {
                return Err(WarningError::date_out_range(
                    "The interval between the first report date in the database and the <end_date> must be \
                     equal or greater than <window_size>.",
                ));
            }
        } else if days_between(start, end) < NO_WINDOW_HISTORY as i64 {
            return Err(WarningError::date_out_range(
                "The interval between <start_date> and <end_date> must be at least of 2 days.",
            ));
        }
        Ok(())
    }

    /// Corrected start date and extended window start for `start`.
    ///
    /// Assumes `start` lies inside the dataset.
    pub fn align_start(&self, start: NaiveDate, window_size: usize) -> (NaiveDate, NaiveDate) {
        let history = if window_size > 0 { window_size } else { NO_WINDOW_HISTORY };
        let rest_days = days_between(self.min_date, start).max(0) as u64;

        if rest_days >= history as u64 {
            (start, start - Days::new(history as u64))
        } else {
            (start + Days::new(history as u64 - rest_days), self.min_date)
        }
    }

    /// Validate and align in one step.
    pub fn plan(&self, start: NaiveDate, end: NaiveDate, window_size: usize) -> WarningResult<WindowPlan> {
        self.validate(start, end, window_size)?;
        let (start_date, window_start) = self.align_start(start, window_size);

        Ok(WindowPlan {
            requested_start: start,
            start_date,
            end_date: end,
            window_start,
            window_size,
        })
    }
}

impl WindowPlan {
    pub fn is_windowed(&self) -> bool {
        self.window_size > 0
    }

    /// Days the start was pushed forward
    pub fn start_shift(&self) -> i64 {
        days_between(self.requested_start, self.start_date)
    }

    /// Columns of data needed, from `window_start` to `end_date` inclusive.
    pub fn n_days(&self) -> usize {
        (days_between(self.window_start, self.end_date) + 1) as usize
    }

    /// Number of network instants.
    pub fn n_instants(&self) -> usize {
        let history = if self.is_windowed() { self.window_size } else { NO_WINDOW_HISTORY };
        self.n_days() - history
    }

    /// Number of adjacency instants, one more than networks.
    pub fn n_adjacencies(&self) -> usize {
        self.n_instants() + 1
    }

    /// Calendar date of network instant `t`.
    pub fn instant_date(&self, t: usize) -> NaiveDate {
        self.start_date + Days::new(t as u64)
    }

    /// Calendar dates of all network instants.
    pub fn instant_dates(&self) -> Vec<NaiveDate> {
        (0..self.n_instants()).map(|t| self.instant_date(t)).collect()
    }

    /// Data columns (relative to `window_start`) of the earlier window.
    pub fn t0_columns(&self, t: usize) -> Range<usize> {
        if self.is_windowed() {
            t..t + self.window_size
        } else {
            0..t + NO_WINDOW_HISTORY
        }
    }

    /// Data columns (relative to `window_start`) of the later window.
    pub fn t1_columns(&self, t: usize) -> Range<usize> {
        if self.is_windowed() {
            t + 1..t + 1 + self.window_size
        } else {
            0..t + NO_WINDOW_HISTORY + 1
        }
    }

    /// Data column (relative to `window_start`) of instant `t`'s own day.
    pub fn instant_column(&self, t: usize) -> usize {
        self.t1_columns(t).end - 1
    }

    /// First day summed into adjacency instant `a`.
    pub fn adjacency_first_day(&self, a: usize) -> NaiveDate {
        if self.is_windowed() {
            self.window_start + Days::new(a as u64)
        } else {
            self.window_start
        }
    }

    /// Last day summed into adjacency instant `a`.
    pub fn adjacency_last_day(&self, a: usize) -> NaiveDate {
        if self.is_windowed() {
            self.window_start + Days::new((a + self.window_size - 1) as u64)
        } else {
            self.window_start + Days::new((a + NO_WINDOW_HISTORY - 1) as u64)
        }
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
