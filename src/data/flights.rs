//! Flight Frequencies: Per-Day Mobility Between a Fixed Country Cohort
//!
//! Each day carries one symmetric N×N matrix whose rows and columns follow
//! the cohort order of the source (not the canonical alphabetical order of a
//! study). [`FlightFrequencies::matrix_for`] does the reordering.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::{Array2, Axis};

use crate::config::COUNCIL_OF_EUROPE;
use crate::error::{WarningError, WarningResult};

/// Source of per-day flight-frequency matrices.
pub trait FlightFrequencies {
    /// Country codes in the row order of every matrix
    fn cohort(&self) -> &[String];

    /// Raw matrix for one day, in cohort order
    fn frequencies(&self, day: NaiveDate) -> Option<&Array2<f64>>;

    /// Matrix for one day with rows/columns in the order of `countries`.
    fn matrix_for(&self, day: NaiveDate, countries: &[String]) -> WarningResult<Array2<f64>> {
        let raw = self
            .frequencies(day)
            .ok_or_else(|| WarningError::MissingFlightData(format!("no flight frequencies for {day}")))?;

        let index = countries
            .iter()
            .map(|code| {
                self.cohort().iter().position(|c| c == code).ok_or_else(|| {
                    WarningError::country_undefined(format!("'{code}' is not part of the flight cohort"))
                })
            })
            .collect::<WarningResult<Vec<_>>>()?;

        Ok(raw.select(Axis(0), &index).select(Axis(1), &index))
    }
}

/// In-memory flight table.
#[derive(Debug, Clone, Default)]
pub struct FlightTable {
    cohort: Vec<String>,
    days: BTreeMap<NaiveDate, Array2<f64>>,
}

impl FlightTable {
    pub fn new<I, S>(cohort: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cohort: cohort.into_iter().map(Into::into).collect(),
            days: BTreeMap::new(),
        }
    }

    /// Empty table over the Council of Europe cohort.
    pub fn council_of_europe() -> Self {
        Self::new(COUNCIL_OF_EUROPE)
    }

    pub fn insert(&mut self, day: NaiveDate, matrix: Array2<f64>) -> WarningResult<()> {
        let n = self.cohort.len();
        if matrix.dim() != (n, n) {
            return Err(WarningError::invalid_parameter(format!(
                "flight matrix for {day} is {:?}, cohort needs ({n}, {n})",
                matrix.dim()
            )));
        }
        self.days.insert(day, matrix);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FlightFrequencies for FlightTable {
    fn cohort(&self) -> &[String] {
        &self.cohort
    }

    fn frequencies(&self, day: NaiveDate) -> Option<&Array2<f64>> {
        self.days.get(&day)
    }
}
