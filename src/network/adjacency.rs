//! Adjacency Providers: Which Countries May Be Connected at Each Instant
//!
//! A provider returns one N×N matrix per adjacency instant, i.e.
//! `plan.n_adjacencies()` matrices, one more than the number of networks.
//! Network t is derived from adjacencies t and t + 1.
//!
//! - [`StaticComplete`]: ones everywhere except the diagonal
//! - [`StaticCustom`]: one caller-supplied matrix reused at every instant
//! - [`DynamicFlight`]: flight frequencies summed over each window and
//!   normalized by half their total (the matrices are symmetric)

use ndarray::Array2;
use tracing::debug;

use crate::data::FlightFrequencies;
use crate::error::{WarningError, WarningResult};
use crate::window::WindowPlan;

/// Strategy producing the time-indexed adjacency sequence.
pub trait AdjacencyProvider {
    fn name(&self) -> &'static str;

    /// Adjacency for every instant of `plan`, rows in `countries` order.
    fn adjacencies(&self, plan: &WindowPlan, countries: &[String]) -> WarningResult<Vec<Array2<f64>>>;
}

/// Complete unweighted graph without self loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticComplete;

impl StaticComplete {
    pub fn matrix(n: usize) -> Array2<f64> {
        let mut adjacency = Array2::ones((n, n));
        adjacency.diag_mut().fill(0.0);
        adjacency
    }
}

impl AdjacencyProvider for StaticComplete {
    fn name(&self) -> &'static str {
        "static-complete"
    }

    fn adjacencies(&self, plan: &WindowPlan, countries: &[String]) -> WarningResult<Vec<Array2<f64>>> {
        Ok(vec![Self::matrix(countries.len()); plan.n_adjacencies()])
    }
}

/// Fixed caller-supplied adjacency.
#[derive(Debug, Clone)]
pub struct StaticCustom {
    matrix: Array2<f64>,
}

impl StaticCustom {
    /// Square, finite, non-negative; the diagonal is forced to zero.
    pub fn new(mut matrix: Array2<f64>) -> WarningResult<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(WarningError::invalid_parameter(format!(
                "custom adjacency must be square; got {:?}",
                matrix.dim()
            )));
        }
        if matrix.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(WarningError::invalid_parameter(
                "custom adjacency entries must be finite and non-negative",
            ));
        }
        if matrix.diag().iter().any(|&v| v != 0.0) {
            debug!("zeroing the diagonal of a custom adjacency");
            matrix.diag_mut().fill(0.0);
        }
        Ok(Self { matrix })
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> WarningResult<Self> {
        let n = rows.len();
        if rows.iter().any(|r| r.len() != n) {
            return Err(WarningError::invalid_parameter("custom adjacency rows must all have length N"));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((n, n), flat)
            .map_err(|e| WarningError::invalid_parameter(e.to_string()))?;
        Self::new(matrix)
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }
}

impl AdjacencyProvider for StaticCustom {
    fn name(&self) -> &'static str {
        "static-custom"
    }

    fn adjacencies(&self, plan: &WindowPlan, countries: &[String]) -> WarningResult<Vec<Array2<f64>>> {
        let n = countries.len();
        if self.matrix.dim() != (n, n) {
            return Err(WarningError::invalid_parameter(format!(
                "custom adjacency is {:?} but the study has {n} countries",
                self.matrix.dim()
            )));
        }
        Ok(vec![self.matrix.clone(); plan.n_adjacencies()])
    }
}

/// Flight-frequency weighted adjacency.
///
/// Windowed mode sums the `window_size` days ending at each adjacency
/// instant. No-window mode sums every day from the extended start, growing
/// with the windows.
pub struct DynamicFlight<'a, F: FlightFrequencies + ?Sized> {
    flights: &'a F,
}

impl<'a, F: FlightFrequencies + ?Sized> DynamicFlight<'a, F> {
    pub fn new(flights: &'a F) -> Self {
        Self { flights }
    }
}

impl<F: FlightFrequencies + ?Sized> AdjacencyProvider for DynamicFlight<'_, F> {
    fn name(&self) -> &'static str {
        "dynamic-flight"
    }

    fn adjacencies(&self, plan: &WindowPlan, countries: &[String]) -> WarningResult<Vec<Array2<f64>>> {
        let n = countries.len();

        // Every day from window_start to end_date is read exactly once
        let daily = (0..plan.n_days())
            .map(|i| self.flights.matrix_for(plan.window_start + chrono::Days::new(i as u64), countries))
            .collect::<WarningResult<Vec<_>>>()?;

        let mut adjacencies = Vec::with_capacity(plan.n_adjacencies());
        for a in 0..plan.n_adjacencies() {
            let first = (plan.adjacency_first_day(a) - plan.window_start).num_days() as usize;
            let last = (plan.adjacency_last_day(a) - plan.window_start).num_days() as usize;

            let mut sum = Array2::<f64>::zeros((n, n));
            for day in &daily[first..=last] {
                sum += day;
            }
            adjacencies.push(normalize_half_total(sum));
        }

        debug!(instants = adjacencies.len(), days = daily.len(), "built flight adjacencies");
        Ok(adjacencies)
    }
}

/// Divide by half the matrix total, or by 1 when the total is zero.
fn normalize_half_total(mut matrix: Array2<f64>) -> Array2<f64> {
    let total = matrix.sum();
    let norm = if total > 0.0 { total / 2.0 } else { 1.0 };
    matrix /= norm;
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FlightTable;
    use crate::window::WindowScheduler;
    use approx::assert_abs_diff_eq;
    use chrono::{Days, NaiveDate};
    use ndarray::array;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, day).unwrap()
    }

    fn countries() -> Vec<String> {
        vec!["AL".into(), "ES".into(), "FR".into()]
    }

    #[test]
    fn test_static_complete() {
        let plan = WindowScheduler::new(d(1, 1), d(3, 1)).plan(d(2, 1), d(2, 10), 5).unwrap();
        let adj = StaticComplete.adjacencies(&plan, &countries()).unwrap();
        assert_eq!(adj.len(), plan.n_instants() + 1);
        assert_eq!(adj[0], array![[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]]);
    }

    #[test]
    fn test_static_custom_shape_checked() {
        let plan = WindowScheduler::new(d(1, 1), d(3, 1)).plan(d(2, 1), d(2, 10), 5).unwrap();
        let custom = StaticCustom::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        assert!(custom.adjacencies(&plan, &countries()).is_err());
        assert!(StaticCustom::from_rows(&[vec![0.0, -1.0], vec![1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_static_custom_zeroes_diagonal() {
        let custom = StaticCustom::new(array![[5.0, 1.0], [1.0, 5.0]]).unwrap();
        assert_eq!(custom.matrix(), &array![[0.0, 1.0], [1.0, 0.0]]);
    }

    fn flight_table(first: NaiveDate, days: u64) -> FlightTable {
        let mut table = FlightTable::new(["FR", "ES", "AL"]);
        for i in 0..days {
            // FR-ES flights grow by one per day; AL is isolated
            let f = (i + 1) as f64;
            table
                .insert(first + Days::new(i), array![[0.0, f, 0.0], [f, 0.0, 0.0], [0.0, 0.0, 0.0]])
                .unwrap();
        }
        table
    }

    #[test]
    fn test_dynamic_windowed_normalized() {
        let table = flight_table(d(1, 1), 60);
        let plan = WindowScheduler::new(d(1, 1), d(3, 1)).plan(d(2, 1), d(2, 10), 5).unwrap();
        let adj = DynamicFlight::new(&table).adjacencies(&plan, &countries()).unwrap();

        assert_eq!(adj.len(), plan.n_adjacencies());
        for a in &adj {
            // Half the total of a symmetric single-edge matrix is the edge itself
            assert_abs_diff_eq!(a[[1, 2]], 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(a.sum(), 2.0, epsilon = 1e-12);
            assert_eq!(a[[0, 1]], 0.0);
        }
    }

    #[test]
    fn test_dynamic_zero_total_divides_by_one() {
        let mut table = FlightTable::new(["AL", "ES", "FR"]);
        for i in 0..40 {
            table.insert(d(1, 1) + Days::new(i), Array2::zeros((3, 3))).unwrap();
        }
        let plan = WindowScheduler::new(d(1, 1), d(2, 9)).plan(d(1, 10), d(1, 20), 0).unwrap();
        let adj = DynamicFlight::new(&table).adjacencies(&plan, &countries()).unwrap();
        assert_eq!(adj.len(), plan.n_adjacencies());
        assert!(adj.iter().all(|a| a.iter().all(|v| *v == 0.0)));
    }

    #[test]
    fn test_dynamic_missing_day() {
        let table = flight_table(d(2, 1), 5);
        let plan = WindowScheduler::new(d(1, 1), d(3, 1)).plan(d(2, 1), d(2, 10), 5).unwrap();
        let err = DynamicFlight::new(&table).adjacencies(&plan, &countries()).unwrap_err();
        assert!(matches!(err, WarningError::MissingFlightData(_)));
    }
}
