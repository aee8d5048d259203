//! Network Builders: From Window Pairs to Differential Networks
//!
//! For every instant t two windows of transformed data are compared:
//! `window_t0` and `window_t1`, the latter one day later. With
//! cc = correlation and σ = sample standard deviation:
//!
//! - **Correlation**: cc_t1(i, j), the plain network of the later window
//! - **DNM**: |(|cc_t1| − |cc_t0|)| · |((σᵢ₁ + σⱼ₁) − (σᵢ₀ + σⱼ₀)) / 2|
//! - **Landscape**: see [`super::LandscapeNetwork`]
//!
//! Every network has a zero diagonal, NaN coerced to 0, and is masked
//! elementwise by `adjacency[t + 1]` once built.

use ndarray::{Array1, Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CorrelationMethod;
use crate::error::{WarningError, WarningResult};
use crate::stats::{correlation_matrix, row_std};
use crate::window::WindowPlan;

/// Data handed to a builder for one instant.
#[derive(Debug, Clone, Copy)]
pub struct InstantWindows<'a> {
    /// Earlier window, countries × days
    pub t0: ArrayView2<'a, f64>,
    /// Later window, offset by one day
    pub t1: ArrayView2<'a, f64>,
    pub adjacency_t0: ArrayView2<'a, f64>,
    pub adjacency_t1: ArrayView2<'a, f64>,
}

/// Output of one instant: the network, plus the landscape column for
/// builders that produce one.
#[derive(Debug, Clone)]
pub struct InstantNetwork {
    pub network: Array2<f64>,
    pub landscape: Option<Array1<f64>>,
}

impl InstantNetwork {
    fn plain(network: Array2<f64>) -> Self {
        Self {
            network,
            landscape: None,
        }
    }
}

/// Strategy turning a window pair into a network.
pub trait NetworkBuilder {
    fn name(&self) -> &'static str;

    /// Whether [`InstantNetwork::landscape`] is filled at every instant.
    fn produces_landscape(&self) -> bool {
        false
    }

    fn window_to_network(&self, windows: &InstantWindows<'_>) -> InstantNetwork;
}

/// Networks of a whole study, and the landscape accumulator when built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSequence {
    pub networks: Vec<Array2<f64>>,
    /// Countries × instants
    pub landscape: Option<Array2<f64>>,
}

/// Build every network of `plan` from the transformed `data` (columns from
/// `plan.window_start`) and the adjacency sequence.
pub fn build_networks<B: NetworkBuilder + ?Sized>(
    builder: &B,
    data: &Array2<f64>,
    plan: &WindowPlan,
    adjacencies: &[Array2<f64>],
) -> WarningResult<NetworkSequence> {
    let n_instants = plan.n_instants();
    if adjacencies.len() != n_instants + 1 {
        return Err(WarningError::invalid_parameter(format!(
            "expected {} adjacencies for {n_instants} instants, got {}",
            n_instants + 1,
            adjacencies.len()
        )));
    }
    if data.ncols() != plan.n_days() {
        return Err(WarningError::invalid_parameter(format!(
            "data holds {} days but the windows span {}",
            data.ncols(),
            plan.n_days()
        )));
    }

    let n = data.nrows();
    if let Some(t) = adjacencies.iter().position(|adj| adj.dim() != (n, n)) {
        return Err(WarningError::invalid_parameter(format!(
            "adjacency {t} is {:?} but the study has {n} countries",
            adjacencies[t].dim()
        )));
    }
    let mut accumulator = builder
        .produces_landscape()
        .then(|| Array2::from_elem((n, n_instants), f64::NAN));
    let mut networks = Vec::with_capacity(n_instants);

    for t in 0..n_instants {
        let windows = InstantWindows {
            t0: data.slice(ndarray::s![.., plan.t0_columns(t)]),
            t1: data.slice(ndarray::s![.., plan.t1_columns(t)]),
            adjacency_t0: adjacencies[t].view(),
            adjacency_t1: adjacencies[t + 1].view(),
        };
        let InstantNetwork { mut network, landscape } = builder.window_to_network(&windows);

        network *= &adjacencies[t + 1];
        network.mapv_inplace(nan_to_zero);
        networks.push(network);

        if let (Some(acc), Some(column)) = (accumulator.as_mut(), landscape) {
            acc.column_mut(t).assign(&column);
        }
        trace!(instant = t, date = %plan.instant_date(t), "network built");
    }

    debug!(builder = builder.name(), instants = networks.len(), "networks built");
    Ok(NetworkSequence {
        networks,
        landscape: accumulator,
    })
}

pub(crate) fn nan_to_zero(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// |σ(t1) − σ(t0)| per country, NaN coerced to 0.
pub(crate) fn differential_dispersion(t0: ArrayView2<f64>, t1: ArrayView2<f64>) -> Array1<f64> {
    let mut diff = row_std(t1) - row_std(t0);
    diff.mapv_inplace(|v| nan_to_zero(v.abs()));
    diff
}

/// Signed correlation of the later window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationNetwork {
    pub method: CorrelationMethod,
}

impl CorrelationNetwork {
    pub fn new(method: CorrelationMethod) -> Self {
        Self { method }
    }
}

impl NetworkBuilder for CorrelationNetwork {
    fn name(&self) -> &'static str {
        "correlation"
    }

    fn window_to_network(&self, windows: &InstantWindows<'_>) -> InstantNetwork {
        let mut network = correlation_matrix(self.method, windows.t1);
        network.diag_mut().fill(0.0);
        InstantNetwork::plain(network)
    }
}

/// Dynamic network marker: differential correlation weighted by
/// differential dispersion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnmNetwork {
    pub method: CorrelationMethod,
}

impl DnmNetwork {
    pub fn new(method: CorrelationMethod) -> Self {
        Self { method }
    }
}

impl NetworkBuilder for DnmNetwork {
    fn name(&self) -> &'static str {
        "dnm"
    }

    fn window_to_network(&self, windows: &InstantWindows<'_>) -> InstantNetwork {
        let n = windows.t0.nrows();
        let cc_t0 = correlation_matrix(self.method, windows.t0);
        let cc_t1 = correlation_matrix(self.method, windows.t1);
        let sd_t0 = row_std(windows.t0);
        let sd_t1 = row_std(windows.t1);

        let mut network = Array2::zeros((n, n));
        for i in 0..n {
            for j in i + 1..n {
                let cc = cc_t1[[i, j]].abs() - cc_t0[[i, j]].abs();
                let sd = (sd_t1[i] + sd_t1[j]) / 2.0 - (sd_t0[i] + sd_t0[j]) / 2.0;
                let w = nan_to_zero(cc.abs() * sd.abs());
                network[[i, j]] = w;
                network[[j, i]] = w;
            }
        }
        InstantNetwork::plain(network)
    }
}

/// |(|cc_t1| − |cc_t0|)| for every pair, zero diagonal.
pub(crate) fn differential_correlation(cc_t0: &Array2<f64>, cc_t1: &Array2<f64>) -> Array2<f64> {
    let mut network = Array2::zeros(cc_t0.raw_dim());
    Zip::from(&mut network)
        .and(cc_t0)
        .and(cc_t1)
        .for_each(|w, &c0, &c1| *w = nan_to_zero((c1.abs() - c0.abs()).abs()));
    network.diag_mut().fill(0.0);
    network
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::StaticComplete;
    use crate::window::WindowScheduler;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use ndarray::array;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, day).unwrap()
    }

    fn windows<'a>(t0: &'a Array2<f64>, t1: &'a Array2<f64>, adj: &'a Array2<f64>) -> InstantWindows<'a> {
        InstantWindows {
            t0: t0.view(),
            t1: t1.view(),
            adjacency_t0: adj.view(),
            adjacency_t1: adj.view(),
        }
    }

    #[test]
    fn test_dnm_hand_computed_pair() {
        // Row 0 flips from anti- to perfect correlation with row 1
        let t0 = array![[1.0, 2.0, 3.0], [3.0, 2.0, 1.0]];
        let t1 = array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0]];
        let adj = StaticComplete::matrix(2);
        let out = DnmNetwork::default().window_to_network(&windows(&t0, &t1, &adj));

        // |1 - 1| = 0 correlation change, so the edge vanishes
        assert_abs_diff_eq!(out.network[[0, 1]], 0.0, epsilon = 1e-12);

        let t1 = array![[1.0, 2.0, 3.0], [2.0, 6.0, 2.0]];
        let out = DnmNetwork::default().window_to_network(&windows(&t0, &t1, &adj));
        // cc_t1 = 0, cc_t0 = -1; σ: row0 1 → 1, row1 1 → √(16/3)
        let sd = ((1.0 + (16.0f64 / 3.0).sqrt()) / 2.0 - 1.0).abs();
        assert_abs_diff_eq!(out.network[[0, 1]], sd, epsilon = 1e-12);
        assert_eq!(out.network[[0, 1]], out.network[[1, 0]]);
        assert_eq!(out.network[[0, 0]], 0.0);
        assert!(out.landscape.is_none());
    }

    #[test]
    fn test_constant_rows_give_zero_not_nan() {
        let t0 = array![[1.0, 1.0, 1.0], [3.0, 2.0, 1.0]];
        let t1 = array![[1.0, 1.0, 1.0], [2.0, 4.0, 6.0]];
        let adj = StaticComplete::matrix(2);
        let out = DnmNetwork::default().window_to_network(&windows(&t0, &t1, &adj));
        assert!(out.network.iter().all(|v| v.is_finite()));
        let out = CorrelationNetwork::default().window_to_network(&windows(&t0, &t1, &adj));
        assert_eq!(out.network, Array2::<f64>::zeros((2, 2)));
    }

    #[test]
    fn test_build_masks_with_later_adjacency() {
        let scheduler = WindowScheduler::new(d(1, 1), d(1, 31));
        let plan = scheduler.plan(d(1, 10), d(1, 15), 4).unwrap();
        let data = Array2::from_shape_fn((3, plan.n_days()), |(i, j)| ((i + 1) * j * j) as f64 + (i * j % 3) as f64);

        let mut adjacencies = vec![StaticComplete::matrix(3); plan.n_adjacencies()];
        // Cut AL-ES at the later instant of network 0 only
        adjacencies[1][[0, 1]] = 0.0;
        adjacencies[1][[1, 0]] = 0.0;

        let seq = build_networks(&CorrelationNetwork::default(), &data, &plan, &adjacencies).unwrap();
        assert_eq!(seq.networks.len() + 1, adjacencies.len());
        assert_eq!(seq.networks[0][[0, 1]], 0.0);
        assert!(seq.networks[1][[0, 1]] != 0.0);
        assert!(seq.landscape.is_none());
    }

    #[test]
    fn test_build_rejects_wrong_adjacency_count() {
        let plan = WindowScheduler::new(d(1, 1), d(1, 31)).plan(d(1, 10), d(1, 15), 4).unwrap();
        let data = Array2::zeros((2, plan.n_days()));
        let adjacencies = vec![StaticComplete::matrix(2); plan.n_instants()];
        assert!(build_networks(&DnmNetwork::default(), &data, &plan, &adjacencies).is_err());
    }

    #[test]
    fn test_build_rejects_wrong_adjacency_shape() {
        let plan = WindowScheduler::new(d(1, 1), d(1, 31)).plan(d(1, 10), d(1, 15), 4).unwrap();
        let data = Array2::from_shape_fn((3, plan.n_days()), |(i, j)| (i * j) as f64);
        let mut adjacencies = vec![StaticComplete::matrix(3); plan.n_adjacencies()];
        adjacencies[2] = StaticComplete::matrix(2);

        let err = build_networks(&DnmNetwork::default(), &data, &plan, &adjacencies).unwrap_err();
        match err {
            WarningError::InvalidParameter(msg) => assert!(msg.starts_with("adjacency 2")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_differential_correlation() {
        let cc_t0 = array![[1.0, -0.5], [-0.5, 1.0]];
        let cc_t1 = array![[1.0, 0.2], [0.2, 1.0]];
        let w = differential_correlation(&cc_t0, &cc_t1);
        assert_abs_diff_eq!(w[[0, 1]], 0.3, epsilon = 1e-12);
        assert_eq!(w[[0, 0]], 0.0);
    }
}
