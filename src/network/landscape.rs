//! Landscape Dynamic Network Marker
//!
//! For every node n the local network is `N = {n} ∪ {j : A_t1[n, j] > 0}`
//! with k = |N|. Writing Δσᵢ = |σᵢ(t1) − σᵢ(t0)| and
//! Δcᵢⱼ = |ccᵢⱼ(t1) − ccᵢⱼ(t0)|:
//!
//! ```text
//! sd     = Σ_{i∈N} Δσᵢ / k
//! cc_in  = Σ_{i∈N, j∈N} Δcᵢⱼ / k²
//! cc_out = Σ_{exactly one of i, j in N} Δcᵢⱼ / k²
//! L(n)   = sd · (cc_in + cc_out)
//! ```
//!
//! Sums run over ordered pairs, diagonal included. One column of the
//! countries × instants accumulator is produced per instant. The returned
//! network only carries |(|cc_t1| − |cc_t0|)| per pair.
//!
//! The parallel form evaluates nodes on a rayon pool sized to the available
//! hardware threads. The collect at the end of each instant is the barrier.

use ndarray::{Array1, Array2, ArrayView2};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use super::builder::{differential_correlation, differential_dispersion, InstantNetwork, InstantWindows, NetworkBuilder};
use crate::config::CorrelationMethod;
use crate::error::WarningResult;
use crate::stats::correlation_matrix;

/// Landscape builder, sequential or backed by a worker pool.
#[derive(Debug)]
pub struct LandscapeNetwork {
    method: CorrelationMethod,
    pool: Option<ThreadPool>,
}

impl LandscapeNetwork {
    pub fn sequential(method: CorrelationMethod) -> Self {
        Self { method, pool: None }
    }

    /// Pool with one worker per available hardware thread.
    pub fn parallel(method: CorrelationMethod) -> WarningResult<Self> {
        let threads = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::with_threads(method, threads)
    }

    pub fn with_threads(method: CorrelationMethod, threads: usize) -> WarningResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("landscape-{i}"))
            .build()?;
        info!(threads = pool.current_num_threads(), "landscape worker pool ready");
        Ok(Self {
            method,
            pool: Some(pool),
        })
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }
}

impl NetworkBuilder for LandscapeNetwork {
    fn name(&self) -> &'static str {
        if self.is_parallel() {
            "landscape-parallel"
        } else {
            "landscape"
        }
    }

    fn produces_landscape(&self) -> bool {
        true
    }

    fn window_to_network(&self, windows: &InstantWindows<'_>) -> InstantNetwork {
        let n = windows.t0.nrows();
        let method = self.method;

        let (column, network) = match &self.pool {
            None => {
                let cc_t0 = correlation_matrix(method, windows.t0);
                let cc_t1 = correlation_matrix(method, windows.t1);
                let delta = LocalDeltas::new(windows, &cc_t0, &cc_t1);
                let column: Vec<f64> = (0..n).map(|node| delta.node_value(node, windows.adjacency_t1)).collect();
                (column, differential_correlation(&cc_t0, &cc_t1))
            }
            Some(pool) => pool.install(|| {
                let (cc_t0, cc_t1) = rayon::join(
                    || correlation_matrix(method, windows.t0),
                    || correlation_matrix(method, windows.t1),
                );
                let delta = LocalDeltas::new(windows, &cc_t0, &cc_t1);
                let column: Vec<f64> = (0..n)
                    .into_par_iter()
                    .map(|node| delta.node_value(node, windows.adjacency_t1))
                    .collect();
                (column, differential_correlation(&cc_t0, &cc_t1))
            }),
        };

        InstantNetwork {
            network,
            landscape: Some(Array1::from(column)),
        }
    }
}

/// Per-instant differentials shared read-only by every node.
struct LocalDeltas {
    dispersion: Array1<f64>,
    correlation: Array2<f64>,
}

impl LocalDeltas {
    fn new(windows: &InstantWindows<'_>, cc_t0: &Array2<f64>, cc_t1: &Array2<f64>) -> Self {
        Self {
            dispersion: differential_dispersion(windows.t0, windows.t1),
            correlation: (cc_t1 - cc_t0).mapv(f64::abs),
        }
    }

    fn node_value(&self, node: usize, adjacency_t1: ArrayView2<f64>) -> f64 {
        let n = self.dispersion.len();
        let inside: Vec<bool> = (0..n).map(|j| j == node || adjacency_t1[[node, j]] > 0.0).collect();
        let k = inside.iter().filter(|&&b| b).count() as f64;

        let sd: f64 = (0..n).filter(|&i| inside[i]).map(|i| self.dispersion[i]).sum::<f64>() / k;

        let mut cc_in = 0.0;
        let mut cc_out = 0.0;
        for i in 0..n {
            for j in 0..n {
                match (inside[i], inside[j]) {
                    (true, true) => cc_in += self.correlation[[i, j]],
                    (true, false) | (false, true) => cc_out += self.correlation[[i, j]],
                    (false, false) => {}
                }
            }
        }

        sd * (cc_in + cc_out) / (k * k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{build_networks, StaticComplete, StaticCustom, AdjacencyProvider};
    use crate::window::WindowScheduler;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use ndarray::array;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, day).unwrap()
    }

    fn synthetic(n: usize, days: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, days), |(i, j)| {
            let x = j as f64;
            (x * (i + 1) as f64).sin() * 10.0 + x * (i % 3) as f64 + ((i * 7 + j * 3) % 5) as f64
        })
    }

    #[test]
    fn test_isolated_node_only_sees_itself() {
        let t0 = array![[1.0, 2.0, 4.0], [1.0, 3.0, 2.0], [5.0, 1.0, 0.0]];
        let t1 = array![[2.0, 4.0, 9.0], [3.0, 2.0, 2.0], [1.0, 0.0, 3.0]];
        let adjacency = Array2::<f64>::zeros((3, 3));
        let windows = InstantWindows {
            t0: t0.view(),
            t1: t1.view(),
            adjacency_t0: adjacency.view(),
            adjacency_t1: adjacency.view(),
        };

        let out = LandscapeNetwork::sequential(CorrelationMethod::Pearson).window_to_network(&windows);
        let column = out.landscape.unwrap();

        // k = 1: sd = Δσ₀, cc_in = Δc₀₀ = 0, cc_out = Σ_{j≠0} (Δc₀ⱼ + Δcⱼ₀)
        let cc_t0 = correlation_matrix(CorrelationMethod::Pearson, t0.view());
        let cc_t1 = correlation_matrix(CorrelationMethod::Pearson, t1.view());
        let sd = differential_dispersion(t0.view(), t1.view())[0];
        let cc_out = 2.0 * ((cc_t1[[0, 1]] - cc_t0[[0, 1]]).abs() + (cc_t1[[0, 2]] - cc_t0[[0, 2]]).abs());
        assert_abs_diff_eq!(column[0], sd * cc_out, epsilon = 1e-12);
    }

    #[test]
    fn test_chain_neighborhoods_hand_computed() {
        // t0: AT and BE rise together, CH is flat (σ = 0, cc = 0 even with itself)
        // t1: BE turns around, CH rises with AT
        let t0 = array![[1.0, 2.0, 3.0], [1.0, 2.0, 3.0], [1.0, 1.0, 1.0]];
        let t1 = array![[1.0, 2.0, 3.0], [3.0, 2.0, 1.0], [1.0, 2.0, 3.0]];
        let chain = array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
        let windows = InstantWindows {
            t0: t0.view(),
            t1: t1.view(),
            adjacency_t0: chain.view(),
            adjacency_t1: chain.view(),
        };

        for builder in [
            LandscapeNetwork::sequential(CorrelationMethod::Pearson),
            LandscapeNetwork::with_threads(CorrelationMethod::Pearson, 2).unwrap(),
        ] {
            let out = builder.window_to_network(&windows);
            let column = out.landscape.unwrap();

            // Δσ = [0, 0, 1]; Δc: AT-BE 2, AT-CH 1, BE-CH 1, CH-CH 1, others 0
            // AT: N = {AT, BE}, sd = 0
            assert_abs_diff_eq!(column[0], 0.0, epsilon = 1e-12);
            // BE: N = all, k = 3, sd = 1/3, cc_in = 1 + 2·(2 + 1 + 1) = 9
            assert_abs_diff_eq!(column[1], (1.0 / 3.0) * 9.0 / 9.0, epsilon = 1e-12);
            // CH: N = {BE, CH}, k = 2, sd = 1/2, cc_in = 1 + 2·1 = 3, cc_out = 2·(2 + 1) = 6
            assert_abs_diff_eq!(column[2], 0.5 * 9.0 / 4.0, epsilon = 1e-12);

            // ||cc_t1| − |cc_t0||: AT-BE 0, AT-CH 1, BE-CH 1
            assert_abs_diff_eq!(out.network[[0, 1]], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(out.network[[0, 2]], 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(out.network[[1, 2]], 1.0, epsilon = 1e-12);
            assert_eq!(out.network[[2, 2]], 0.0);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scheduler = WindowScheduler::new(d(1, 1), d(2, 29));
        let plan = scheduler.plan(d(1, 20), d(2, 10), 7).unwrap();
        let data = synthetic(6, plan.n_days());
        let countries: Vec<String> = ["AT", "BE", "CH", "DE", "ES", "FR"].iter().map(|s| s.to_string()).collect();
        let adjacencies = StaticComplete.adjacencies(&plan, &countries).unwrap();

        let sequential = build_networks(
            &LandscapeNetwork::sequential(CorrelationMethod::Spearman),
            &data,
            &plan,
            &adjacencies,
        )
        .unwrap();
        let parallel = build_networks(
            &LandscapeNetwork::with_threads(CorrelationMethod::Spearman, 3).unwrap(),
            &data,
            &plan,
            &adjacencies,
        )
        .unwrap();

        let (a, b) = (sequential.landscape.unwrap(), parallel.landscape.unwrap());
        assert_eq!(a.dim(), (6, plan.n_instants()));
        assert!(a.iter().all(|v| v.is_finite()));
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
        assert_eq!(sequential.networks, parallel.networks);
    }

    #[test]
    fn test_landscape_respects_custom_adjacency() {
        let scheduler = WindowScheduler::new(d(1, 1), d(2, 29));
        let plan = scheduler.plan(d(1, 10), d(1, 20), 0).unwrap();
        let data = synthetic(3, plan.n_days());
        let countries: Vec<String> = ["AT", "BE", "CH"].iter().map(|s| s.to_string()).collect();

        let chain = StaticCustom::new(array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]]).unwrap();
        let adjacencies = chain.adjacencies(&plan, &countries).unwrap();
        let seq = build_networks(
            &LandscapeNetwork::sequential(CorrelationMethod::Pearson),
            &data,
            &plan,
            &adjacencies,
        )
        .unwrap();

        // Masked by the chain: the AT-CH edge is always zero
        assert!(seq.networks.iter().all(|net| net[[0, 2]] == 0.0));
        let landscape = seq.landscape.unwrap();
        assert_eq!(landscape.ncols(), seq.networks.len());
        assert!(landscape.iter().all(|v| !v.is_nan()));
    }
}
