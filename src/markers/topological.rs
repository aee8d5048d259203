//! Topological Markers on Unweighted Networks
//!
//! ## Density
//!
//! ρ = #{(i, j) : U[i, j] = 1} / #{(i, j) : A[i, j] > 10⁻⁴}
//!
//! Ordered entries on both sides, so each undirected edge counts twice.
//!
//! ## Clustering
//!
//! C = ½ · (1/N) Σᵥ 2T(v) / (k_v (k_v − 1)), with T(v) the triangles at v.
//! The ½ is kept for comparability with published series.
//!
//! ## Degree Assortativity (Newman 2002)
//!
//! Pearson correlation of the degrees at either end of every edge, each edge
//! taken in both directions.
//!
//! ## Forman-Ricci Curvature (augmented, unit weights)
//!
//! F(u, v) = 4 − k_u − k_v + 3 · |N(u) ∩ N(v)|, averaged over edges.

use ndarray::{ArrayView2, Zip};

use crate::network::graph::neighbors;

/// Adjacency entries at or below this do not count as possible edges.
pub const DENSITY_EPSILON: f64 = 1.0e-4;

/// Present over possible edges; NaN when nothing is possible.
pub fn density(unweighted: ArrayView2<u8>, adjacency: ArrayView2<f64>) -> f64 {
    let present = unweighted.iter().filter(|&&e| e == 1).count();
    let possible = adjacency.iter().filter(|&&a| a > DENSITY_EPSILON).count();
    if possible == 0 {
        f64::NAN
    } else {
        present as f64 / possible as f64
    }
}

/// Number of undirected edges.
pub fn number_edges(unweighted: ArrayView2<u8>) -> usize {
    let mut count = 0;
    Zip::indexed(&unweighted).for_each(|(i, j), &e| {
        if j > i && (e != 0 || unweighted[[j, i]] != 0) {
            count += 1;
        }
    });
    count
}

/// Average local clustering, halved.
pub fn clustering_coefficient(unweighted: ArrayView2<u8>) -> f64 {
    let adjacency = neighbors(unweighted);
    let n = adjacency.len();
    if n == 0 {
        return 0.0;
    }

    let total: f64 = adjacency
        .iter()
        .map(|nbrs| {
            let k = nbrs.len();
            if k < 2 {
                return 0.0;
            }
            let mut links = 0usize;
            for (a, &u) in nbrs.iter().enumerate() {
                for &v in &nbrs[a + 1..] {
                    if unweighted[[u, v]] != 0 {
                        links += 1;
                    }
                }
            }
            2.0 * links as f64 / (k * (k - 1)) as f64
        })
        .sum();

    total / n as f64 / 2.0
}

/// Degree assortativity coefficient; NaN without edges or degree variance.
pub fn degree_assortativity(unweighted: ArrayView2<u8>) -> f64 {
    let adjacency = neighbors(unweighted);
    let degrees: Vec<f64> = adjacency.iter().map(|nbrs| nbrs.len() as f64).collect();

    let mut ends = Vec::new();
    for (u, nbrs) in adjacency.iter().enumerate() {
        for &v in nbrs {
            ends.push((degrees[u], degrees[v]));
        }
    }
    if ends.is_empty() {
        return f64::NAN;
    }

    let m = ends.len() as f64;
    let mean = ends.iter().map(|(x, _)| x).sum::<f64>() / m;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (x, y) in &ends {
        cov += (x - mean) * (y - mean);
        var += (x - mean).powi(2);
    }
    if var == 0.0 {
        return f64::NAN;
    }
    cov / var
}

/// Mean augmented Forman-Ricci curvature; NaN without edges.
pub fn forman_ricci_curvature(unweighted: ArrayView2<u8>) -> f64 {
    let adjacency = neighbors(unweighted);
    let mut total = 0.0;
    let mut edges = 0usize;

    for (u, nbrs) in adjacency.iter().enumerate() {
        for &v in nbrs.iter().filter(|&&v| v > u) {
            let triangles = nbrs.iter().filter(|&&w| adjacency[v].contains(&w)).count();
            let curvature = 4.0 - nbrs.len() as f64 - adjacency[v].len() as f64 + 3.0 * triangles as f64;
            total += curvature;
            edges += 1;
        }
    }

    if edges == 0 {
        f64::NAN
    } else {
        total / edges as f64
    }
}
