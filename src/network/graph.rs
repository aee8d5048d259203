//! Graph views of network matrices.
//!
//! Weighted markers work on a petgraph `UnGraph` with edges pruned below
//! [`PRUNE_EPSILON`]; topological markers work on the 0/1 unweighted
//! matrices produced by [`unweighted`].

use std::cmp::Reverse;

use ndarray::{Array2, ArrayView2};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;

use crate::config::Threshold;

/// Weights below this are treated as absent edges.
pub const PRUNE_EPSILON: f64 = 1.0e-12;

/// Undirected weighted graph over the upper triangle of `network`, node
/// weight = row index.
pub fn weighted_graph(network: ArrayView2<f64>) -> UnGraph<usize, f64> {
    let n = network.nrows();
    let mut graph = UnGraph::with_capacity(n, n * n.saturating_sub(1) / 2);
    let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();

    for i in 0..n {
        for j in i + 1..n {
            let w = network[[i, j]];
            if w >= PRUNE_EPSILON {
                graph.add_edge(nodes[i], nodes[j], w);
            }
        }
    }
    graph
}

/// Connected components over non-zero entries; the largest one, ties
/// resolved toward the component holding the lowest index.
pub fn giant_component(network: ArrayView2<f64>) -> Vec<usize> {
    let n = network.nrows();
    let mut components = UnionFind::<usize>::new(n);
    for i in 0..n {
        for j in i + 1..n {
            if network[[i, j]] != 0.0 || network[[j, i]] != 0.0 {
                components.union(i, j);
            }
        }
    }

    let labels = components.into_labeling();
    let mut sizes = vec![0usize; n];
    for &label in &labels {
        sizes[label] += 1;
    }

    let Some(first) = (0..n).max_by_key(|&i| (sizes[labels[i]], Reverse(i))) else {
        return Vec::new();
    };
    (0..n).filter(|&i| labels[i] == labels[first]).collect()
}

/// 0/1 matrix of the edges kept under `threshold`.
///
/// `Value(v)` keeps entries strictly above v. `GiantComponent` connects
/// every pair inside the largest component and drops everything else.
pub fn unweighted(network: ArrayView2<f64>, threshold: Threshold) -> Array2<u8> {
    let n = network.nrows();
    let mut edges = match threshold {
        Threshold::Value(v) => network.mapv(|w| u8::from(w > v)),
        Threshold::GiantComponent => {
            let mut edges = Array2::zeros((n, n));
            let members = giant_component(network);
            for &i in &members {
                for &j in &members {
                    edges[[i, j]] = 1;
                }
            }
            edges
        }
    };
    edges.diag_mut().fill(0);
    edges
}

/// Neighbor lists of a 0/1 matrix.
pub fn neighbors(edges: ArrayView2<u8>) -> Vec<Vec<usize>> {
    edges
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|&(j, &e)| j != i && e != 0)
                .map(|(j, _)| j)
                .collect()
        })
        .collect()
}
