//! Weighted Markers: MST-DNM and SP-DNM
//!
//! Both read the weighted network after pruning weights below
//! [`PRUNE_EPSILON`](crate::network::graph::PRUNE_EPSILON):
//!
//! - **MST-DNM**: Σ w(e) over a minimum spanning forest (Kruskal)
//! - **SP-DNM**: Dijkstra distance between two countries, 0 when unreachable

use ndarray::{Array1, Array2, ArrayView2};
use petgraph::algo::{dijkstra, min_spanning_tree};
use petgraph::data::Element;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::error::{WarningError, WarningResult};
use crate::network::graph::weighted_graph;

/// Total weight of the minimum spanning forest of one network.
pub fn mst_weight(network: ArrayView2<f64>) -> f64 {
    let graph = weighted_graph(network);
    min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { weight, .. } => Some(weight),
            Element::Node { .. } => None,
        })
        .sum()
}

/// Weighted shortest-path length between two rows, 0 when no path exists.
pub(crate) fn shortest_path_length(network: ArrayView2<f64>, origin: usize, destination: usize) -> f64 {
    if origin == destination {
        return 0.0;
    }
    let graph = weighted_graph(network);
    let target = NodeIndex::new(destination);
    let distances = dijkstra(&graph, NodeIndex::new(origin), Some(target), |edge| *edge.weight());
    distances.get(&target).copied().unwrap_or(0.0)
}

/// MST-DNM over a network sequence.
pub fn mst_dnm(networks: &[Array2<f64>]) -> Array1<f64> {
    networks.iter().map(|net| mst_weight(net.view())).collect()
}

/// SP-DNM over a network sequence, one row per (origin, destination) pair.
pub fn sp_dnm(networks: &[Array2<f64>], paths: &[(usize, usize)]) -> WarningResult<Array2<f64>> {
    for net in networks {
        if let Some(&(origin, destination)) = paths.iter().find(|&&(o, d)| o.max(d) >= net.nrows()) {
            return Err(WarningError::invalid_parameter(format!(
                "path ({origin}, {destination}) outside a network of {} nodes",
                net.nrows()
            )));
        }
    }
    let mut out = Array2::zeros((paths.len(), networks.len()));
    for (t, net) in networks.iter().enumerate() {
        for (p, &(origin, destination)) in paths.iter().enumerate() {
            out[[p, t]] = shortest_path_length(net.view(), origin, destination);
        }
    }
    Ok(out)
}
