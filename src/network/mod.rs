//! Network Module: Adjacency and Differential Network Sequences
//!
//! Two strategy seams compose a study:
//!
//! - [`AdjacencyProvider`]: which country pairs may carry an edge at each
//!   instant (static complete, static custom, flight-weighted)
//! - [`NetworkBuilder`]: how a pair of windows becomes a weighted network
//!   (correlation, DNM, landscape, parallel landscape)
//!
//! [`build_networks`] drives a builder over a [`crate::window::WindowPlan`]
//! and returns the networks together with the landscape accumulator.

mod adjacency;
mod builder;
pub mod graph;
mod landscape;

pub use adjacency::{AdjacencyProvider, DynamicFlight, StaticComplete, StaticCustom};
pub use builder::{
    build_networks, CorrelationNetwork, DnmNetwork, InstantNetwork, InstantWindows, NetworkBuilder,
    NetworkSequence,
};
pub use landscape::LandscapeNetwork;

use crate::config::{CorrelationMethod, NetworkVariant};
use crate::error::WarningResult;

/// Builder for a configured network variant.
pub fn network_builder(
    variant: NetworkVariant,
    method: CorrelationMethod,
) -> WarningResult<Box<dyn NetworkBuilder>> {
    Ok(match variant {
        NetworkVariant::Correlation => Box::new(CorrelationNetwork::new(method)),
        NetworkVariant::Dnm => Box::new(DnmNetwork::new(method)),
        NetworkVariant::Landscape => Box::new(LandscapeNetwork::sequential(method)),
        NetworkVariant::LandscapeParallel => Box::new(LandscapeNetwork::parallel(method)?),
    })
}
