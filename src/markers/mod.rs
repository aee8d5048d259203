//! Markers Module: Early-Warning Signals from Network Sequences
//!
//! Pure functions over single networks; [`crate::study::WindowedStudy`]
//! maps them across instants.
//!
//! - Weighted: MST-DNM, SP-DNM
//! - Topological (unweighted): density, clustering, assortativity, edge
//!   count, Forman-Ricci curvature
//! - Risk: preparedness risk score

mod risk;
mod topological;
mod weighted;

pub use risk::{preparedness_risk, susceptible};
pub use topological::{
    clustering_coefficient, degree_assortativity, density, forman_ricci_curvature, number_edges,
    DENSITY_EPSILON,
};
pub use weighted::{mst_dnm, mst_weight, sp_dnm};
