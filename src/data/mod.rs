//! Data Module: Inputs Consumed by a Study
//!
//! - **Case dataset**: cumulative confirmed cases per country and day
//! - **Population table**: used by the preparedness risk score
//! - **Flight frequencies**: per-day mobility for dynamic adjacencies
//! - **Transforms**: daily differences and square-root smoothing

mod dataset;
mod flights;
mod population;
pub mod transform;

pub use dataset::CaseDataset;
pub use flights::{FlightFrequencies, FlightTable};
pub use population::PopulationTable;
pub use transform::{cumulative_sum, transform_counts};
