//! # DNM-Early-Warning
//!
//! Early-Warning Signals of Epidemic Outbreaks via Dynamic Correlation
//! Networks and Fold-Change Tipping Points
//!
//! ## Theoretical Framework
//!
//! Per-country case series are compared over sliding windows. Every pair of
//! consecutive windows yields a network whose edges measure how strongly the
//! correlation and dispersion between two countries changed. Near a critical
//! transition (an outbreak taking off) these networks reorganize: fluctuations
//! grow and correlations strengthen inside a dominant group of countries.
//!
//! ### Pipeline
//!
//! 1. **Window alignment**: the requested date range is aligned against the
//!    history available in the dataset ([`window`])
//! 2. **Adjacency**: which countries may be linked at each instant, either
//!    static or weighted by flight frequencies ([`network::AdjacencyProvider`])
//! 3. **Networks**: correlation, DNM, or per-node landscape networks
//!    ([`network::NetworkBuilder`])
//! 4. **Markers**: MST-DNM, SP-DNM, L-DNM, density, clustering,
//!    assortativity, edge count, PRS and Forman-Ricci curvature ([`markers`])
//! 5. **Tipping points**: k-fold jumps in any marker series ([`tipping`])
//!
//! ## Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use dnm_early_warning::{CaseDataset, Study, StudyConfig, k_fold_changes};
//!
//! # fn main() -> dnm_early_warning::WarningResult<()> {
//! let dataset = CaseDataset::from_csv_path("covid_cumulative.csv")?;
//! let config = StudyConfig::new(
//!     NaiveDate::from_ymd_opt(2020, 2, 15).unwrap(),
//!     NaiveDate::from_ymd_opt(2020, 3, 15).unwrap(),
//! )
//! .with_countries(["ES", "FR", "IT", "DE"]);
//!
//! let study = Study::new(config, &dataset)?.build_windows()?;
//! let mst = study.mst_dnm();
//! let tipping = k_fold_changes(mst.view(), 2.0, 3)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## References
//!
//! - Chen et al., "Detecting early-warning signals for sudden deterioration
//!   of complex diseases by dynamical network biomarkers", Sci. Rep. (2012)
//! - Newman, "Assortative mixing in networks", PRL 89, 208701 (2002)
//! - Sreejith et al., "Forman curvature for complex networks" (2016)

pub mod config;
pub mod data;
pub mod error;
pub mod markers;
pub mod network;
pub mod stats;
pub mod study;
pub mod systems;
pub mod tipping;
pub mod window;

pub use config::{AdjacencyMode, CorrelationMethod, NetworkVariant, StudyConfig, Threshold, COUNCIL_OF_EUROPE};
pub use data::{CaseDataset, FlightFrequencies, FlightTable, PopulationTable};
pub use error::{WarningError, WarningResult};
pub use network::{
    AdjacencyProvider, CorrelationNetwork, DnmNetwork, DynamicFlight, LandscapeNetwork, NetworkBuilder,
    NetworkSequence, StaticComplete, StaticCustom,
};
pub use study::{Study, WindowedStudy};
pub use systems::{MetapopulationOutbreak, OutbreakRun};
pub use tipping::{k_fold_changes, k_fold_changes_multiple};
pub use window::{WindowPlan, WindowScheduler};
