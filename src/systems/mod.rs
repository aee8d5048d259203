//! Synthetic Systems Module: Outbreak Generators for the Pipeline
//!
//! - **Metapopulation SIR**: countries coupled by mobility, producing the
//!   case, population and flight inputs a study consumes
//!
//! These systems serve as test beds for the early-warning markers.

mod outbreak;

pub use outbreak::{MetapopulationOutbreak, OutbreakRun};
