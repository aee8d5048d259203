//! Study Configuration
//!
//! A [`StudyConfig`] is the unvalidated description of one study: the date
//! range of interest, the country cohort, the sliding window and the
//! strategies used to build adjacencies and networks. Validation against a
//! concrete dataset happens in [`crate::study::Study::new`].
//!
//! Configurations can be built in code (`StudyConfig::default()` plus the
//! `with_*` methods) or loaded from JSON:
//!
//! ```json
//! {
//!   "start_date": "2020-02-15",
//!   "end_date": "2020-03-15",
//!   "countries": ["ES", "FR", "IT"],
//!   "window_size": 0,
//!   "correlation": "spearman",
//!   "threshold": "GC",
//!   "adjacency": { "mode": "static_complete" },
//!   "network": "landscape_parallel"
//! }
//! ```

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{WarningError, WarningResult};

/// The 46 members of the Council of Europe, in the reference order used by
/// the flight-frequency matrices.
pub const COUNCIL_OF_EUROPE: [&str; 46] = [
    "AL", "AD", "AM", "AT", "AZ", "BE", "BA", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR", "GE",
    "DE", "GR", "HU", "IS", "IE", "IT", "LV", "LI", "LT", "LU", "MT", "MC", "ME", "NL", "MK", "NO",
    "PL", "PT", "MD", "RO", "SM", "RS", "SK", "SI", "ES", "SE", "CH", "GB", "TR", "UA",
];

/// Correlation coefficient used between two country series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    /// Parse a method name; unrecognized names fall back to Pearson.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "spearman" => Self::Spearman,
            "kendall" => Self::Kendall,
            _ => Self::Pearson,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
            Self::Kendall => "kendall",
        }
    }
}

impl From<String> for CorrelationMethod {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<CorrelationMethod> for String {
    fn from(method: CorrelationMethod) -> Self {
        method.name().to_string()
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule turning a weighted network into the unweighted one used by the
/// threshold family of markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdRepr", into = "ThresholdRepr")]
pub enum Threshold {
    /// Keep entries strictly greater than the value.
    Value(f64),
    /// Keep every pair inside the largest connected component ("GC").
    GiantComponent,
}

impl Default for Threshold {
    fn default() -> Self {
        Self::Value(0.5)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ThresholdRepr {
    Number(f64),
    Name(String),
}

impl TryFrom<ThresholdRepr> for Threshold {
    type Error = String;

    fn try_from(repr: ThresholdRepr) -> Result<Self, Self::Error> {
        match repr {
            ThresholdRepr::Number(v) => Ok(Self::Value(v)),
            ThresholdRepr::Name(name) if name.eq_ignore_ascii_case("gc") => Ok(Self::GiantComponent),
            ThresholdRepr::Name(name) => Err(format!("unknown threshold '{name}', expected a number or \"GC\"")),
        }
    }
}

impl From<Threshold> for ThresholdRepr {
    fn from(threshold: Threshold) -> Self {
        match threshold {
            Threshold::Value(v) => Self::Number(v),
            Threshold::GiantComponent => Self::Name("GC".to_string()),
        }
    }
}

/// How the adjacency of every instant is produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AdjacencyMode {
    /// Complete unweighted graph without self loops.
    #[default]
    StaticComplete,
    /// One caller-supplied N×N matrix, rows in canonical country order.
    StaticCustom { matrix: Vec<Vec<f64>> },
    /// Flight-frequency weighted, summed over each window.
    DynamicFlight,
}

/// Network construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkVariant {
    /// Signed correlation of the later window.
    Correlation,
    /// Differential correlation times differential dispersion.
    #[default]
    Dnm,
    /// Per-node landscape accumulation, sequential.
    Landscape,
    /// Per-node landscape accumulation on a worker pool.
    LandscapeParallel,
}

impl NetworkVariant {
    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::Landscape | Self::LandscapeParallel)
    }

    /// Only the thresholded correlation network reads square-rooted counts.
    pub fn accepts_square_root(&self) -> bool {
        matches!(self, Self::Correlation)
    }
}

/// Unvalidated study configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// First date of interest (inclusive)
    pub start_date: NaiveDate,
    /// Last date of interest (inclusive)
    pub end_date: NaiveDate,
    /// ISO-3166-Alpha2 codes; deduplicated and sorted on validation
    pub countries: Vec<String>,
    /// Days per window; 0 uses all prior history
    pub window_size: usize,
    pub correlation: CorrelationMethod,
    /// Keep cumulative counts instead of daily new cases
    pub cumulative_data: bool,
    /// Square-root smoothing before differencing, correlation variant only
    pub square_root_data: bool,
    pub threshold: Threshold,
    pub adjacency: AdjacencyMode,
    pub network: NetworkVariant,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2020, 2, 15).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2020, 9, 15).unwrap_or_default(),
            countries: COUNCIL_OF_EUROPE.iter().map(|c| c.to_string()).collect(),
            window_size: 14,
            correlation: CorrelationMethod::Pearson,
            cumulative_data: false,
            square_root_data: false,
            threshold: Threshold::default(),
            adjacency: AdjacencyMode::StaticComplete,
            network: NetworkVariant::Dnm,
        }
    }
}

impl StudyConfig {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            ..Self::default()
        }
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_correlation(mut self, correlation: CorrelationMethod) -> Self {
        self.correlation = correlation;
        self
    }

    pub fn with_cumulative_data(mut self, cumulative: bool) -> Self {
        self.cumulative_data = cumulative;
        self
    }

    pub fn with_square_root_data(mut self, square_root: bool) -> Self {
        self.square_root_data = square_root;
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_adjacency(mut self, adjacency: AdjacencyMode) -> Self {
        self.adjacency = adjacency;
        self
    }

    pub fn with_network(mut self, network: NetworkVariant) -> Self {
        self.network = network;
        self
    }

    /// Countries deduplicated and in canonical (alphabetical) order.
    pub fn canonical_countries(&self) -> Vec<String> {
        let mut countries: Vec<String> = self.countries.iter().map(|c| c.trim().to_string()).collect();
        countries.sort();
        countries.dedup();
        countries
    }

    pub fn from_json_str(json: &str) -> WarningResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> WarningResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> WarningResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parameter checks that do not need a dataset.
    pub(crate) fn check_parameters(&self) -> WarningResult<()> {
        if let Threshold::Value(v) = self.threshold {
            if !v.is_finite() {
                return Err(WarningError::invalid_parameter(format!(
                    "threshold must be finite; got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_fallback() {
        assert_eq!(CorrelationMethod::from_name("spearman"), CorrelationMethod::Spearman);
        assert_eq!(CorrelationMethod::from_name("Kendall"), CorrelationMethod::Kendall);
        assert_eq!(CorrelationMethod::from_name("distance"), CorrelationMethod::Pearson);
    }

    #[test]
    fn test_canonical_countries() {
        let config = StudyConfig::default().with_countries(["FR", "ES", "FR", "AL"]);
        assert_eq!(config.canonical_countries(), vec!["AL", "ES", "FR"]);
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "start_date": "2020-03-01",
            "end_date": "2020-04-01",
            "countries": ["ES", "FR"],
            "window_size": 7,
            "correlation": "whatever",
            "threshold": "GC",
            "adjacency": { "mode": "static_custom", "matrix": [[0.0, 1.0], [1.0, 0.0]] },
            "network": "landscape_parallel"
        }"#;
        let config = StudyConfig::from_json_str(json).unwrap();
        assert_eq!(config.correlation, CorrelationMethod::Pearson);
        assert_eq!(config.threshold, Threshold::GiantComponent);
        assert_eq!(config.network, NetworkVariant::LandscapeParallel);
        assert!(matches!(config.adjacency, AdjacencyMode::StaticCustom { .. }));
        // Unspecified fields keep their defaults
        assert!(!config.cumulative_data);

        let back = StudyConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unknown_threshold_name_rejected() {
        let json = r#"{ "threshold": "largest" }"#;
        assert!(StudyConfig::from_json_str(json).is_err());
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let config = StudyConfig::default().with_threshold(Threshold::Value(f64::NAN));
        assert!(config.check_parameters().is_err());
    }
}
