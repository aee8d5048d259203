//! Study Context: Validation, Window Construction and Marker Queries
//!
//! A study moves through two states, each a distinct type:
//!
//! ```text
//! StudyConfig ──Study::new──▶ Study ──build_windows──▶ WindowedStudy
//!  (unchecked)               (dates and countries       (adjacencies, networks,
//!                             checked, plan aligned)      markers queryable)
//! ```
//!
//! Marker queries only exist on [`WindowedStudy`], so asking for a marker
//! before the windows are built does not compile.
//!
//! Every marker returns one value per network instant, the instants being
//! `plan.start_date ..= plan.end_date`.

use std::path::Path;

use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{AdjacencyMode, StudyConfig, COUNCIL_OF_EUROPE};
use crate::data::{transform, CaseDataset, FlightFrequencies, PopulationTable};
use crate::error::{WarningError, WarningResult};
use crate::markers;
use crate::network::{
    build_networks, graph, network_builder, AdjacencyProvider, DynamicFlight, NetworkSequence, StaticComplete,
    StaticCustom,
};
use crate::window::{WindowPlan, WindowScheduler};

/// Validated study: configuration checked against a dataset.
#[derive(Debug, Clone)]
pub struct Study {
    config: StudyConfig,
    /// Canonical (sorted, deduplicated) countries
    countries: Vec<String>,
    plan: WindowPlan,
    /// Selected rows over the whole dataset span
    raw: Array2<i64>,
    /// Date of the first column of `raw`
    first_date: NaiveDate,
}

impl Study {
    /// Validate `config` against `dataset`.
    ///
    /// Fails with `DateOutRange` or `CountryUndefined` for the domain
    /// violations, `InvalidParameter` for malformed parameters.
    pub fn new(config: StudyConfig, dataset: &CaseDataset) -> WarningResult<Self> {
        config.check_parameters()?;
        let countries = config.canonical_countries();

        if config.adjacency == AdjacencyMode::DynamicFlight {
            check_flight_cohort(&countries)?;
        }

        let scheduler = WindowScheduler::new(dataset.first_date(), dataset.last_date());
        let plan = scheduler.plan(config.start_date, config.end_date, config.window_size)?;

        check_countries(&countries, dataset)?;
        let raw = dataset.select(&countries)?;

        if plan.start_shift() > 0 {
            warn!(
                requested = %plan.requested_start,
                start = %plan.start_date,
                shift = plan.start_shift(),
                "not enough history before the start date; start moved forward"
            );
        }
        info!(
            countries = countries.len(),
            start = %plan.start_date,
            end = %plan.end_date,
            window_size = plan.window_size,
            "study validated"
        );

        Ok(Self {
            config,
            countries,
            plan,
            raw,
            first_date: dataset.first_date(),
        })
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn plan(&self) -> &WindowPlan {
        &self.plan
    }

    /// Build adjacencies and networks with a static adjacency mode.
    pub fn build_windows(self) -> WarningResult<WindowedStudy> {
        match &self.config.adjacency {
            AdjacencyMode::StaticComplete => self.build_with(&StaticComplete),
            AdjacencyMode::StaticCustom { matrix } => {
                let provider = StaticCustom::from_rows(matrix)?;
                self.build_with(&provider)
            }
            AdjacencyMode::DynamicFlight => Err(WarningError::MissingFlightData(
                "dynamic flight adjacency needs a flight table; use build_windows_with_flights".to_string(),
            )),
        }
    }

    /// Build with a flight table; the table is only read in dynamic mode.
    pub fn build_windows_with_flights<F: FlightFrequencies + ?Sized>(self, flights: &F) -> WarningResult<WindowedStudy> {
        if self.config.adjacency == AdjacencyMode::DynamicFlight {
            let provider = DynamicFlight::new(flights);
            self.build_with(&provider)
        } else {
            self.build_windows()
        }
    }

    /// Build with any adjacency provider.
    pub fn build_with<P: AdjacencyProvider + ?Sized>(self, provider: &P) -> WarningResult<WindowedStudy> {
        let plan = self.plan;
        let first = (plan.window_start - self.first_date).num_days() as usize;
        let columns = first..first + plan.n_days();

        let square_root = self.config.square_root_data && self.config.network.accepts_square_root();
        if self.config.square_root_data && !square_root {
            warn!(network = ?self.config.network, "square-root smoothing only applies to the correlation network; ignored");
        }
        let transformed = transform::transform_counts(&self.raw, self.config.cumulative_data, square_root);
        let data = transformed.slice(ndarray::s![.., columns.clone()]).to_owned();
        let data_original = self.raw.slice(ndarray::s![.., columns]).to_owned();

        let adjacencies = provider.adjacencies(&plan, &self.countries)?;
        info!(adjacency = provider.name(), instants = adjacencies.len(), "adjacencies built");

        let builder = network_builder(self.config.network, self.config.correlation)?;
        let NetworkSequence { networks, landscape } = build_networks(builder.as_ref(), &data, &plan, &adjacencies)?;

        let networks_unweighted = networks
            .iter()
            .map(|net| graph::unweighted(net.view(), self.config.threshold))
            .collect();

        info!(network = builder.name(), instants = networks.len(), "windows built");

        Ok(WindowedStudy {
            config: self.config,
            plan,
            countries: self.countries,
            data_original,
            data,
            adjacencies,
            networks,
            networks_unweighted,
            landscape,
        })
    }
}

fn check_flight_cohort(countries: &[String]) -> WarningResult<()> {
    let mut cohort: Vec<&str> = COUNCIL_OF_EUROPE.to_vec();
    cohort.sort_unstable();
    if countries.iter().map(String::as_str).ne(cohort.iter().copied()) {
        return Err(WarningError::country_undefined(
            "dynamic flight adjacency requires exactly the Council of Europe countries",
        ));
    }
    Ok(())
}

fn check_countries(countries: &[String], dataset: &CaseDataset) -> WarningResult<()> {
    if countries.len() < 2 {
        return Err(WarningError::country_undefined("at least two different countries must be selected"));
    }
    let missing: Vec<&str> = countries
        .iter()
        .filter(|c| !dataset.contains(c))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(WarningError::country_undefined(format!(
            "countries not contained in the dataset: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

/// Study with its window sequences built; every marker is queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedStudy {
    config: StudyConfig,
    plan: WindowPlan,
    countries: Vec<String>,
    /// Cumulative counts from `plan.window_start` to `plan.end_date`
    data_original: Array2<i64>,
    /// Transformed counts over the same columns
    data: Array2<f64>,
    /// n_instants + 1 matrices
    adjacencies: Vec<Array2<f64>>,
    networks: Vec<Array2<f64>>,
    networks_unweighted: Vec<Array2<u8>>,
    /// Countries × instants, landscape variants only
    landscape: Option<Array2<f64>>,
}

impl WindowedStudy {
    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn plan(&self) -> &WindowPlan {
        &self.plan
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Corrected start date (date of the first instant).
    pub fn start_date(&self) -> NaiveDate {
        self.plan.start_date
    }

    pub fn instant_dates(&self) -> Vec<NaiveDate> {
        self.plan.instant_dates()
    }

    pub fn data_original(&self) -> &Array2<i64> {
        &self.data_original
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn adjacencies(&self) -> &[Array2<f64>] {
        &self.adjacencies
    }

    pub fn networks(&self) -> &[Array2<f64>] {
        &self.networks
    }

    pub fn networks_unweighted(&self) -> &[Array2<u8>] {
        &self.networks_unweighted
    }

    /// Transformed cases summed over countries at each instant.
    pub fn case_totals(&self) -> Array1<f64> {
        let totals = transform::daily_totals(&self.data);
        (0..self.networks.len())
            .map(|t| totals[self.plan.instant_column(t)])
            .collect()
    }

    /// MST-DNM
    pub fn mst_dnm(&self) -> Array1<f64> {
        markers::mst_dnm(&self.networks)
    }

    /// SP-DNM, one row per (origin, destination) pair.
    pub fn sp_dnm(&self, paths: &[(&str, &str)]) -> WarningResult<Array2<f64>> {
        let ids = paths
            .iter()
            .map(|&(origin, destination)| Ok((self.country_index(origin)?, self.country_index(destination)?)))
            .collect::<WarningResult<Vec<_>>>()?;
        markers::sp_dnm(&self.networks, &ids)
    }

    fn country_index(&self, code: &str) -> WarningResult<usize> {
        self.countries.binary_search_by(|c| c.as_str().cmp(code)).map_err(|_| {
            WarningError::country_undefined(format!(
                "'{code}' is not one of the study countries; path references must be established in the study"
            ))
        })
    }

    /// Landscape accumulator (countries × instants), landscape variants only.
    pub fn landscape_dnm(&self) -> Option<&Array2<f64>> {
        self.landscape.as_ref()
    }

    pub fn density(&self) -> Array1<f64> {
        self.networks_unweighted
            .iter()
            .zip(&self.adjacencies[1..])
            .map(|(u, adjacency)| markers::density(u.view(), adjacency.view()))
            .collect()
    }

    pub fn clustering_coefficient(&self) -> Array1<f64> {
        self.networks_unweighted
            .iter()
            .map(|u| markers::clustering_coefficient(u.view()))
            .collect()
    }

    pub fn assortativity_coefficient(&self) -> Array1<f64> {
        self.networks_unweighted
            .iter()
            .map(|u| markers::degree_assortativity(u.view()))
            .collect()
    }

    pub fn number_edges(&self) -> Array1<usize> {
        self.networks_unweighted
            .iter()
            .map(|u| markers::number_edges(u.view()))
            .collect()
    }

    /// Preparedness risk score against cumulative cases on each instant.
    pub fn prs(&self, population: &PopulationTable) -> WarningResult<Array1<f64>> {
        let population = population.vector_for(&self.countries)?;
        Ok(self
            .networks_unweighted
            .iter()
            .enumerate()
            .map(|(t, u)| {
                let confirmed = self.data_original.column(self.plan.instant_column(t));
                let susceptible = markers::susceptible(population.view(), confirmed);
                markers::preparedness_risk(u.view(), susceptible.view())
            })
            .collect())
    }

    pub fn forman_ricci_curvature(&self) -> Array1<f64> {
        self.networks_unweighted
            .iter()
            .map(|u| markers::forman_ricci_curvature(u.view()))
            .collect()
    }

    pub fn to_json_string(&self) -> WarningResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(json: &str) -> WarningResult<Self> {
        let study: Self = serde_json::from_str(json)?;
        study.check_consistency()?;
        Ok(study)
    }

    /// Persist the whole queryable state.
    pub fn save_json(&self, path: impl AsRef<Path>) -> WarningResult<()> {
        let path = path.as_ref();
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer(file, self)?;
        debug!(path = %path.display(), "study saved");
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> WarningResult<Self> {
        let file = std::io::BufReader::new(std::fs::File::open(path.as_ref())?);
        let study: Self = serde_json::from_reader(file)?;
        study.check_consistency()?;
        Ok(study)
    }

    /// Shapes a restored state must share with the one that was built.
    fn check_consistency(&self) -> WarningResult<()> {
        let n = self.countries.len();
        let instants = self.plan.n_instants();
        let fail = |what: String| Err(WarningError::invalid_dataset(format!("inconsistent study state: {what}")));

        if self.data.dim() != (n, self.plan.n_days()) || self.data_original.dim() != self.data.dim() {
            return fail(format!(
                "data is {:?} for {n} countries over {} days",
                self.data.dim(),
                self.plan.n_days()
            ));
        }
        if self.networks.len() != instants || self.networks_unweighted.len() != instants {
            return fail(format!("{} networks for {instants} instants", self.networks.len()));
        }
        if self.adjacencies.len() != instants + 1 {
            return fail(format!("{} adjacencies for {instants} instants", self.adjacencies.len()));
        }
        let square = |dim: (usize, usize)| dim == (n, n);
        if !self.adjacencies.iter().all(|a| square(a.dim()))
            || !self.networks.iter().all(|w| square(w.dim()))
            || !self.networks_unweighted.iter().all(|u| square(u.dim()))
        {
            return fail(format!("matrices are not {n}×{n}"));
        }
        if self.landscape.is_some() != self.config.network.is_landscape() {
            return fail("landscape accumulator does not match the network variant".to_string());
        }
        match &self.landscape {
            Some(l) if l.dim() != (n, instants) => fail(format!("landscape is {:?}", l.dim())),
            _ => Ok(()),
        }
    }
}
