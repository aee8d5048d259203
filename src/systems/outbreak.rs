//! Metapopulation Outbreak: Stochastic SIR Coupled by Mobility
//!
//! Each country i is a well-mixed SIR population of size Nᵢ. Infection
//! pressure leaks between countries through a symmetric mobility matrix M:
//!
//!   λᵢ = β (Iᵢ + c Σⱼ Mᵢⱼ Iⱼ) / Nᵢ
//!
//! One day of dynamics draws binomial transitions:
//!
//!   ΔS→I ~ Bin(Sᵢ, 1 − e^(−λᵢ)),   ΔI→R ~ Bin(Iᵢ, 1 − e^(−γ))
//!
//! ## Phase Transition
//!
//! With R₀ = β/γ > 1 a seeded country crosses from sporadic cases to
//! exponential growth, and coupled countries follow with delays set by M.
//! The correlation structure between the country series reorganizes
//! before the synchronized wave, which is what the network markers pick up.
//!
//! The reported series is the cumulative count of infections, so a run
//! produces exactly the inputs a study consumes: cases, populations, and
//! daily flight frequencies (M with multiplicative day-to-day noise).

use chrono::{Days, NaiveDate};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Binomial, Distribution, Normal};
use tracing::debug;

use crate::data::{CaseDataset, FlightTable, PopulationTable};
use crate::error::{WarningError, WarningResult};

/// Everything a study needs, produced by one simulated run.
#[derive(Debug, Clone)]
pub struct OutbreakRun {
    /// Cumulative infections per country and day
    pub cases: CaseDataset,
    pub population: PopulationTable,
    /// Daily mobility, cohort = simulated countries in input order
    pub flights: FlightTable,
}

/// Seeded stochastic SIR metapopulation.
pub struct MetapopulationOutbreak {
    countries: Vec<String>,
    /// Population Nᵢ
    population: Array1<u64>,
    /// Symmetric mobility weights, zero diagonal
    mobility: Array2<f64>,
    susceptible: Array1<u64>,
    infected: Array1<u64>,
    /// Cumulative infections (reported series)
    cumulative: Array1<u64>,
    /// Transmission rate β
    beta: f64,
    /// Recovery rate γ
    gamma: f64,
    /// Cross-country coupling c
    coupling: f64,
    /// Relative std of the daily flight noise
    flight_noise: f64,
    rng: StdRng,
}

impl MetapopulationOutbreak {
    /// Create an outbreak with no infections yet.
    ///
    /// # Arguments
    /// * `countries` - Country codes, one per population entry
    /// * `population` - Population per country
    /// * `mobility` - Symmetric non-negative N×N weights
    /// * `seed` - RNG seed; equal seeds give equal runs
    pub fn new(countries: Vec<String>, population: Vec<u64>, mobility: Array2<f64>, seed: u64) -> WarningResult<Self> {
        let n = countries.len();
        if population.len() != n || mobility.dim() != (n, n) {
            return Err(WarningError::invalid_parameter(format!(
                "{n} countries need {n} populations and an {n}×{n} mobility matrix"
            )));
        }
        if mobility.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(WarningError::invalid_parameter("mobility weights must be finite and non-negative"));
        }

        let population = Array1::from(population);
        let mut mobility = mobility;
        mobility.diag_mut().fill(0.0);

        Ok(Self {
            countries,
            susceptible: population.clone(),
            infected: Array1::zeros(n),
            cumulative: Array1::zeros(n),
            population,
            mobility,
            beta: 0.3,
            gamma: 0.1,
            coupling: 0.05,
            flight_noise: 0.05,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Gravity-style mobility: Mᵢⱼ ∝ √(NᵢNⱼ), scaled to a maximum of 1.
    pub fn gravity_mobility(population: &[u64]) -> Array2<f64> {
        let n = population.len();
        let mut m = Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                0.0
            } else {
                ((population[i] as f64) * (population[j] as f64)).sqrt()
            }
        });
        let max = m.iter().cloned().fold(0.0, f64::max);
        if max > 0.0 {
            m /= max;
        }
        m
    }

    pub fn with_rates(mut self, beta: f64, gamma: f64) -> Self {
        self.beta = beta.max(0.0);
        self.gamma = gamma.max(0.0);
        self
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling.max(0.0);
        self
    }

    pub fn with_flight_noise(mut self, noise: f64) -> Self {
        self.flight_noise = noise.max(0.0);
        self
    }

    /// Basic reproduction number β/γ.
    pub fn r0(&self) -> f64 {
        self.beta / self.gamma
    }

    /// Move `count` susceptibles of `country` to infected.
    pub fn seed_infections(&mut self, country: &str, count: u64) -> WarningResult<()> {
        let i = self
            .countries
            .iter()
            .position(|c| c == country)
            .ok_or_else(|| WarningError::country_undefined(format!("'{country}' is not simulated")))?;
        let count = count.min(self.susceptible[i]);
        self.susceptible[i] -= count;
        self.infected[i] += count;
        self.cumulative[i] += count;
        Ok(())
    }

    /// Advance one day.
    pub fn step(&mut self) -> WarningResult<()> {
        let n = self.countries.len();
        let infected = self.infected.mapv(|v| v as f64);
        let imported = self.mobility.dot(&infected);
        let p_recover = 1.0 - (-self.gamma).exp();

        for i in 0..n {
            let pop = self.population[i].max(1) as f64;
            let lambda = self.beta * (infected[i] + self.coupling * imported[i]) / pop;
            let p_infect = (1.0 - (-lambda).exp()).clamp(0.0, 1.0);

            let new_infections = binomial(self.susceptible[i], p_infect)?.sample(&mut self.rng);
            let recoveries = binomial(self.infected[i], p_recover)?.sample(&mut self.rng);

            self.susceptible[i] -= new_infections;
            self.infected[i] = self.infected[i] + new_infections - recoveries;
            self.cumulative[i] += new_infections;
        }
        Ok(())
    }

    fn noisy_flights(&mut self) -> WarningResult<Array2<f64>> {
        let n = self.countries.len();
        let noise = Normal::new(1.0, self.flight_noise).map_err(|e| WarningError::invalid_parameter(e.to_string()))?;
        let mut flights = Array2::zeros((n, n));
        for i in 0..n {
            for j in i + 1..n {
                let f = (self.mobility[[i, j]] * noise.sample(&mut self.rng)).max(0.0);
                flights[[i, j]] = f;
                flights[[j, i]] = f;
            }
        }
        Ok(flights)
    }

    /// Simulate `days` days starting at `first_date`; day 0 records the
    /// seeded state before any dynamics.
    pub fn run(&mut self, first_date: NaiveDate, days: usize) -> WarningResult<OutbreakRun> {
        let n = self.countries.len();
        let mut counts = Array2::<i64>::zeros((n, days));
        let mut flights = FlightTable::new(self.countries.iter().cloned());

        for day in 0..days {
            if day > 0 {
                self.step()?;
            }
            for i in 0..n {
                counts[[i, day]] = self.cumulative[i] as i64;
            }
            let matrix = self.noisy_flights()?;
            flights.insert(first_date + Days::new(day as u64), matrix)?;
        }

        debug!(
            countries = n,
            days,
            total_cases = self.cumulative.sum(),
            "outbreak simulated"
        );

        let population = PopulationTable::from_pairs(
            self.countries
                .iter()
                .zip(self.population.iter())
                .map(|(c, &p)| (c.clone(), p as f64)),
        );
        let cases = CaseDataset::new(self.countries.clone(), first_date, counts)?;

        Ok(OutbreakRun {
            cases,
            population,
            flights,
        })
    }
}

fn binomial(n: u64, p: f64) -> WarningResult<Binomial> {
    Binomial::new(n, p).map_err(|e| WarningError::invalid_parameter(format!("binomial({n}, {p}): {e}")))
}
