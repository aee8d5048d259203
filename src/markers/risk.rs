//! Preparedness Risk Score
//!
//! PRS(t) = sᵀ U(t) s with s = population − confirmed cases at instant t.
//! Evaluated in f64: squared populations of large cohorts overflow i64.

use ndarray::{Array1, ArrayView1, ArrayView2};

/// Susceptible population per country.
pub fn susceptible(population: ArrayView1<f64>, confirmed: ArrayView1<i64>) -> Array1<f64> {
    population
        .iter()
        .zip(confirmed.iter())
        .map(|(&p, &c)| p - c as f64)
        .collect()
}

/// Quadratic form sᵀ U s over the unweighted network.
pub fn preparedness_risk(unweighted: ArrayView2<u8>, susceptible: ArrayView1<f64>) -> f64 {
    let u = unweighted.mapv(f64::from);
    susceptible.dot(&u.dot(&susceptible))
}
