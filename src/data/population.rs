//! Population table keyed by ISO-3166-Alpha2 code.
//!
//! Column order is free; the `ISO-3166-Alpha2` and `population` headers are
//! required, everything else is ignored.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{WarningError, WarningResult};

const CODE_HEADER: &str = "ISO-3166-Alpha2";
const POPULATION_HEADER: &str = "population";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationTable {
    population: BTreeMap<String, f64>,
}

impl PopulationTable {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            population: pairs.into_iter().map(|(c, p)| (c.into(), p)).collect(),
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> WarningResult<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();

        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| WarningError::invalid_dataset(format!("population table lacks a '{name}' column")))
        };
        let code_col = find(CODE_HEADER)?;
        let pop_col = find(POPULATION_HEADER)?;

        let mut population = BTreeMap::new();
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            let code = record.get(code_col).unwrap_or_default().trim().to_string();
            let raw = record.get(pop_col).unwrap_or_default().trim();
            let value: f64 = raw.parse().map_err(|_| {
                WarningError::invalid_dataset(format!("row {}: population '{raw}' is not numeric", row + 1))
            })?;
            population.insert(code, value);
        }

        Ok(Self { population })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> WarningResult<Self> {
        Self::from_csv_reader(std::fs::File::open(path)?)
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.population.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Population vector aligned with `countries`.
    pub fn vector_for(&self, countries: &[String]) -> WarningResult<Array1<f64>> {
        countries
            .iter()
            .map(|code| {
                self.get(code)
                    .ok_or_else(|| WarningError::MissingPopulation(format!("no population for '{code}'")))
            })
            .collect::<WarningResult<Vec<_>>>()
            .map(Array1::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_any_column_order() {
        let table = "\
Country,ISO-3166-Alpha2,ISO-3166-Alpha3,population,Lat,Long
Spain,ES,ESP,46754783,40.4,-3.7
France,FR,FRA,65273511,46.2,2.2
";
        let pop = PopulationTable::from_csv_reader(table.as_bytes()).unwrap();
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.get("ES"), Some(46754783.0));

        let v = pop.vector_for(&["FR".to_string(), "ES".to_string()]).unwrap();
        assert_eq!(v.to_vec(), vec![65273511.0, 46754783.0]);
    }

    #[test]
    fn test_missing_country() {
        let pop = PopulationTable::from_pairs([("ES", 10.0)]);
        let err = pop.vector_for(&["PT".to_string()]).unwrap_err();
        assert!(matches!(err, WarningError::MissingPopulation(_)));
    }

    #[test]
    fn test_missing_header() {
        let table = "code,population\nES,1\n";
        assert!(PopulationTable::from_csv_reader(table.as_bytes()).is_err());
    }
}
