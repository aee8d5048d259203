//! Case Dataset: Cumulative Confirmed Cases per Country and Day
//!
//! Table layout accepted by [`CaseDataset::from_csv_reader`]:
//!
//! ```text
//! ISO-3166-Alpha2 | Country/Region | Lat       | Long     | 1/22/20 | 1/23/20 | ... | 9/2/20
//! ES              | Spain          | 40.463667 | -3.74922 | 0       | 0       | ... | 479554
//! FR              | France         | 46.227638 | 2.213749 | 0       | 2       | ... | 313730
//! ```
//!
//! Day headers are `month/day/year` without zero padding and must be
//! consecutive calendar days. Rows are stored sorted by country code.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{Days, NaiveDate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WarningError, WarningResult};

/// First column holding a day of counts.
const FIRST_DAY_COLUMN: usize = 4;

/// Cumulative case counts, rows = countries (sorted), columns = days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDataset {
    countries: Vec<String>,
    first_date: NaiveDate,
    counts: Array2<i64>,
}

impl CaseDataset {
    /// Build from in-memory parts. Rows are reordered to canonical order.
    pub fn new(countries: Vec<String>, first_date: NaiveDate, counts: Array2<i64>) -> WarningResult<Self> {
        if countries.len() != counts.nrows() {
            return Err(WarningError::invalid_dataset(format!(
                "{} country codes for {} rows of counts",
                countries.len(),
                counts.nrows()
            )));
        }
        if counts.ncols() == 0 {
            return Err(WarningError::invalid_dataset("dataset holds no days"));
        }

        let mut seen = HashSet::new();
        for code in &countries {
            if !seen.insert(code.as_str()) {
                return Err(WarningError::invalid_dataset(format!("duplicate country row '{code}'")));
            }
        }
        if seen.len() < 2 {
            return Err(WarningError::invalid_dataset(
                "dataset must contain at least two distinct countries",
            ));
        }

        let mut order: Vec<usize> = (0..countries.len()).collect();
        order.sort_by(|&a, &b| countries[a].cmp(&countries[b]));

        let sorted_counts = counts.select(ndarray::Axis(0), &order);
        let sorted_countries = order.iter().map(|&i| countries[i].clone()).collect();

        Ok(Self {
            countries: sorted_countries,
            first_date,
            counts: sorted_counts,
        })
    }

    /// Parse a case table from any CSV source.
    pub fn from_csv_reader<R: Read>(reader: R) -> WarningResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.len() <= FIRST_DAY_COLUMN {
            return Err(WarningError::invalid_dataset(format!(
                "expected at least {} columns, found {}",
                FIRST_DAY_COLUMN + 1,
                headers.len()
            )));
        }

        let dates = headers
            .iter()
            .skip(FIRST_DAY_COLUMN)
            .map(parse_day_header)
            .collect::<WarningResult<Vec<_>>>()?;
        for (i, pair) in dates.windows(2).enumerate() {
            if pair[0].checked_add_days(Days::new(1)) != Some(pair[1]) {
                return Err(WarningError::invalid_dataset(format!(
                    "day columns are not consecutive at column {}: {} then {}",
                    FIRST_DAY_COLUMN + i + 1,
                    pair[0],
                    pair[1]
                )));
            }
        }

        let n_days = dates.len();
        let mut countries = Vec::new();
        let mut values = Vec::new();

        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() != headers.len() {
                return Err(WarningError::invalid_dataset(format!(
                    "row {} has {} fields, header has {}",
                    row + 1,
                    record.len(),
                    headers.len()
                )));
            }
            countries.push(record[0].trim().to_string());
            for field in record.iter().skip(FIRST_DAY_COLUMN) {
                values.push(parse_count(field, row + 1)?);
            }
        }

        let counts = Array2::from_shape_vec((countries.len(), n_days), values)
            .map_err(|e| WarningError::invalid_dataset(e.to_string()))?;

        debug!(rows = countries.len(), days = n_days, first = %dates[0], "parsed case table");
        Self::new(countries, dates[0], counts)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> WarningResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn counts(&self) -> &Array2<i64> {
        &self.counts
    }

    pub fn n_days(&self) -> usize {
        self.counts.ncols()
    }

    /// Earliest date with reports
    pub fn first_date(&self) -> NaiveDate {
        self.first_date
    }

    /// Latest date with reports
    pub fn last_date(&self) -> NaiveDate {
        self.first_date + Days::new(self.n_days() as u64 - 1)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.row_of(code).is_some()
    }

    pub fn row_of(&self, code: &str) -> Option<usize> {
        self.countries.binary_search_by(|c| c.as_str().cmp(code)).ok()
    }

    /// Column index of a date, if inside the dataset.
    pub fn column_of(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.first_date).num_days();
        (offset >= 0 && (offset as usize) < self.n_days()).then_some(offset as usize)
    }

    /// Rows for the given codes, in the given order. Unknown codes fail.
    pub fn select(&self, codes: &[String]) -> WarningResult<Array2<i64>> {
        let rows = codes
            .iter()
            .map(|code| {
                self.row_of(code).ok_or_else(|| {
                    WarningError::country_undefined(format!("'{code}' is not contained in the dataset"))
                })
            })
            .collect::<WarningResult<Vec<_>>>()?;
        Ok(self.counts.select(ndarray::Axis(0), &rows))
    }
}

fn parse_day_header(header: &str) -> WarningResult<NaiveDate> {
    NaiveDate::parse_from_str(header.trim(), "%m/%d/%y").map_err(|e| {
        WarningError::invalid_dataset(format!("day header '{header}' is not month/day/year: {e}"))
    })
}

fn parse_count(field: &str, row: usize) -> WarningResult<i64> {
    let field = field.trim();
    if let Ok(v) = field.parse::<i64>() {
        return Ok(v);
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.round() as i64),
        _ => Err(WarningError::invalid_dataset(format!(
            "row {row}: '{field}' is not a case count"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const TABLE: &str = "\
ISO-3166-Alpha2,Country/Region,Lat,Long,1/30/20,1/31/20,2/1/20,2/2/20
FR,France,46.2,2.2,0,2,5,5
ES,Spain,40.4,-3.7,1,1,3,8
IT,Italy,41.8,12.5,0,0,2,9
";

    #[test]
    fn test_parse_sorts_rows() {
        let ds = CaseDataset::from_csv_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(ds.countries(), &["ES", "FR", "IT"]);
        assert_eq!(ds.first_date(), NaiveDate::from_ymd_opt(2020, 1, 30).unwrap());
        assert_eq!(ds.last_date(), NaiveDate::from_ymd_opt(2020, 2, 2).unwrap());
        assert_eq!(ds.counts().row(0).to_vec(), vec![1, 1, 3, 8]);
        assert_eq!(ds.counts().row(1).to_vec(), vec![0, 2, 5, 5]);
    }

    #[test]
    fn test_gap_in_days_rejected() {
        let table = "code,name,lat,long,1/30/20,2/1/20\nES,Spain,0,0,1,2\nFR,France,0,0,1,2\n";
        let err = CaseDataset::from_csv_reader(table.as_bytes()).unwrap_err();
        assert!(matches!(err, WarningError::InvalidDataset(_)));
    }

    #[test]
    fn test_single_country_rejected() {
        let err = CaseDataset::new(
            vec!["ES".into()],
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            array![[1, 2, 3]],
        )
        .unwrap_err();
        assert!(matches!(err, WarningError::InvalidDataset(_)));
    }

    #[test]
    fn test_select_and_columns() {
        let ds = CaseDataset::from_csv_reader(TABLE.as_bytes()).unwrap();
        let rows = ds.select(&["IT".to_string(), "ES".to_string()]).unwrap();
        assert_eq!(rows, array![[0, 0, 2, 9], [1, 1, 3, 8]]);
        assert_eq!(ds.column_of(NaiveDate::from_ymd_opt(2020, 2, 1).unwrap()), Some(2));
        assert_eq!(ds.column_of(NaiveDate::from_ymd_opt(2020, 2, 3).unwrap()), None);
        assert!(ds.select(&["PT".to_string()]).is_err());
    }
}
