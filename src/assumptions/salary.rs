//! Salary increase rates by year of service

use crate::error::{PensionError, Result};

/// Annual salary increase rates, one per year of service
///
/// Index 0 holds the rate for the first year of service. The FAS projector
/// grows compensation with `rate(yos)` and deflates it with `rate(yos - 1)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalaryIncreaseRates {
    rates: Vec<f64>,
}

impl SalaryIncreaseRates {
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }

    /// Same rate for every year of service
    pub fn flat(rate: f64, years: usize) -> Self {
        Self {
            rates: vec![rate; years],
        }
    }

    /// Rate at `index`, failing loudly past the end of the table
    pub fn rate(&self, index: usize) -> Result<f64> {
        self.rates
            .get(index)
            .copied()
            .ok_or(PensionError::RateIndexOutOfRange {
                index,
                len: self.rates.len(),
            })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl From<Vec<f64>> for SalaryIncreaseRates {
    fn from(rates: Vec<f64>) -> Self {
        Self::new(rates)
    }
}
