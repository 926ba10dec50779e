//! Mortality rates, improvement adjustments and survival probabilities
//!
//! The survival calculation combines:
//! - A base mortality series (annual q_x, indexed by contiguous ages)
//! - An improvement grid (rows by age, columns by projection year)
//!
//! Neither table feeds the benefit aggregation today; they back the
//! survival-probability part of the toolkit.

use crate::error::{PensionError, Result};

/// Annual mortality probabilities for ages `min_age..=max_age`
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityFactorSeries {
    min_age: u32,
    rates: Vec<f64>,
}

impl MortalityFactorSeries {
    pub fn new(min_age: u32, rates: Vec<f64>) -> Self {
        Self { min_age, rates }
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    /// Highest age covered; equals `min_age` for an empty series
    pub fn max_age(&self) -> u32 {
        self.min_age
            .saturating_add((self.rates.len() as u32).saturating_sub(1))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// q_x for a single age
    pub fn rate(&self, age: u32) -> Option<f64> {
        let idx = age.checked_sub(self.min_age)? as usize;
        self.rates.get(idx).copied()
    }

    /// Rates from `age` to the end of the series
    fn rates_from_age(&self, age: u32) -> Result<&[f64]> {
        match age.checked_sub(self.min_age) {
            Some(offset) if (offset as usize) < self.rates.len() => Ok(&self.rates[offset as usize..]),
            _ => Err(PensionError::AgeOutOfRange {
                age,
                min_age: self.min_age,
                max_age: self.max_age(),
            }),
        }
    }
}

/// Multiplicative mortality adjustments, rows by age and columns by projection year
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityImprovementTable {
    min_age: u32,
    years: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl MortalityImprovementTable {
    /// Every row must have one value per year column, and both must be non-empty
    pub fn new(
        min_age: u32,
        years: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if years.is_empty() || rows.is_empty() {
            return Err(PensionError::TableShape(
                "improvement table must have at least one row and one column".into(),
            ));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != years.len()) {
            return Err(PensionError::TableShape(format!(
                "row for age {} has {} values, expected {}",
                min_age.saturating_add(i as u32),
                row.len(),
                years.len()
            )));
        }
        Ok(Self {
            min_age,
            years,
            rows,
        })
    }

    /// Column labels (projection years)
    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn column_count(&self) -> usize {
        self.years.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    pub fn max_age(&self) -> u32 {
        self.min_age.saturating_add(self.rows.len() as u32 - 1)
    }

    /// Adjustments for one age across all projection years
    pub fn row(&self, age: u32) -> Option<&[f64]> {
        let idx = age.checked_sub(self.min_age)? as usize;
        self.rows.get(idx).map(Vec::as_slice)
    }
}

/// Probability of surviving from `current_age` through `to_age`
///
/// Term `i` covers age `current_age + i`: the base rate at that age is scaled
/// by the improvement adjustment in column `i` of the `current_age` row, so
/// the column is selected by offset from the current age rather than by
/// calendar year. The product runs over ages `current_age..=to_age`, truncated
/// at the end of the mortality series. `to_age < current_age` is the empty
/// product, 1.0.
pub fn survival_rate(
    current_age: u32,
    to_age: u32,
    mortality_factors: &MortalityFactorSeries,
    improvement_factors: &MortalityImprovementTable,
) -> Result<f64> {
    if mortality_factors.len() != improvement_factors.column_count() {
        return Err(PensionError::DimensionMismatch {
            mortality_len: mortality_factors.len(),
            improvement_columns: improvement_factors.column_count(),
        });
    }

    let base = mortality_factors.rates_from_age(current_age)?;
    let adjustments = improvement_factors
        .row(current_age)
        .ok_or(PensionError::AgeOutOfRange {
            age: current_age,
            min_age: improvement_factors.min_age(),
            max_age: improvement_factors.max_age(),
        })?;

    if to_age < current_age {
        return Ok(1.0);
    }
    let terms = ((to_age - current_age) as usize + 1).min(base.len());

    Ok(base
        .iter()
        .zip(adjustments)
        .take(terms)
        .map(|(q, adj)| 1.0 - adj * q)
        .product())
}
