//! Deferral discount factors by attained age

use std::collections::BTreeMap;

/// Discount factor applied when an age is not in the table
pub const NO_DISCOUNT: f64 = 1.0;

/// Present-value discount factors keyed by integer age
///
/// Each factor combines interest and survival to the plan's retirement age.
/// Ages outside the table are not discounted: see [`discount_factor`](Self::discount_factor).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredFactorTable {
    factors: BTreeMap<u32, f64>,
}

impl DeferredFactorTable {
    pub fn from_map(factors: BTreeMap<u32, f64>) -> Self {
        Self { factors }
    }

    /// Build from `(age, factor)` pairs; later pairs win on duplicate ages
    pub fn from_pairs<I: IntoIterator<Item = (u32, f64)>>(pairs: I) -> Self {
        Self {
            factors: pairs.into_iter().collect(),
        }
    }

    /// Factor for `age`, or 1.0 when the age is outside the table
    pub fn discount_factor(&self, age: u32) -> f64 {
        self.factors.get(&age).copied().unwrap_or(NO_DISCOUNT)
    }

    /// Factor for `age` only if the table covers it
    pub fn get(&self, age: u32) -> Option<f64> {
        self.factors.get(&age).copied()
    }

    /// Lowest and highest ages in the table
    pub fn age_range(&self) -> Option<(u32, u32)> {
        let min = *self.factors.keys().next()?;
        let max = *self.factors.keys().next_back()?;
        Some((min, max))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Free-function form of [`DeferredFactorTable::discount_factor`]
pub fn discount_factor(age: u32, table: &DeferredFactorTable) -> f64 {
    table.discount_factor(age)
}
