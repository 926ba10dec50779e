//! Plan reference data: deferral discount factors, salary increase rates and mortality

mod deferred;
mod mortality;
mod salary;
pub mod loader;

pub use deferred::{discount_factor, DeferredFactorTable, NO_DISCOUNT};
pub use loader::{DataPaths, ReferenceTable};
pub use mortality::{survival_rate, MortalityFactorSeries, MortalityImprovementTable};
pub use salary::SalaryIncreaseRates;

use crate::error::Result;

/// Reference tables used by the benefit calculation
///
/// Loaded once and never mutated afterwards, so a single instance can be
/// shared by reference across threads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assumptions {
    pub deferred_factors: DeferredFactorTable,
    pub increase_rates: SalaryIncreaseRates,
}

impl Assumptions {
    pub fn new(deferred_factors: DeferredFactorTable, increase_rates: SalaryIncreaseRates) -> Self {
        Self {
            deferred_factors,
            increase_rates,
        }
    }

    /// Load both tables from the default location (data/)
    pub fn load_default() -> Result<Self> {
        Self::load(&DataPaths::default())
    }

    /// Load both tables from the given paths
    pub fn load(paths: &DataPaths) -> Result<Self> {
        Ok(Self {
            deferred_factors: loader::load_deferred_factors(&paths.deferred_factors)?,
            increase_rates: loader::load_salary_increase_rates(&paths.salary_increase_rate)?,
        })
    }
}
